use ringlife_common::FieldSize;
use ringlife_kernel::{Automaton, Brush, ComputeEngine, ConvolutionKernel, Role, TraceEvent};
use std::collections::BTreeMap;

/// Band counts and scalars of a convolution kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelSummary {
    pub width: u32,
    pub height: u32,
    pub inhibit: usize,
    pub excite: usize,
    pub zero: usize,
    pub sum: f32,
    pub mult: f32,
}

impl KernelSummary {
    pub fn of(kernel: &ConvolutionKernel) -> Self {
        Self {
            width: kernel.width(),
            height: kernel.height(),
            inhibit: kernel.count(-1.0),
            excite: kernel.count(1.0),
            zero: kernel.count(0.0),
            sum: kernel.sum(),
            mult: kernel.mult(),
        }
    }

    /// One character per weight: `-` inhibit, `+` excite, `.` zero.
    pub fn ascii_map(kernel: &ConvolutionKernel) -> String {
        let mut out = String::with_capacity(((kernel.width() + 1) * kernel.height()) as usize);
        for j in 0..kernel.height() {
            for i in 0..kernel.width() {
                out.push(match kernel.weight(i, j) {
                    Some(w) if w < 0.0 => '-',
                    Some(w) if w > 0.0 => '+',
                    _ => '.',
                });
            }
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for KernelSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Kernel {}x{}: inhibit={} excite={} zero={} sum={} mult={:.6}",
            self.width, self.height, self.inhibit, self.excite, self.zero, self.sum, self.mult
        )
    }
}

/// Per-operation counts over a recorded trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceSummary {
    pub ops: BTreeMap<&'static str, usize>,
    /// The single noise fill came before any convolution.
    pub seed_before_step: bool,
}

impl TraceSummary {
    pub fn of(events: &[TraceEvent]) -> Self {
        let mut ops = BTreeMap::new();
        for event in events {
            *ops.entry(event.op()).or_insert(0) += 1;
        }
        let seed = events.iter().position(|e| e.op() == "seed");
        let step = events.iter().position(|e| e.op() == "step");
        let seed_before_step = match (seed, step) {
            (Some(seed), Some(step)) => seed < step && ops.get("seed") == Some(&1),
            (Some(_), None) => ops.get("seed") == Some(&1),
            (None, _) => false,
        };
        Self {
            ops,
            seed_before_step,
        }
    }

    pub fn count(&self, op: &str) -> usize {
        self.ops.get(op).copied().unwrap_or(0)
    }

    /// Every allocation has a matching release.
    pub fn balanced(&self) -> bool {
        self.count("allocate") == self.count("release")
    }
}

impl std::fmt::Display for TraceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trace:")?;
        for (op, n) in &self.ops {
            write!(f, " {op}={n}")?;
        }
        write!(f, " seed_before_step={}", self.seed_before_step)
    }
}

/// Snapshot of a running automaton.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonSummary {
    pub ticks: u64,
    pub role: Role,
    pub field: FieldSize,
    pub brush: Brush,
}

impl AutomatonSummary {
    pub fn of<E: ComputeEngine>(automaton: &Automaton<E>) -> Self {
        Self {
            ticks: automaton.ticks(),
            role: automaton.role(),
            field: automaton.size(),
            brush: automaton.brush(),
        }
    }
}

impl std::fmt::Display for AutomatonSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Automaton: tick={} current={} field={} brush=(r={:.1}, fill={:.2})",
            self.ticks,
            self.role.current(),
            self.field,
            self.brush.radius,
            self.brush.fill
        )
    }
}
