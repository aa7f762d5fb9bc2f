//! Recording engine: a [`ComputeEngine`] that executes nothing and logs every
//! call, for protocol tests and headless inspection.

use crate::conv::ConvolutionKernel;
use crate::engine::{ComputeEngine, EngineError, FieldParams, PaintParams};
use ringlife_common::{FieldSize, GridLabel, WorkgroupCount};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Kind of resource an allocation or release refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Grid(GridLabel),
    Kernel,
}

/// One engine call, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEvent {
    Configured(FieldParams),
    Allocated(ResourceKind),
    Released(ResourceKind),
    Seed {
        target: GridLabel,
        groups: WorkgroupCount,
    },
    Step {
        from: GridLabel,
        to: GridLabel,
        groups: WorkgroupCount,
    },
    Render {
        source: GridLabel,
        groups: WorkgroupCount,
    },
    Paint {
        target: GridLabel,
        params: PaintParams,
        groups: WorkgroupCount,
    },
}

impl TraceEvent {
    /// Short operation name, used for summaries and CLI output.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Configured(_) => "configure",
            Self::Allocated(_) => "allocate",
            Self::Released(_) => "release",
            Self::Seed { .. } => "seed",
            Self::Step { .. } => "step",
            Self::Render { .. } => "render",
            Self::Paint { .. } => "paint",
        }
    }
}

impl std::fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configured(p) => write!(
                f,
                "configure field={}x{} kernel={}x{} mult={} seed={}",
                p.field_width, p.field_height, p.kernel_width, p.kernel_height, p.kernel_mult, p.seed
            ),
            Self::Allocated(kind) => write!(f, "allocate {kind:?}"),
            Self::Released(kind) => write!(f, "release {kind:?}"),
            Self::Seed { target, groups } => write!(f, "seed {target} groups={groups}"),
            Self::Step { from, to, groups } => write!(f, "step {from}->{to} groups={groups}"),
            Self::Render { source, groups } => write!(f, "render {source} groups={groups}"),
            Self::Paint {
                target,
                params,
                groups,
            } => write!(
                f,
                "paint {target} at=({}, {}) offset=({}, {}) groups={groups}",
                params.cursor_x, params.cursor_y, params.draw_offset_x, params.draw_offset_y
            ),
        }
    }
}

/// Shared, append-only log of engine calls.
///
/// Cloning shares the same log, so a caller can keep reading it after the
/// engine and its handles have been dropped.
#[derive(Debug, Clone, Default)]
pub struct TraceLog(Rc<RefCell<Vec<TraceEvent>>>);

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: TraceEvent) {
        tracing::trace!(%event, "engine call");
        self.0.borrow_mut().push(event);
    }

    /// Copy of all events recorded so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Remove and return all recorded events.
    pub fn drain(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// Grid handle of the recording engine. Logs its release when dropped.
#[derive(Debug)]
pub struct RecordedGrid {
    label: GridLabel,
    size: FieldSize,
    log: TraceLog,
}

impl RecordedGrid {
    pub fn label(&self) -> GridLabel {
        self.label
    }

    pub fn size(&self) -> FieldSize {
        self.size
    }
}

impl Drop for RecordedGrid {
    fn drop(&mut self) {
        self.log.push(TraceEvent::Released(ResourceKind::Grid(self.label)));
    }
}

/// Kernel handle of the recording engine. Keeps a copy of the uploaded weights.
#[derive(Debug)]
pub struct RecordedKernel {
    weights: Vec<f32>,
    log: TraceLog,
}

impl RecordedKernel {
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

impl Drop for RecordedKernel {
    fn drop(&mut self) {
        self.log.push(TraceEvent::Released(ResourceKind::Kernel));
    }
}

/// Engine that records every call into a [`TraceLog`].
#[derive(Debug, Default)]
pub struct RecordingEngine {
    log: TraceLog,
    fail_on: Option<ResourceKind>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the allocation of `kind` fail, to exercise partial startup.
    pub fn failing_on(kind: ResourceKind) -> Self {
        Self {
            log: TraceLog::new(),
            fail_on: Some(kind),
        }
    }

    /// Handle to the shared log.
    pub fn log(&self) -> TraceLog {
        self.log.clone()
    }

    fn allocate(&self, kind: ResourceKind) -> Result<(), EngineError> {
        if self.fail_on == Some(kind) {
            return Err(EngineError::Allocation {
                what: format!("{kind:?}"),
                reason: "injected failure".into(),
            });
        }
        self.log.push(TraceEvent::Allocated(kind));
        Ok(())
    }
}

impl ComputeEngine for RecordingEngine {
    type Grid = RecordedGrid;
    type Kernel = RecordedKernel;

    fn configure(&mut self, params: &FieldParams) {
        self.log.push(TraceEvent::Configured(*params));
    }

    fn create_grid(
        &mut self,
        label: GridLabel,
        size: FieldSize,
    ) -> Result<RecordedGrid, EngineError> {
        self.allocate(ResourceKind::Grid(label))?;
        Ok(RecordedGrid {
            label,
            size,
            log: self.log.clone(),
        })
    }

    fn upload_kernel(&mut self, kernel: &ConvolutionKernel) -> Result<RecordedKernel, EngineError> {
        self.allocate(ResourceKind::Kernel)?;
        Ok(RecordedKernel {
            weights: kernel.weights().to_vec(),
            log: self.log.clone(),
        })
    }

    fn seed(&mut self, target: &RecordedGrid, groups: WorkgroupCount) {
        self.log.push(TraceEvent::Seed {
            target: target.label,
            groups,
        });
    }

    fn step(
        &mut self,
        from: &RecordedGrid,
        to: &RecordedGrid,
        _kernel: &RecordedKernel,
        groups: WorkgroupCount,
    ) {
        self.log.push(TraceEvent::Step {
            from: from.label,
            to: to.label,
            groups,
        });
    }

    fn render(&mut self, source: &RecordedGrid, groups: WorkgroupCount) {
        self.log.push(TraceEvent::Render {
            source: source.label,
            groups,
        });
    }

    fn paint(&mut self, target: &RecordedGrid, params: &PaintParams, groups: WorkgroupCount) {
        self.log.push(TraceEvent::Paint {
            target: target.label,
            params: *params,
            groups,
        });
    }
}
