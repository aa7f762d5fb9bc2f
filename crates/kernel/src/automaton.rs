use crate::conv::ConvolutionKernel;
use crate::engine::{ComputeEngine, EngineError, FieldParams};
use crate::grid::{BufferRoles, GridPair, Role};
use crate::region::{PaintRegion, paint_region};
use glam::Vec2;
use ringlife_common::{AutomatonConfig, FieldSize, GridLabel, WorkgroupCount};

/// Paint brush: disk radius in cells and the value written inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub radius: f32,
    pub fill: f32,
}

impl From<ringlife_common::BrushConfig> for Brush {
    fn from(c: ringlife_common::BrushConfig) -> Self {
        Self {
            radius: c.radius,
            fill: c.fill,
        }
    }
}

/// What one tick dispatched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Tick number, starting at 1 for the first tick.
    pub tick: u64,
    /// Role in effect after this tick.
    pub role: Role,
    /// Grid convolved from.
    pub read: GridLabel,
    /// Grid convolved into, rendered, and painted.
    pub written: GridLabel,
    /// Workgroups of the full-field step and render passes.
    pub groups: WorkgroupCount,
    /// Region of the paint edit, if one was applied.
    pub painted: Option<PaintRegion>,
}

/// A running automaton: two grids, one kernel, and the tick protocol that
/// drives them on an engine.
///
/// All GPU-side resources are owned handles; dropping the automaton releases
/// them exactly once. Fields are declared so resources drop before the engine.
pub struct Automaton<E: ComputeEngine> {
    grids: GridPair<E::Grid>,
    kernel_buffer: E::Kernel,
    kernel: ConvolutionKernel,
    roles: BufferRoles,
    size: FieldSize,
    brush: Brush,
    tick: u64,
    engine: E,
}

impl<E: ComputeEngine> Automaton<E> {
    /// Start up on `engine`: set the scalars, allocate both grids, build and
    /// upload the kernel, and noise-fill grid A.
    ///
    /// On error, whatever was allocated before the failure is dropped (and so
    /// released) before returning.
    pub fn new(mut engine: E, config: &AutomatonConfig) -> Result<Self, EngineError> {
        let size = config.field;
        let kernel = ConvolutionKernel::ring(config.kernel.width, config.kernel.height);
        let params = FieldParams::new(size, &kernel, config.seed);
        engine.configure(&params);

        let a = engine.create_grid(GridLabel::A, size)?;
        let b = engine.create_grid(GridLabel::B, size)?;
        let kernel_buffer = engine.upload_kernel(&kernel)?;
        let grids = GridPair::new(a, b);

        let roles = BufferRoles::new();
        engine.seed(grids.get(roles.role().current()), size.full_dispatch());

        tracing::info!(
            field = %size,
            kernel_width = kernel.width(),
            kernel_height = kernel.height(),
            kernel_mult = kernel.mult(),
            seed = config.seed,
            "automaton started"
        );

        Ok(Self {
            grids,
            kernel_buffer,
            kernel,
            roles,
            size,
            brush: config.brush.into(),
            tick: 0,
            engine,
        })
    }

    /// Run one frame, painting at `paint_at` (field coordinates) if given.
    ///
    /// Order: flip roles, convolve previous state into the other grid, paint
    /// that same grid, render it. The painted grid is next tick's read source,
    /// so an edit shows up from the following frame on.
    pub fn tick(&mut self, paint_at: Option<Vec2>) -> FrameReport {
        let _span = tracing::debug_span!("tick", n = self.tick + 1).entered();

        let previous = self.roles.advance();
        let (from, to) = self.grids.split(previous);
        let paint_target = self.grids.get(self.roles.role().current());
        let groups = self.size.full_dispatch();

        self.engine.step(from, to, &self.kernel_buffer, groups);

        let painted = paint_at.and_then(|at| {
            let region = paint_region(self.size, at, self.brush.radius, self.brush.fill)?;
            self.engine
                .paint(paint_target, &region.params, region.dispatch());
            tracing::debug!(
                x = at.x,
                y = at.y,
                groups = %region.dispatch(),
                "painted"
            );
            Some(region)
        });

        self.engine.render(to, groups);
        self.tick += 1;

        FrameReport {
            tick: self.tick,
            role: self.roles.role(),
            read: previous.current(),
            written: previous.next(),
            groups,
            painted,
        }
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn role(&self) -> Role {
        self.roles.role()
    }

    pub fn size(&self) -> FieldSize {
        self.size
    }

    /// Grid that holds the latest state: the one the next tick reads.
    pub fn current_grid(&self) -> &E::Grid {
        self.grids.get(self.roles.role().current())
    }

    pub fn kernel(&self) -> &ConvolutionKernel {
        &self.kernel
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{RecordingEngine, ResourceKind, TraceEvent};

    fn config_320() -> AutomatonConfig {
        AutomatonConfig {
            field: FieldSize::new(320, 320),
            ..AutomatonConfig::default()
        }
    }

    fn started() -> (Automaton<RecordingEngine>, crate::trace::TraceLog) {
        let engine = RecordingEngine::new();
        let log = engine.log();
        let automaton = Automaton::new(engine, &config_320()).unwrap();
        (automaton, log)
    }

    #[test]
    fn startup_sequence() {
        let (automaton, log) = started();
        let events = log.events();
        assert!(matches!(events[0], TraceEvent::Configured(p) if p.kernel_mult == 1.0 / 625.0));
        assert_eq!(
            events[1..],
            [
                TraceEvent::Allocated(ResourceKind::Grid(GridLabel::A)),
                TraceEvent::Allocated(ResourceKind::Grid(GridLabel::B)),
                TraceEvent::Allocated(ResourceKind::Kernel),
                TraceEvent::Seed {
                    target: GridLabel::A,
                    groups: WorkgroupCount::new(10, 10, 1),
                },
            ]
        );
        assert_eq!(automaton.role(), Role::ACurrent);
        assert_eq!(automaton.ticks(), 0);
    }

    #[test]
    fn first_tick_reads_a_writes_b() {
        let (mut automaton, log) = started();
        log.drain();
        let report = automaton.tick(None);
        assert_eq!(report.tick, 1);
        assert_eq!(report.read, GridLabel::A);
        assert_eq!(report.written, GridLabel::B);
        assert_eq!(report.role, Role::BCurrent);
        assert_eq!(
            log.events(),
            vec![
                TraceEvent::Step {
                    from: GridLabel::A,
                    to: GridLabel::B,
                    groups: WorkgroupCount::new(10, 10, 1),
                },
                TraceEvent::Render {
                    source: GridLabel::B,
                    groups: WorkgroupCount::new(10, 10, 1),
                },
            ]
        );
    }

    #[test]
    fn roles_alternate_by_parity() {
        let (mut automaton, _log) = started();
        for n in 1..=20u64 {
            let report = automaton.tick(None);
            let expected = if n % 2 == 0 {
                Role::ACurrent
            } else {
                Role::BCurrent
            };
            assert_eq!(report.role, expected);
            assert_eq!(automaton.role(), expected);
        }
    }

    #[test]
    fn paint_targets_grid_just_written() {
        let (mut automaton, log) = started();
        automaton.tick(None);
        log.drain();

        // Second tick: B -> A, so paint goes into A.
        let report = automaton.tick(Some(Vec2::new(0.0, 0.0)));
        let region = report.painted.unwrap();
        assert_eq!(report.written, GridLabel::A);
        let events = log.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            TraceEvent::Step {
                from: GridLabel::B,
                to: GridLabel::A,
                ..
            }
        ));
        assert_eq!(
            events[1],
            TraceEvent::Paint {
                target: GridLabel::A,
                params: region.params,
                groups: region.dispatch(),
            }
        );
        assert!(matches!(
            events[2],
            TraceEvent::Render {
                source: GridLabel::A,
                ..
            }
        ));
    }

    #[test]
    fn paint_target_is_next_read_source() {
        let (mut automaton, log) = started();
        for _ in 0..6 {
            log.drain();
            automaton.tick(Some(Vec2::new(160.0, 160.0)));
            let painted = log.events().iter().find_map(|e| match e {
                TraceEvent::Paint { target, .. } => Some(*target),
                _ => None,
            });
            log.drain();
            automaton.tick(None);
            let next_read = log.events().iter().find_map(|e| match e {
                TraceEvent::Step { from, .. } => Some(*from),
                _ => None,
            });
            assert_eq!(painted, next_read);
        }
    }

    #[test]
    fn current_grid_follows_role() {
        let (mut automaton, _log) = started();
        assert_eq!(automaton.current_grid().label(), GridLabel::A);
        automaton.tick(None);
        assert_eq!(automaton.current_grid().label(), GridLabel::B);
        automaton.tick(None);
        assert_eq!(automaton.current_grid().label(), GridLabel::A);
    }

    #[test]
    fn paint_uses_brush_and_clamps() {
        let (mut automaton, _log) = started();
        automaton.set_brush(Brush {
            radius: 50.0,
            fill: 0.5,
        });
        let region = automaton.tick(Some(Vec2::ZERO)).painted.unwrap();
        assert_eq!(region.dispatch(), WorkgroupCount::new(3, 3, 1));
        assert_eq!((region.params.draw_offset_x, region.params.draw_offset_y), (0, 0));
        assert_eq!(region.params.cursor_rad_sqr, 2500.0);
        assert_eq!(region.params.cursor_fill, 0.5);
    }

    #[test]
    fn full_dispatch_independent_of_paint() {
        let (mut automaton, _log) = started();
        let plain = automaton.tick(None);
        let painted = automaton.tick(Some(Vec2::new(319.0, 319.0)));
        assert_eq!(plain.groups, WorkgroupCount::new(10, 10, 1));
        assert_eq!(painted.groups, WorkgroupCount::new(10, 10, 1));
    }

    #[test]
    fn invalid_brush_skips_paint_dispatch() {
        let (mut automaton, log) = started();
        automaton.set_brush(Brush {
            radius: -3.0,
            fill: 1.0,
        });
        log.drain();
        let report = automaton.tick(Some(Vec2::new(10.0, 10.0)));
        assert!(report.painted.is_none());
        assert!(log.events().iter().all(|e| e.op() != "paint"));
    }

    #[test]
    fn seed_precedes_first_step() {
        let (mut automaton, log) = started();
        for i in 0..5 {
            automaton.tick((i % 2 == 0).then_some(Vec2::new(50.0, 50.0)));
        }
        let ops: Vec<&str> = log.events().iter().map(|e| e.op()).collect();
        let seed = ops.iter().position(|op| *op == "seed").unwrap();
        let step = ops.iter().position(|op| *op == "step").unwrap();
        assert!(seed < step);
        assert_eq!(ops.iter().filter(|op| **op == "seed").count(), 1);
    }

    #[test]
    fn drop_releases_everything_once() {
        let (mut automaton, log) = started();
        automaton.tick(None);
        drop(automaton);
        let released: Vec<ResourceKind> = log
            .events()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Released(kind) => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            released,
            vec![
                ResourceKind::Grid(GridLabel::A),
                ResourceKind::Grid(GridLabel::B),
                ResourceKind::Kernel,
            ]
        );
    }

    #[test]
    fn failed_startup_releases_partial_allocations() {
        let engine = RecordingEngine::failing_on(ResourceKind::Kernel);
        let log = engine.log();
        let result = Automaton::new(engine, &config_320());
        assert!(result.is_err());

        let events = log.events();
        let allocated = events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Allocated(_)))
            .count();
        let released = events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Released(_)))
            .count();
        assert_eq!(allocated, 2);
        assert_eq!(released, 2);
        assert!(events.iter().all(|e| e.op() != "seed"));
    }

    #[test]
    fn failed_second_grid_releases_first() {
        let engine = RecordingEngine::failing_on(ResourceKind::Grid(GridLabel::B));
        let log = engine.log();
        assert!(Automaton::new(engine, &config_320()).is_err());
        assert_eq!(
            log.events()[1..],
            [
                TraceEvent::Allocated(ResourceKind::Grid(GridLabel::A)),
                TraceEvent::Released(ResourceKind::Grid(GridLabel::A)),
            ]
        );
    }
}
