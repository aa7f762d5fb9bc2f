use crate::engine::PaintParams;
use glam::{UVec2, Vec2};
use ringlife_common::{FieldSize, TILE_SIZE, WorkgroupCount};
use serde::{Deserialize, Serialize};

/// Tile-aligned rectangle touched by one paint edit, with its pass parameters.
///
/// Tile bounds are inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintRegion {
    pub min_tile_x: u32,
    pub min_tile_y: u32,
    pub max_tile_x: u32,
    pub max_tile_y: u32,
    pub params: PaintParams,
}

impl PaintRegion {
    /// Workgroups to dispatch: one per covered tile.
    pub fn dispatch(&self) -> WorkgroupCount {
        WorkgroupCount::new(
            self.max_tile_x - self.min_tile_x + 1,
            self.max_tile_y - self.min_tile_y + 1,
            1,
        )
    }

    /// Absolute cell origin of the rectangle.
    pub fn offset(&self) -> UVec2 {
        UVec2::new(self.min_tile_x * TILE_SIZE, self.min_tile_y * TILE_SIZE)
    }

    /// Cell bounds as `[min, max)`.
    pub fn cell_bounds(&self) -> (UVec2, UVec2) {
        let min = self.offset();
        let max = UVec2::new(
            (self.max_tile_x + 1) * TILE_SIZE,
            (self.max_tile_y + 1) * TILE_SIZE,
        );
        (min, max)
    }
}

/// Compute the tile rectangle covering a disk of `radius` at `center`.
///
/// Every bound is clamped to the field's tiles, so edits near or past the
/// border are truncated rather than wrapped. Returns `None` when nothing can
/// be painted: a NaN or negative radius, a non-finite center, or a field
/// smaller than one tile.
///
/// Tile bounds are `floor((c -/+ radius) / TILE_SIZE)`, the upper one plus
/// one, each clamped to `[0, tiles - 1]`.
pub fn paint_region(size: FieldSize, center: Vec2, radius: f32, fill: f32) -> Option<PaintRegion> {
    if radius.is_nan() || radius < 0.0 || !center.is_finite() {
        return None;
    }
    let (tiles_x, tiles_y) = (size.tiles_x(), size.tiles_y());
    if tiles_x == 0 || tiles_y == 0 {
        return None;
    }

    let last_x = tiles_x as i64 - 1;
    let last_y = tiles_y as i64 - 1;
    let min_tile_x = tile_of(center.x - radius).clamp(0, last_x);
    let min_tile_y = tile_of(center.y - radius).clamp(0, last_y);
    let max_tile_x = tile_of(center.x + radius).saturating_add(1).clamp(0, last_x);
    let max_tile_y = tile_of(center.y + radius).saturating_add(1).clamp(0, last_y);

    let min_tile_x = min_tile_x as u32;
    let min_tile_y = min_tile_y as u32;

    Some(PaintRegion {
        min_tile_x,
        min_tile_y,
        max_tile_x: max_tile_x as u32,
        max_tile_y: max_tile_y as u32,
        params: PaintParams {
            cursor_rad_sqr: radius * radius,
            cursor_fill: fill,
            cursor_x: center.x as i32,
            cursor_y: center.y as i32,
            draw_offset_x: min_tile_x * TILE_SIZE,
            draw_offset_y: min_tile_y * TILE_SIZE,
        },
    })
}

/// Tile index of a cell coordinate: `floor(v / TILE_SIZE)`, saturating.
fn tile_of(v: f32) -> i64 {
    (v / TILE_SIZE as f32).floor() as i64
}
