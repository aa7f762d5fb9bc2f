use glam::Vec2;
use ringlife_common::FieldSize;

/// Side length, in world units, of the square plane the field is drawn on.
pub const PLANE_EXTENT: f32 = 10.0;

/// Map a hit point on the field plane (centered on the origin, spanning
/// `PLANE_EXTENT` units) to field cells.
///
/// For a 1024-wide field this is `(p + 5) * 102.4`.
pub fn plane_to_field(hit: Vec2, size: FieldSize) -> Vec2 {
    let cells_per_unit = size.extent() / PLANE_EXTENT;
    (hit + Vec2::splat(PLANE_EXTENT / 2.0)) * cells_per_unit
}

/// Maps window-space cursor positions onto a field stretched over a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMapping {
    origin: Vec2,
    extent: Vec2,
    field: FieldSize,
}

impl PointerMapping {
    /// `origin` and `extent` are the viewport rectangle in window pixels.
    pub fn new(origin: Vec2, extent: Vec2, field: FieldSize) -> Self {
        Self {
            origin,
            extent,
            field,
        }
    }

    /// Field covering the whole window.
    pub fn fullscreen(window: Vec2, field: FieldSize) -> Self {
        Self::new(Vec2::ZERO, window, field)
    }

    pub fn set_viewport(&mut self, origin: Vec2, extent: Vec2) {
        self.origin = origin;
        self.extent = extent;
    }

    /// Field position under `cursor`, or `None` outside the viewport.
    pub fn to_field(&self, cursor: Vec2) -> Option<Vec2> {
        if self.extent.x <= 0.0 || self.extent.y <= 0.0 {
            return None;
        }
        let uv = (cursor - self.origin) / self.extent;
        if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
            return None;
        }
        Some(uv * self.field.extent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_center_maps_to_field_center() {
        let size = FieldSize::new(1024, 1024);
        assert_eq!(plane_to_field(Vec2::ZERO, size), Vec2::new(512.0, 512.0));
        assert_eq!(plane_to_field(Vec2::splat(-5.0), size), Vec2::ZERO);
        let p = plane_to_field(Vec2::new(1.0, 0.0), size);
        assert!((p.x - 6.0 * 102.4).abs() < 1e-3);
    }

    #[test]
    fn fullscreen_scales_to_field() {
        let mapping = PointerMapping::fullscreen(Vec2::new(800.0, 600.0), FieldSize::new(320, 320));
        assert_eq!(mapping.to_field(Vec2::ZERO), Some(Vec2::ZERO));
        assert_eq!(
            mapping.to_field(Vec2::new(400.0, 300.0)),
            Some(Vec2::new(160.0, 160.0))
        );
    }

    #[test]
    fn offset_viewport_and_outside() {
        let mapping = PointerMapping::new(
            Vec2::new(200.0, 0.0),
            Vec2::new(640.0, 640.0),
            FieldSize::new(320, 320),
        );
        assert_eq!(mapping.to_field(Vec2::new(100.0, 10.0)), None);
        assert_eq!(mapping.to_field(Vec2::new(900.0, 10.0)), None);
        assert_eq!(
            mapping.to_field(Vec2::new(520.0, 64.0)),
            Some(Vec2::new(160.0, 32.0))
        );
    }

    #[test]
    fn empty_viewport_maps_nothing() {
        let mut mapping = PointerMapping::fullscreen(Vec2::new(10.0, 10.0), FieldSize::default());
        mapping.set_viewport(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(mapping.to_field(Vec2::ZERO), None);
    }
}
