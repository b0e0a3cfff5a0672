//! Where the landing pads and the vehicle go.
//!
//! Positions come from the terrain bounds alone; the terrain surface is never
//! sampled, so a pad can end up inside an island.

use glam::Vec3;

use crate::geometry::Bounds;

/// Default pad height, roughly the terrain's sea surface.
pub const WATER_LEVEL: f32 = 0.5;

/// How far the vehicle's base sits above the pad origin.
pub const VEHICLE_LIFT: f32 = 0.5;

/// Pads closer than this fraction of the terrain width are pushed apart.
pub const MIN_SEPARATION_FRACTION: f32 = 0.2;

/// The two pad instances and the vehicle anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub pads: [Vec3; 2],
    pub vehicle: Vec3,
}

impl Placement {
    /// Distance between the two pads.
    pub fn separation(&self) -> f32 {
        self.pads[0].distance(self.pads[1])
    }
}

/// Moves a pad off the world origin when it lands within one unit of it.
fn nudge_from_origin(pad: &mut Vec3, size_x: f32) {
    if pad.x.abs() < 1.0 && pad.z.abs() < 1.0 {
        pad.x += 0.1 * size_x;
    }
}

/// Returns `pad2`, moved away from `pad1` along their offset if they are
/// closer than `min_distance`.
pub fn separate(pad1: Vec3, pad2: Vec3, min_distance: f32) -> Vec3 {
    let offset = pad2 - pad1;
    if offset.length() >= min_distance {
        return pad2;
    }
    // Coincident pads have no direction to push along; use +X.
    let dir = offset.try_normalize().unwrap_or(Vec3::X);
    pad1 + dir * min_distance
}

/// Places both pads over the terrain bounds at `water_level`, with the
/// vehicle standing on the first pad.
pub fn place(bounds: &Bounds, water_level: f32) -> Placement {
    let c = bounds.center();
    let s = bounds.size();

    let mut pad1 = Vec3::new(c.x - 0.35 * s.x, water_level, c.z - 0.35 * s.z);
    let mut pad2 = Vec3::new(c.x + 0.30 * s.x, water_level, c.z + 0.30 * s.z);
    nudge_from_origin(&mut pad1, s.x);
    nudge_from_origin(&mut pad2, s.x);

    let pad2 = separate(pad1, pad2, MIN_SEPARATION_FRACTION * s.x);

    Placement {
        pads: [pad1, pad2],
        vehicle: pad1 + Vec3::Y * VEHICLE_LIFT,
    }
}
