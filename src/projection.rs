/// Pseudo-3D to screen projection.
///
/// Both models are pure: same inputs, same `ScreenPoint`. Depth is clamped
/// to `MIN_DEPTH` before any division, so there is no failure path.

use serde::{Deserialize, Serialize};

use crate::entities::{clamp_depth, ScreenPoint, Vec3Depth};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Projection {
    /// `scale = 1 / depth`, centred on the middle of the screen.
    InverseDepth,
    /// Pinhole camera looking along the ground. World "up" is screen "up",
    /// and the horizon sits `ground_offset` pixels above the bottom edge.
    Pinhole { focal_length: f32, ground_offset: f32 },
}

impl Projection {
    /// Screen-space magnification at the given depth.
    pub fn scale(&self, depth: f32) -> f32 {
        let depth = clamp_depth(depth);
        match *self {
            Projection::InverseDepth => 1.0 / depth,
            Projection::Pinhole { focal_length, .. } => focal_length / depth,
        }
    }

    /// Project a point whose lateral/vertical are already relative to the
    /// projection centre.
    pub fn project(&self, lateral: f32, vertical: f32, depth: f32, width: u16, height: u16) -> ScreenPoint {
        let scale = self.scale(depth);
        let w = f32::from(width);
        let h = f32::from(height);
        let (x, y) = match *self {
            Projection::InverseDepth => (lateral * scale + w / 2.0, vertical * scale + h / 2.0),
            Projection::Pinhole { ground_offset, .. } => {
                (lateral * scale + w / 2.0, -vertical * scale + h - ground_offset)
            }
        };
        ScreenPoint {
            x: x as i32,
            y: y as i32,
        }
    }

    /// Project a point given in display-frame world coordinates.
    ///
    /// Lateral is always re-centred on the screen middle. Vertical is
    /// re-centred only for the inverse-depth model; the pinhole model
    /// measures height above the ground.
    pub fn project_world(&self, point: &Vec3Depth, width: u16, height: u16) -> ScreenPoint {
        let lateral = point.lateral - f32::from(width) / 2.0;
        let vertical = match self {
            Projection::InverseDepth => point.vertical - f32::from(height) / 2.0,
            Projection::Pinhole { .. } => point.vertical,
        };
        self.project(lateral, vertical, point.depth, width, height)
    }

    /// On-screen size of something `size` world units across at `depth`.
    pub fn apparent_size(&self, size: f32, depth: f32) -> f32 {
        size * self.scale(depth)
    }
}
