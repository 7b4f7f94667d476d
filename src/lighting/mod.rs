//! Per-pixel illumination
//!
//! A frame is lit by up to `max_sources` point lights whose rays can be
//! attenuated by up to `max_obstacles` line segments. Sources and obstacles
//! reach the kernel as fixed-length flat buffers (see [`buffers`]); the
//! kernel itself ([`kernel::shade`]) is a pure function of a pixel and
//! those two buffers.
//!
//! Coordinates are Y-up: pixel row `r` of an `h`-row frame sits at
//! `y = h - 1 - r`. Pointer input must be flipped the same way before it is
//! turned into a source position.

pub mod buffers;
pub mod guard;
pub mod kernel;
pub mod visibility;

pub use buffers::{ObstacleBuffer, SourceBuffer};
pub use guard::{DispatchGuard, DEBUG_OVERLAY};
pub use kernel::{occlusion, shade, shade_slices};

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Scalars per source slot: x, y, intensity, r, g, b
pub const SOURCE_STRIDE: usize = 6;

/// Scalars per obstacle slot: start x, start y, end x, end y, opacity
pub const OBSTACLE_STRIDE: usize = 5;

/// Linear RGB triple. Kernel output is unclamped and may exceed 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub fn sum(&self) -> f32 {
        self.r + self.g + self.b
    }

    /// Rescale so the channels add up to `total` (3.0 keeps white as bright
    /// as any other color). Black is returned unchanged.
    pub fn normalized_to(&self, total: f32) -> Rgb {
        let sum = self.sum();
        if sum <= 0.0 {
            return *self;
        }
        let k = total / sum;
        Rgb::new(self.r * k, self.g * k, self.b * k)
    }

    /// Move `factor` of the way toward `target`
    #[inline]
    pub fn lerp(&self, target: &Rgb, factor: f32) -> Rgb {
        Rgb::new(
            self.r + (target.r - self.r) * factor,
            self.g + (target.g - self.g) * factor,
            self.b + (target.b - self.b) * factor,
        )
    }

    /// Clamp to [0, 1] and quantize to 8 bits per channel
    #[inline]
    pub fn to_bytes(&self) -> (u8, u8, u8) {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

fn default_visible() -> bool {
    true
}

/// A point light.
///
/// `intensity <= 0` means the source contributes nothing; such sources are
/// left out of the encoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub position: Point,
    pub intensity: f32,
    pub color: Rgb,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl LightSource {
    pub fn new(position: Point, intensity: f32, color: Rgb) -> Self {
        Self {
            position,
            intensity,
            color,
            visible: true,
        }
    }

    pub fn white(x: f32, y: f32, intensity: f32) -> Self {
        Self::new(Point::new(x, y), intensity, Rgb::WHITE)
    }

    /// Whether this source takes a slot in the encoded buffer
    #[inline]
    pub fn is_lit(&self) -> bool {
        self.visible && self.intensity > 0.0
    }
}

/// A line segment that multiplies the light passing through it by `opacity`
/// (0 blocks completely, 1 has no effect).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub start: Point,
    pub end: Point,
    pub opacity: f32,
}

impl Obstacle {
    pub fn new(start: Point, end: Point, opacity: f32) -> Self {
        Self {
            start,
            end,
            opacity,
        }
    }

    pub fn from_coords(x0: f32, y0: f32, x1: f32, y1: f32, opacity: f32) -> Self {
        Self::new(Point::new(x0, y0), Point::new(x1, y1), opacity)
    }

    /// Zero-length segments are treated as absent
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_color_sums_to_total() {
        let c = Rgb::new(0.95, 0.80, 0.81).normalized_to(3.0);
        assert!((c.sum() - 3.0).abs() < 1e-5);
        assert_eq!(Rgb::BLACK.normalized_to(3.0), Rgb::BLACK);
    }

    #[test]
    fn test_to_bytes_clamps() {
        assert_eq!(Rgb::new(2.0, -1.0, 0.5).to_bytes(), (255, 0, 128));
    }

    #[test]
    fn test_lit_and_degenerate() {
        let mut s = LightSource::white(1.0, 2.0, 10.0);
        assert!(s.is_lit());
        s.visible = false;
        assert!(!s.is_lit());
        assert!(!LightSource::white(1.0, 2.0, 0.0).is_lit());

        assert!(Obstacle::from_coords(3.0, 3.0, 3.0, 3.0, 0.5).is_degenerate());
        assert!(!Obstacle::from_coords(3.0, 3.0, 4.0, 3.0, 0.5).is_degenerate());
    }

    #[test]
    fn test_source_json_defaults_visible() {
        let s: LightSource = serde_json::from_str(
            r#"{"position":{"x":1.0,"y":2.0},"intensity":5.0,"color":{"r":1.0,"g":0.0,"b":0.0}}"#,
        )
        .unwrap();
        assert!(s.visible);
        assert_eq!(s.color, Rgb::new(1.0, 0.0, 0.0));
    }
}
