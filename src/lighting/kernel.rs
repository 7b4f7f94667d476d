//! The illumination kernel
//!
//! For one pixel, every lit source contributes `intensity / distance`
//! scaled by the product of the opacities of all obstacles crossing the
//! source-to-pixel ray, weighted per channel by the source color. The
//! result is not clamped.

use super::buffers::{ObstacleBuffer, SourceBuffer};
use super::{visibility, Rgb, OBSTACLE_STRIDE, SOURCE_STRIDE};
use crate::config::KernelConfig;
use crate::geometry::{segments_intersect, Point};

/// Color of pixel `(x, y)` lit by the encoded sources and obstacles
#[inline]
pub fn shade(
    x: f32,
    y: f32,
    sources: &SourceBuffer,
    obstacles: &ObstacleBuffer,
    config: &KernelConfig,
) -> Rgb {
    shade_slices(x, y, sources.as_slice(), obstacles.as_slice(), config)
}

/// Raw-slice form of [`shade`].
///
/// # Panics
/// If either slice is not exactly the length `config` implies. A short or
/// long buffer would shift every later slot, so it is never tolerated.
pub fn shade_slices(
    x: f32,
    y: f32,
    sources: &[f32],
    obstacles: &[f32],
    config: &KernelConfig,
) -> Rgb {
    assert_eq!(
        sources.len(),
        config.sources_len(),
        "sources buffer length does not match max_sources"
    );
    assert_eq!(
        obstacles.len(),
        config.obstacles_len(),
        "obstacles buffer length does not match max_obstacles"
    );

    let pixel = Point::new(x, y);
    let mut total = Rgb::BLACK;

    for slot in sources.chunks_exact(SOURCE_STRIDE) {
        let intensity = slot[2];
        // Also rejects NaN
        if !(intensity > 0.0) {
            continue;
        }

        let source = Point::new(slot[0], slot[1]);
        let distance = source.distance_to(&pixel).max(config.min_distance);
        let base = intensity / distance;
        if base < config.min_visible_intensity {
            continue;
        }

        let lit = base * occlusion(source, pixel, obstacles, config);
        total.r += lit * slot[3];
        total.g += lit * slot[4];
        total.b += lit * slot[5];
    }

    total
}

/// Product of the opacities of the obstacles between `source` and `pixel`.
///
/// Stops early once the product falls below `config.min_opacity`; past that
/// point further obstacles cannot make a visible difference.
pub fn occlusion(source: Point, pixel: Point, obstacles: &[f32], config: &KernelConfig) -> f32 {
    let mut accumulated = 1.0_f32;

    for slot in obstacles.chunks_exact(OBSTACLE_STRIDE) {
        if accumulated < config.min_opacity {
            break;
        }

        let start = Point::new(slot[0], slot[1]);
        let end = Point::new(slot[2], slot[3]);
        let opacity = slot[4];

        if start == end || opacity >= 1.0 {
            continue;
        }
        if config.pruning && !visibility::may_occlude(source, pixel, start, end) {
            continue;
        }
        if segments_intersect(source, pixel, start, end) {
            accumulated *= opacity;
        }
    }

    accumulated
}
