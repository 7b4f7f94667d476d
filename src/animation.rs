//! Light rig: the cursor light and the lights placed in the scene
//!
//! The rig is live, mutable state driven by input and a fixed-step clock.
//! The renderer only ever sees a [`LightRig::snapshot`] taken once per frame.

use crate::geometry::Point;
use crate::lighting::{LightSource, Rgb};
use crate::util::Rng;
use log::{debug, info, warn};

/// Simulation step in seconds
pub const STEP: f32 = 0.01;
/// Steps run at most per `update`; the rest of a long stall is dropped
const MAX_STEPS_PER_UPDATE: u32 = 25;

pub const ORBIT_RADIUS: f32 = 150.0;
/// Seconds per radian of orbit
const ORBIT_SLOWDOWN: f32 = 2.0;

/// Fraction of the remaining distance covered per step
const FOLLOW_RATE: f32 = 0.1;
/// Fraction of the remaining color/intensity change covered per idle step
const IDLE_RATE: f32 = 0.02;

pub const IDLE_INTENSITY: f32 = 40.0;
pub const MIN_INTENSITY: f32 = 0.1;
pub const MAX_INTENSITY: f32 = 200.0;

/// Channels of every picked color add up to this
pub const COLOR_TOTAL: f32 = 3.0;

pub const PALETTE: [Rgb; 24] = [
    // pastels
    Rgb::new(0.95, 0.80, 0.81),
    Rgb::new(0.80, 0.89, 0.95),
    Rgb::new(0.87, 0.95, 0.80),
    Rgb::new(0.95, 0.95, 0.80),
    Rgb::new(0.95, 0.87, 0.73),
    Rgb::new(0.89, 0.80, 0.95),
    Rgb::new(0.80, 0.95, 0.91),
    Rgb::new(0.95, 0.85, 0.95),
    Rgb::new(0.89, 0.82, 0.75),
    Rgb::new(0.84, 0.95, 0.88),
    // neons
    Rgb::new(1.0, 0.0, 1.0),
    Rgb::new(0.0, 1.0, 0.0),
    Rgb::new(1.0, 0.8, 0.0),
    Rgb::new(0.0, 1.0, 1.0),
    Rgb::new(1.0, 0.0, 0.0),
    Rgb::new(0.5, 0.0, 1.0),
    Rgb::new(0.8, 1.0, 0.0),
    Rgb::new(1.0, 0.0, 0.5),
    Rgb::new(0.0, 0.5, 1.0),
    Rgb::new(1.0, 1.0, 0.0),
    // primaries
    Rgb::new(1.0, 0.0, 0.0),
    Rgb::new(0.0, 1.0, 0.0),
    Rgb::new(0.0, 0.0, 1.0),
    Rgb::WHITE,
];

pub struct LightRig {
    cursor: LightSource,
    /// Where the cursor light is heading; `None` until the first step
    target: Option<Point>,
    /// Pointer is driving the cursor light; otherwise it orbits
    manual: bool,
    placed: Vec<LightSource>,
    max_sources: usize,
    center: Point,
    clock: f32,
    accumulator: f32,
}

impl LightRig {
    /// `max_sources` counts the cursor light
    pub fn new(center: Point, max_sources: usize) -> Self {
        Self {
            cursor: LightSource::new(orbit_point(center, 0.0), IDLE_INTENSITY, Rgb::WHITE),
            target: None,
            manual: false,
            placed: Vec::new(),
            max_sources,
            center,
            clock: 0.0,
            accumulator: 0.0,
        }
    }

    pub fn cursor(&self) -> &LightSource {
        &self.cursor
    }

    pub fn placed(&self) -> &[LightSource] {
        &self.placed
    }

    pub fn is_orbiting(&self) -> bool {
        !self.manual
    }

    /// Move the idle orbit, e.g. after the window is resized
    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    /// Pointer position in kernel space; the cursor light follows it
    pub fn pointer_moved(&mut self, p: Point) {
        if self.target.is_none() {
            self.cursor.position = p;
        }
        self.target = Some(p);
        self.manual = true;
    }

    /// Hand the cursor light back to the idle orbit
    pub fn resume_orbit(&mut self) {
        if self.manual {
            debug!("cursor light back in orbit");
        }
        self.manual = false;
    }

    /// Wheel notches, positive toward the user; one notch is one unit of
    /// intensity
    pub fn adjust_intensity(&mut self, notches: i32) {
        self.set_intensity(self.cursor.intensity + notches as f32);
    }

    pub fn set_intensity(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.cursor.intensity = value.clamp(MIN_INTENSITY, MAX_INTENSITY);
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.cursor.color = color.normalized_to(COLOR_TOTAL);
    }

    pub fn randomize_color(&mut self, rng: &mut Rng) -> Rgb {
        self.set_color(PALETTE[rng.index(PALETTE.len())]);
        self.cursor.color
    }

    /// Drop a copy of the cursor light at `p`. Returns false when the rig
    /// is already full.
    pub fn place_source_at(&mut self, p: Point) -> bool {
        self.place(LightSource {
            position: p,
            ..self.cursor
        })
    }

    pub fn place(&mut self, source: LightSource) -> bool {
        let p = source.position;
        if self.placed.len() + 1 >= self.max_sources {
            warn!(
                "Light limit reached ({}), not placing at ({:.0}, {:.0})",
                self.max_sources, p.x, p.y
            );
            return false;
        }
        self.placed.push(source);
        info!(
            "Placed light {} at ({:.0}, {:.0})",
            self.placed.len(),
            p.x,
            p.y
        );
        true
    }

    /// Returns how many lights were removed
    pub fn clear_placed(&mut self) -> usize {
        let n = self.placed.len();
        self.placed.clear();
        n
    }

    /// Replace the placed lights, e.g. from a loaded scene
    pub fn restore(&mut self, mut sources: Vec<LightSource>) {
        let room = self.max_sources.saturating_sub(1);
        if sources.len() > room {
            warn!(
                "Scene has {} lights, keeping the first {}",
                sources.len(),
                room
            );
            sources.truncate(room);
        }
        self.placed = sources;
    }

    /// Every light for this frame, cursor first
    pub fn snapshot(&self) -> Vec<LightSource> {
        let mut out = Vec::with_capacity(self.placed.len() + 1);
        out.push(self.cursor);
        out.extend_from_slice(&self.placed);
        out
    }

    /// Advance the clock by `dt` seconds in fixed steps. Returns the number
    /// of steps run.
    pub fn update(&mut self, dt: f32) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }

        let mut steps = 0;
        while self.accumulator >= STEP {
            if steps == MAX_STEPS_PER_UPDATE {
                self.accumulator = 0.0;
                break;
            }
            self.accumulator -= STEP;
            self.clock += STEP;
            self.step();
            steps += 1;
        }
        steps
    }

    fn step(&mut self) {
        if !self.manual {
            let orbit = orbit_point(self.center, self.clock);
            if self.target.is_none() {
                self.cursor.position = orbit;
            }
            self.target = Some(orbit);
            self.cursor.color = self.cursor.color.lerp(&Rgb::WHITE, IDLE_RATE);
            self.cursor.intensity += (IDLE_INTENSITY - self.cursor.intensity) * IDLE_RATE;
            self.cursor.visible = true;
        }

        if let Some(target) = self.target {
            self.cursor.position = self.cursor.position.lerp(&target, FOLLOW_RATE);
        }
    }
}

fn orbit_point(center: Point, time: f32) -> Point {
    let angle = time / ORBIT_SLOWDOWN;
    Point::new(
        center.x + ORBIT_RADIUS * angle.cos(),
        center.y + ORBIT_RADIUS * angle.sin(),
    )
}
