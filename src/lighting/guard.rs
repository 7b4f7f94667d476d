//! Skips a full-grid dispatch when nothing the kernel reads has changed

use super::buffers::{ObstacleBuffer, SourceBuffer};
use log::debug;

/// Frame flag: obstacle overlay is drawn on top of the light field
pub const DEBUG_OVERLAY: u32 = 1 << 0;

#[derive(Debug, Default)]
struct FrameKey {
    sources: Vec<u8>,
    obstacles: Vec<u8>,
    flags: u32,
}

impl FrameKey {
    fn matches(&self, sources: &SourceBuffer, obstacles: &ObstacleBuffer, flags: u32) -> bool {
        self.flags == flags
            && self.sources == sources.as_bytes()
            && self.obstacles == obstacles.as_bytes()
    }

    fn store(&mut self, sources: &SourceBuffer, obstacles: &ObstacleBuffer, flags: u32) {
        self.sources.clear();
        self.sources.extend_from_slice(sources.as_bytes());
        self.obstacles.clear();
        self.obstacles.extend_from_slice(obstacles.as_bytes());
        self.flags = flags;
    }
}

/// Remembers the previous frame's encoded inputs.
///
/// Comparison is byte-for-byte, so `-0.0` and `0.0` count as different
/// inputs. Since pixel output is a pure function of these inputs, a skipped
/// frame is identical to the one already rendered.
#[derive(Debug, Default)]
pub struct DispatchGuard {
    previous: Option<FrameKey>,
    dispatched: u64,
    skipped: u64,
}

impl DispatchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the kernel has to run for these inputs, and records
    /// them as the latest frame.
    pub fn should_dispatch(
        &mut self,
        sources: &SourceBuffer,
        obstacles: &ObstacleBuffer,
        flags: u32,
    ) -> bool {
        if let Some(key) = &self.previous {
            if key.matches(sources, obstacles, flags) {
                self.skipped += 1;
                debug!("inputs unchanged, skipping dispatch #{}", self.skipped);
                return false;
            }
        }

        self.previous
            .get_or_insert_with(FrameKey::default)
            .store(sources, obstacles, flags);
        self.dispatched += 1;
        true
    }

    /// Force the next frame to dispatch (resize, reload)
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}
