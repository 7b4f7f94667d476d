//! Full-grid dispatch of the illumination kernel
//!
//! One rayon task per row; every task reads the same immutable encoded
//! buffers and writes only its own row of the HDR frame. A frame either
//! completes or is not produced at all.

use crate::config::KernelConfig;
use crate::display::PixelBuffer;
use crate::error::{BufferKind, LightError, Result};
use crate::lighting::{shade_slices, DispatchGuard, ObstacleBuffer, Rgb, SourceBuffer};
use log::info;
use rayon::prelude::*;

/// Unclamped light field for a `width` x `height` window, plus the worker
/// pool and the guard that decides whether a frame needs recomputing.
pub struct LightField {
    width: u32,
    height: u32,
    config: KernelConfig,
    frame: Vec<Rgb>,
    pool: rayon::ThreadPool,
    guard: DispatchGuard,
}

impl LightField {
    /// `threads == 0` uses one worker per core.
    ///
    /// Fails with [`LightError::Backend`] if the worker pool cannot be
    /// created; callers should treat that as fatal rather than retry.
    pub fn new(width: u32, height: u32, config: KernelConfig, threads: usize) -> Result<Self> {
        config.validate()?;
        check_size(width, height)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("umbra-shade-{}", i))
            .build()
            .map_err(|e| LightError::Backend(e.to_string()))?;

        info!(
            "Light field {}x{} on {} threads ({} source slots, {} obstacle slots)",
            width,
            height,
            pool.current_num_threads(),
            config.max_sources,
            config.max_obstacles
        );

        Ok(Self {
            width,
            height,
            config,
            frame: vec![Rgb::BLACK; pixel_count(width, height)],
            pool,
            guard: DispatchGuard::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn guard(&self) -> &DispatchGuard {
        &self.guard
    }

    /// Recompute the frame if the inputs changed since the last call.
    /// Returns whether the kernel ran.
    pub fn render(
        &mut self,
        sources: &SourceBuffer,
        obstacles: &ObstacleBuffer,
        flags: u32,
    ) -> Result<bool> {
        check_capacity(BufferKind::Sources, sources.capacity(), self.config.max_sources)?;
        check_capacity(
            BufferKind::Obstacles,
            obstacles.capacity(),
            self.config.max_obstacles,
        )?;

        if !self.guard.should_dispatch(sources, obstacles, flags) {
            return Ok(false);
        }

        let (width, height) = (self.width as usize, self.height as usize);
        let config = &self.config;
        let frame = &mut self.frame;
        let src = sources.as_slice();
        let obs = obstacles.as_slice();

        self.pool.install(|| {
            frame
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(row, line)| {
                    // Row 0 is the top of the window; kernel space is Y-up
                    let y = (height - 1 - row) as f32;
                    for (col, out) in line.iter_mut().enumerate() {
                        *out = shade_slices(col as f32, y, src, obs, config);
                    }
                });
        });

        Ok(true)
    }

    /// Force the next [`render`](Self::render) to dispatch
    pub fn invalidate(&mut self) {
        self.guard.invalidate();
    }

    /// Reallocate for a new window size
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_size(width, height)?;
        self.width = width;
        self.height = height;
        self.frame = vec![Rgb::BLACK; pixel_count(width, height)];
        self.guard.invalidate();
        Ok(())
    }

    /// HDR value at window column `col`, row `row` (row 0 at the top)
    pub fn sample(&self, col: u32, row: u32) -> Option<Rgb> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.frame
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    /// Clamp and quantize into an 8-bit buffer. Only the overlapping area is
    /// written if the sizes differ.
    pub fn tone_map(&self, buffer: &mut PixelBuffer) {
        let rows = self.height.min(buffer.height());
        for (row, line) in self
            .frame
            .chunks_exact(self.width as usize)
            .take(rows as usize)
            .enumerate()
        {
            buffer.put_row(row as u32, line.iter().map(Rgb::to_bytes));
        }
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(LightError::InvalidConfig(format!(
            "light field must be at least 1x1, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

fn check_capacity(kind: BufferKind, capacity: usize, expected: usize) -> Result<()> {
    if capacity != expected {
        return Err(LightError::BufferLength {
            kind,
            expected: expected * stride(kind),
            actual: capacity * stride(kind),
        });
    }
    Ok(())
}

fn stride(kind: BufferKind) -> usize {
    match kind {
        BufferKind::Sources => crate::lighting::SOURCE_STRIDE,
        BufferKind::Obstacles => crate::lighting::OBSTACLE_STRIDE,
    }
}
