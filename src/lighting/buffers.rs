//! Fixed-length flat buffers fed to the kernel
//!
//! Each buffer always holds `capacity` slots regardless of how many entities
//! are live; unused trailing slots are zero. A zeroed source slot has
//! intensity 0 and a zeroed obstacle slot has zero length, so both read back
//! as "nothing here". [`SourceBuffer::slots`] and [`ObstacleBuffer::slots`]
//! expose that convention as `Option`.

use super::{LightSource, Obstacle, Rgb, OBSTACLE_STRIDE, SOURCE_STRIDE};
use crate::error::{BufferKind, LightError, Result};
use crate::geometry::Point;

fn check_len(kind: BufferKind, values: &[f32], capacity: usize, stride: usize) -> Result<()> {
    let expected = capacity * stride;
    if values.len() != expected {
        return Err(LightError::BufferLength {
            kind,
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

// ============================================================================
// Sources
// ============================================================================

/// Encoded light sources: `capacity` slots of (x, y, intensity, r, g, b)
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBuffer {
    values: Vec<f32>,
    capacity: usize,
}

impl SourceBuffer {
    /// All slots empty
    pub fn empty(capacity: usize) -> Self {
        Self {
            values: vec![0.0; capacity * SOURCE_STRIDE],
            capacity,
        }
    }

    /// Encode lit sources in order, zero-padding the rest.
    ///
    /// Invisible and zero-intensity sources are left out. If more lit sources
    /// than `capacity` are supplied the whole snapshot is rejected rather than
    /// dropping some of them.
    pub fn encode(sources: &[LightSource], capacity: usize) -> Result<Self> {
        let lit = sources.iter().filter(|s| s.is_lit()).count();
        if lit > capacity {
            return Err(LightError::CapacityExceeded {
                kind: BufferKind::Sources,
                capacity,
                requested: lit,
            });
        }

        let mut buffer = Self::empty(capacity);
        for (slot, source) in buffer
            .values
            .chunks_exact_mut(SOURCE_STRIDE)
            .zip(sources.iter().filter(|s| s.is_lit()))
        {
            slot.copy_from_slice(&[
                source.position.x,
                source.position.y,
                source.intensity,
                source.color.r,
                source.color.g,
                source.color.b,
            ]);
        }
        Ok(buffer)
    }

    /// Wrap an already flattened buffer, checking its length
    pub fn from_raw(values: Vec<f32>, capacity: usize) -> Result<Self> {
        check_len(BufferKind::Sources, &values, capacity, SOURCE_STRIDE)?;
        Ok(Self { values, capacity })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.values)
    }

    /// Decode one slot; `None` for an empty slot or an out-of-range index
    pub fn slot(&self, index: usize) -> Option<LightSource> {
        let start = index.checked_mul(SOURCE_STRIDE)?;
        let s = self.values.get(start..start + SOURCE_STRIDE)?;
        if s[2] > 0.0 {
            Some(LightSource::new(
                Point::new(s[0], s[1]),
                s[2],
                Rgb::new(s[3], s[4], s[5]),
            ))
        } else {
            None
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = Option<LightSource>> + '_ {
        (0..self.capacity).map(move |i| self.slot(i))
    }

    /// The occupied slots, in order
    pub fn decode(&self) -> Vec<LightSource> {
        self.slots().flatten().collect()
    }

    /// Number of occupied slots
    pub fn occupied(&self) -> usize {
        self.slots().filter(Option::is_some).count()
    }
}

// ============================================================================
// Obstacles
// ============================================================================

/// Encoded obstacles: `capacity` slots of (x0, y0, x1, y1, opacity)
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleBuffer {
    values: Vec<f32>,
    capacity: usize,
}

impl ObstacleBuffer {
    pub fn empty(capacity: usize) -> Self {
        Self {
            values: vec![0.0; capacity * OBSTACLE_STRIDE],
            capacity,
        }
    }

    /// Encode non-degenerate obstacles in order, zero-padding the rest.
    /// Rejects the snapshot when more than `capacity` remain.
    pub fn encode(obstacles: &[Obstacle], capacity: usize) -> Result<Self> {
        let live = obstacles.iter().filter(|o| !o.is_degenerate()).count();
        if live > capacity {
            return Err(LightError::CapacityExceeded {
                kind: BufferKind::Obstacles,
                capacity,
                requested: live,
            });
        }

        let mut buffer = Self::empty(capacity);
        for (slot, obstacle) in buffer
            .values
            .chunks_exact_mut(OBSTACLE_STRIDE)
            .zip(obstacles.iter().filter(|o| !o.is_degenerate()))
        {
            slot.copy_from_slice(&[
                obstacle.start.x,
                obstacle.start.y,
                obstacle.end.x,
                obstacle.end.y,
                obstacle.opacity,
            ]);
        }
        Ok(buffer)
    }

    pub fn from_raw(values: Vec<f32>, capacity: usize) -> Result<Self> {
        check_len(BufferKind::Obstacles, &values, capacity, OBSTACLE_STRIDE)?;
        Ok(Self { values, capacity })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.values)
    }

    pub fn slot(&self, index: usize) -> Option<Obstacle> {
        let start = index.checked_mul(OBSTACLE_STRIDE)?;
        let s = self.values.get(start..start + OBSTACLE_STRIDE)?;
        let obstacle = Obstacle::from_coords(s[0], s[1], s[2], s[3], s[4]);
        if obstacle.is_degenerate() {
            None
        } else {
            Some(obstacle)
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = Option<Obstacle>> + '_ {
        (0..self.capacity).map(move |i| self.slot(i))
    }

    pub fn decode(&self) -> Vec<Obstacle> {
        self.slots().flatten().collect()
    }

    pub fn occupied(&self) -> usize {
        self.slots().filter(Option::is_some).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sources(n: usize) -> Vec<LightSource> {
        (0..n)
            .map(|i| {
                let f = i as f32;
                LightSource::new(
                    Point::new(10.0 * f, 20.0 + f),
                    5.0 + f,
                    Rgb::new(0.1 * f, 0.5, 1.0 - 0.05 * f),
                )
            })
            .collect()
    }

    #[test]
    fn test_sources_round_trip_with_padding() {
        for n in [0, 1, 4, 10] {
            let sources = sample_sources(n);
            let buffer = SourceBuffer::encode(&sources, 10).unwrap();

            assert_eq!(buffer.as_slice().len(), 60);
            assert_eq!(buffer.decode(), sources);
            assert_eq!(buffer.occupied(), n);
            assert!(buffer.as_slice()[n * SOURCE_STRIDE..].iter().all(|&v| v == 0.0));
            assert!(buffer.slots().skip(n).all(|s| s.is_none()));
        }
    }

    #[test]
    fn test_unlit_sources_are_skipped() {
        let mut sources = sample_sources(3);
        sources[0].visible = false;
        sources[1].intensity = 0.0;
        let buffer = SourceBuffer::encode(&sources, 4).unwrap();
        assert_eq!(buffer.decode(), vec![sources[2]]);
    }

    #[test]
    fn test_sources_over_capacity_rejected() {
        let err = SourceBuffer::encode(&sample_sources(11), 10).unwrap_err();
        assert!(matches!(
            err,
            LightError::CapacityExceeded {
                kind: BufferKind::Sources,
                capacity: 10,
                requested: 11
            }
        ));

        // Unlit entries do not count against the cap
        let mut sources = sample_sources(11);
        sources[3].visible = false;
        assert!(SourceBuffer::encode(&sources, 10).is_ok());
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(SourceBuffer::from_raw(vec![0.0; 12], 2).is_ok());
        let err = SourceBuffer::from_raw(vec![0.0; 13], 2).unwrap_err();
        assert!(matches!(
            err,
            LightError::BufferLength {
                expected: 12,
                actual: 13,
                ..
            }
        ));
        assert!(ObstacleBuffer::from_raw(vec![0.0; 9], 2).is_err());
    }

    #[test]
    fn test_obstacles_round_trip_and_skip_degenerate() {
        let obstacles = vec![
            Obstacle::from_coords(0.0, 0.0, 10.0, 0.0, 0.4),
            Obstacle::from_coords(5.0, 5.0, 5.0, 5.0, 0.0),
            Obstacle::from_coords(1.0, 2.0, 3.0, 4.0, 0.9),
        ];
        let buffer = ObstacleBuffer::encode(&obstacles, 8).unwrap();
        assert_eq!(buffer.as_slice().len(), 40);
        assert_eq!(buffer.decode(), vec![obstacles[0], obstacles[2]]);
        assert_eq!(buffer.occupied(), 2);
        assert!(buffer.slot(2).is_none());
        assert!(buffer.slot(8).is_none());
    }

    #[test]
    fn test_obstacles_over_capacity_rejected() {
        let obstacles: Vec<_> = (0..3)
            .map(|i| Obstacle::from_coords(i as f32, 0.0, i as f32, 1.0, 0.5))
            .collect();
        assert!(ObstacleBuffer::encode(&obstacles, 2).is_err());
        assert!(ObstacleBuffer::encode(&obstacles, 3).is_ok());
    }

    #[test]
    fn test_bytes_view_matches_values() {
        let buffer = SourceBuffer::encode(&sample_sources(2), 3).unwrap();
        assert_eq!(buffer.as_bytes().len(), 3 * SOURCE_STRIDE * 4);
        assert_eq!(&buffer.as_bytes()[..4], &0.0f32.to_ne_bytes());
    }
}
