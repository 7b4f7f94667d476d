use super::Shape;
use crate::config::KernelConfig;
use crate::error::{BufferKind, LightError, Result};
use crate::geometry::Point;
use crate::lighting::{LightSource, Obstacle};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything a session can save: obstacle layout, placed lights and the
/// kernel tunables they were tuned for. Coordinates are kernel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    #[serde(default)]
    pub kernel: KernelConfig,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub sources: Vec<LightSource>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kernel: KernelConfig::default(),
            shapes: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Default layout for a window: a square in the middle and a spinning
    /// hexagon up and to the left of it
    pub fn default_for(width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        let mut scene = Self::new("default");
        scene.add_shape(Shape::square(Point::new(w / 2.0, h / 2.0), 100.0));
        scene.add_shape(Shape::circle(Point::new(w * 0.3, h * 0.7), 60.0, -5.0));
        scene
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Number of obstacle segments the shapes flatten to
    pub fn segment_count(&self) -> usize {
        self.shapes.iter().map(Shape::segment_count).sum()
    }

    /// All shapes flattened to segments at animation time `time`
    pub fn obstacles(&self, time: f32) -> Vec<Obstacle> {
        let mut out = Vec::with_capacity(self.segment_count());
        for shape in &self.shapes {
            shape.append_obstacles(time, &mut out);
        }
        out
    }

    /// Reject scenes that cannot fit the kernel's fixed buffers
    pub fn check_capacity(&self, config: &KernelConfig) -> Result<()> {
        let segments = self.segment_count();
        if segments > config.max_obstacles {
            return Err(LightError::CapacityExceeded {
                kind: BufferKind::Obstacles,
                capacity: config.max_obstacles,
                requested: segments,
            });
        }
        let lit = self.sources.iter().filter(|s| s.is_lit()).count();
        if lit > config.max_sources {
            return Err(LightError::CapacityExceeded {
                kind: BufferKind::Sources,
                capacity: config.max_sources,
                requested: lit,
            });
        }
        Ok(())
    }

    /// Save scene to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        info!("Scene '{}' saved to {}", self.name, path.as_ref().display());
        Ok(())
    }

    /// Load scene from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let scene: Scene = serde_json::from_str(&json)?;
        scene.kernel.validate()?;
        info!(
            "Scene '{}' loaded from {} ({} shapes, {} sources)",
            scene.name,
            path.as_ref().display(),
            scene.shapes.len(),
            scene.sources.len()
        );
        Ok(scene)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_fits_default_capacity() {
        let scene = Scene::default_for(800, 600);
        assert_eq!(scene.segment_count(), 10);
        assert_eq!(scene.obstacles(0.0).len(), 10);
        assert!(scene.check_capacity(&KernelConfig::default()).is_ok());
    }

    #[test]
    fn test_capacity_check() {
        let scene = Scene::default_for(800, 600);
        let tight = KernelConfig {
            max_obstacles: 8,
            ..KernelConfig::default()
        };
        assert!(matches!(
            scene.check_capacity(&tight),
            Err(LightError::CapacityExceeded {
                kind: BufferKind::Obstacles,
                requested: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("umbra-scene-{}.json", std::process::id()));
        let mut scene = Scene::default_for(640, 480);
        scene.sources.push(LightSource::white(5.0, 6.0, 30.0));
        scene.kernel.min_opacity = 0.01;

        scene.save(&path).unwrap();
        let loaded = Scene::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, scene);
    }

    #[test]
    fn test_minimal_json() {
        let scene: Scene = serde_json::from_str(r#"{"name":"empty"}"#).unwrap();
        assert!(scene.shapes.is_empty());
        assert_eq!(scene.kernel, KernelConfig::default());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Scene::load("/nonexistent/umbra/scene.json").unwrap_err();
        assert!(matches!(err, LightError::Io(_)));
    }
}
