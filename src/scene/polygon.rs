use crate::geometry::Point;
use crate::lighting::Obstacle;
use serde::{Deserialize, Serialize};

/// A closed polygon defined by vertices
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

impl Polygon {
    pub fn from_vertices(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle with `origin` at its lower-left corner
    pub fn rectangle(origin: Point, width: f32, height: f32) -> Self {
        Self::from_vertices(vec![
            origin,
            Point::new(origin.x + width, origin.y),
            Point::new(origin.x + width, origin.y + height),
            Point::new(origin.x, origin.y + height),
        ])
    }

    /// Regular polygon inscribed in a circle; `phase` rotates it (radians)
    pub fn regular(center: Point, radius: f32, sides: usize, phase: f32) -> Self {
        let vertices = (0..sides)
            .map(|i| {
                let angle = phase + (i as f32 / sides as f32) * std::f32::consts::TAU;
                Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
            })
            .collect();
        Self::from_vertices(vertices)
    }

    /// Edges as line segments, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = (&Point, &Point)> {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }

    /// Edges as obstacles sharing one opacity
    pub fn obstacles(&self, opacity: f32) -> impl Iterator<Item = Obstacle> + '_ {
        self.edges()
            .map(move |(a, b)| Obstacle::new(*a, *b, opacity))
    }
}
