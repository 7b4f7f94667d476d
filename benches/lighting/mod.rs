pub mod frame;
pub mod kernel;

use umbra::lighting::{LightSource, Obstacle, ObstacleBuffer, SourceBuffer};
use umbra::scene::Scene;

pub const WIDTH: u32 = 320;
pub const HEIGHT: u32 = 240;

/// Default layout plus three lights, encoded at the default capacities
pub fn default_buffers() -> (SourceBuffer, ObstacleBuffer) {
    let scene = Scene::default_for(WIDTH, HEIGHT);
    let lights = [
        LightSource::white(40.0, 40.0, 40.0),
        LightSource::white(280.0, 200.0, 25.0),
        LightSource::white(160.0, 20.0, 60.0),
    ];
    let segments: Vec<Obstacle> = scene.obstacles(0.0);
    (
        SourceBuffer::encode(&lights, scene.kernel.max_sources).unwrap(),
        ObstacleBuffer::encode(&segments, scene.kernel.max_obstacles).unwrap(),
    )
}
