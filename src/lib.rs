//! umbra: point lights and shadow-casting segments, lit per pixel
//!
//! The core is [`lighting`]: a pure per-pixel kernel over two fixed-length
//! encoded buffers. [`render`] runs it across a whole frame, [`scene`] and
//! [`animation`] produce what goes into the buffers, and [`display`] puts
//! the result in a window.

pub mod animation;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod lighting;
pub mod remote;
pub mod render;
pub mod scene;
pub mod util;

pub use error::{LightError, Result};
