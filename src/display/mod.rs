mod pixel_buffer;

pub use pixel_buffer::PixelBuffer;

use crate::error::{LightError, Result};
use crate::geometry::Point;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::{MouseButton, MouseWheelDirection};
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
}

pub struct RenderTarget<'a> {
    texture: Texture<'a>,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    MouseMove {
        x: i32,
        y: i32,
    },
    /// Left button pressed
    Click {
        x: i32,
        y: i32,
    },
    /// Wheel notches, positive toward the user
    Wheel(i32),
    /// Pointer left the window
    PointerLeft,
    /// New drawable size in pixels, never zero
    Resized {
        width: u32,
        height: u32,
    },
}

impl Display {
    /// Create a resizable window with the given initial resolution
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>)> {
        let sdl_context = sdl2::init().map_err(LightError::Display)?;
        let video_subsystem = sdl_context.video().map_err(LightError::Display)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| LightError::Display(e.to_string()))?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder
            .build()
            .map_err(|e| LightError::Display(e.to_string()))?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(LightError::Display)?;

        Ok((
            Self { canvas, event_pump },
            texture_creator,
        ))
    }

    pub fn present(&mut self, target: &mut RenderTarget, buffer: &PixelBuffer) -> Result<()> {
        target
            .texture
            .update(None, buffer.as_bytes(), buffer.width() as usize * 4)
            .map_err(|e| LightError::Display(e.to_string()))?;

        self.canvas
            .copy(&target.texture, None, None)
            .map_err(LightError::Display)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::MouseMotion { x, y, .. } => events.push(InputEvent::MouseMove { x, y }),
                Event::MouseButtonDown {
                    x,
                    y,
                    mouse_btn: MouseButton::Left,
                    ..
                } => events.push(InputEvent::Click { x, y }),
                Event::MouseWheel { y, direction, .. } if y != 0 => {
                    events.push(InputEvent::Wheel(wheel_notches(y, direction)));
                },
                Event::Window { win_event, .. } => match win_event {
                    WindowEvent::Leave => events.push(InputEvent::PointerLeft),
                    WindowEvent::SizeChanged(w, h) if w > 0 && h > 0 => {
                        events.push(InputEvent::Resized {
                            width: w as u32,
                            height: h as u32,
                        });
                    },
                    _ => {},
                },
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Create render target with custom resolution
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
            .map_err(|e| LightError::Display(e.to_string()))?;
        Ok(Self { texture })
    }
}

/// SDL reports `y > 0` for a wheel turned away from the user unless the
/// platform flips it. Returns notches with positive meaning toward the user.
pub fn wheel_notches(y: i32, direction: MouseWheelDirection) -> i32 {
    match direction {
        MouseWheelDirection::Flipped => y,
        _ => y.saturating_neg(),
    }
}

/// Window coordinates (Y-down) to kernel space (Y-up)
#[inline]
pub fn to_kernel_space(x: i32, y: i32, height: u32) -> Point {
    Point::new(x as f32, (height as i32 - 1 - y) as f32)
}

/// Kernel space (Y-up) to window coordinates (Y-down), rounded.
/// Points far outside the window saturate at the `i32` limits.
#[inline]
pub fn to_window_space(p: Point, height: u32) -> (i32, i32) {
    let y = height as f64 - 1.0 - p.y as f64;
    (p.x.round() as i32, y.round() as i32)
}
