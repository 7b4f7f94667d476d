/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8) {
    dest[0] = 255; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering.
/// Row 0 is the top of the window.
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a new pixel buffer with custom resolution
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
        }
    }

    /// Fast unchecked pixel set - use when you've already bounds-checked
    #[inline]
    pub unsafe fn set_pixel_unchecked(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) {
        let idx = self.pixel_index(x, y);
        *self.pixels.get_unchecked_mut(idx) = 255;
        *self.pixels.get_unchecked_mut(idx + 1) = b;
        *self.pixels.get_unchecked_mut(idx + 2) = g;
        *self.pixels.get_unchecked_mut(idx + 3) = r;
    }

    /// Read a pixel from the buffer (bounds checked)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
            ))
        } else {
            None
        }
    }

    /// Overwrite row `y` from the left edge. Extra colors are ignored.
    pub fn put_row(&mut self, y: u32, colors: impl IntoIterator<Item = (u8, u8, u8)>) {
        if y >= self.height {
            return;
        }
        let start = self.pixel_index(0, y);
        let end = start + self.width as usize * 4;
        for (dest, (r, g, b)) in self.pixels[start..end].chunks_exact_mut(4).zip(colors) {
            write_pixel(dest, r, g, b);
        }
    }

    /// Set a pixel from wide coordinates; anything off the buffer is ignored
    #[inline]
    fn plot(&mut self, x: i64, y: i64, r: u8, g: u8, b: u8) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.set_pixel(x, y, r, g, b);
        }
    }

    /// Draw a circle outline (1px thick). Circles entirely off the buffer
    /// are skipped.
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, r: u8, g: u8, b: u8) {
        let (cx, cy, radius) = (cx as i64, cy as i64, radius as i64);
        let (w, h) = (self.width as i64, self.height as i64);
        if cx + radius < 0 || cy + radius < 0 || cx - radius >= w || cy - radius >= h {
            return;
        }

        // Midpoint circle algorithm
        let mut x = radius;
        let mut y = 0;
        let mut err = 0;

        while x >= y {
            for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                self.plot(cx + dx, cy + dy, r, g, b);
            }

            y += 1;
            err += 1 + 2 * y;
            if 2 * (err - x) + 1 > 0 {
                x -= 1;
                err += 1 - 2 * x;
            }
        }
    }

    /// Draw a line using Bresenham's algorithm with Cohen-Sutherland clipping.
    /// Endpoints may be anywhere in the `i32` range.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, r: u8, g: u8, b: u8) {
        let Some((cx0, cy0, cx1, cy1)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };

        let dx = (cx1 - cx0).abs();
        let dy = -((cy1 - cy0).abs());
        let sx = if cx0 < cx1 { 1i32 } else { -1i32 };
        let sy = if cy0 < cy1 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = cx0;
        let mut y = cy0;

        loop {
            // Safety: clip_line only returns in-bounds endpoints
            unsafe {
                self.set_pixel_unchecked(x as u32, y as u32, r, g, b);
            }
            if x == cx1 && y == cy1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Cohen-Sutherland line clipping in 64-bit coordinates.
    /// Returns the clipped endpoints, all inside the buffer, or `None` if the
    /// line misses it.
    fn clip_line(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<(i32, i32, i32, i32)> {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const BOTTOM: u8 = 4;
        const TOP: u8 = 8;
        // Converges in at most 4 iterations for valid input
        const MAX_ITERATIONS: u32 = 16;

        let w = self.width as i64;
        let h = self.height as i64;
        let (mut x0, mut y0, mut x1, mut y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);

        let outcode = |x: i64, y: i64| -> u8 {
            let mut code = INSIDE;
            if x < 0 {
                code |= LEFT;
            } else if x >= w {
                code |= RIGHT;
            }
            if y < 0 {
                code |= TOP;
            } else if y >= h {
                code |= BOTTOM;
            }
            code
        };

        let mut code0 = outcode(x0, y0);
        let mut code1 = outcode(x1, y1);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == 0 {
                // Both inside, so each fits in i32
                return Some((x0 as i32, y0 as i32, x1 as i32, y1 as i32));
            }
            if (code0 & code1) != 0 {
                return None;
            }

            let code_out = if code0 != 0 { code0 } else { code1 };
            let dy = y1 - y0;
            let dx = x1 - x0;

            let (x, y) = if (code_out & BOTTOM) != 0 {
                (x0 + scaled(dx, h - 1 - y0, dy)?, h - 1)
            } else if (code_out & TOP) != 0 {
                (x0 + scaled(dx, -y0, dy)?, 0)
            } else if (code_out & RIGHT) != 0 {
                (w - 1, y0 + scaled(dy, w - 1 - x0, dx)?)
            } else {
                (0, y0 + scaled(dy, -x0, dx)?)
            };

            if code_out == code0 {
                x0 = x;
                y0 = y;
                code0 = outcode(x0, y0);
            } else {
                x1 = x;
                y1 = y;
                code1 = outcode(x1, y1);
            }
        }

        None
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

/// `span * num / den` without intermediate overflow; `None` when `den` is 0
#[inline]
fn scaled(span: i64, num: i64, den: i64) -> Option<i64> {
    if den == 0 {
        return None;
    }
    Some((span as i128 * num as i128 / den as i128) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_pixel() {
        let mut buffer = PixelBuffer::with_size(4, 3);
        buffer.set_pixel(1, 2, 10, 20, 30);
        assert_eq!(buffer.get_pixel(1, 2), Some((10, 20, 30)));
        assert_eq!(buffer.get_pixel(4, 0), None);
        // Out of bounds writes are ignored
        buffer.set_pixel(-1, 0, 1, 1, 1);
    }

    #[test]
    fn test_put_row_stops_at_width() {
        let mut buffer = PixelBuffer::with_size(2, 2);
        buffer.put_row(1, [(1, 2, 3), (4, 5, 6), (7, 8, 9)]);
        assert_eq!(buffer.get_pixel(0, 1), Some((1, 2, 3)));
        assert_eq!(buffer.get_pixel(1, 1), Some((4, 5, 6)));
        assert_eq!(buffer.get_pixel(0, 0), Some((0, 0, 0)));
        buffer.put_row(5, [(1, 1, 1)]);
    }

    #[test]
    fn test_line_is_clipped() {
        let mut buffer = PixelBuffer::with_size(10, 10);
        buffer.line(-20, 5, 30, 5, 255, 0, 0);
        for x in 0..10 {
            assert_eq!(buffer.get_pixel(x, 5), Some((255, 0, 0)));
        }
        assert_eq!(buffer.get_pixel(0, 4), Some((0, 0, 0)));
    }

    #[test]
    fn test_far_off_screen_line_is_clipped() {
        let mut buffer = PixelBuffer::with_size(800, 600);
        buffer.line(-100_000, -100_000, 100_000, 100_000, 0, 255, 0);
        assert_eq!(buffer.get_pixel(0, 0), Some((0, 255, 0)));
        assert_eq!(buffer.get_pixel(599, 599), Some((0, 255, 0)));
        assert_eq!(buffer.get_pixel(1, 0), Some((0, 0, 0)));

        buffer.line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, 1, 1, 1);
        buffer.line(i32::MIN, 300, i32::MAX, 300, 2, 2, 2);
        assert_eq!(buffer.get_pixel(400, 300), Some((2, 2, 2)));
        // Entirely off screen
        buffer.line(i32::MAX, 0, i32::MAX, i32::MAX, 3, 3, 3);
    }

    #[test]
    fn test_circle_near_i32_limits() {
        let mut buffer = PixelBuffer::with_size(10, 10);
        buffer.draw_circle(i32::MAX, i32::MAX, 4, 255, 255, 255);
        buffer.draw_circle(i32::MIN, 5, i32::MAX, 255, 255, 255);
        buffer.draw_circle(5, 5, 2, 9, 9, 9);
        assert_eq!(buffer.get_pixel(7, 5), Some((9, 9, 9)));
        assert_eq!(buffer.get_pixel(5, 5), Some((0, 0, 0)));
    }
}
