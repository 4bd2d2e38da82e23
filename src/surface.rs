// Drawing target for the renderer. The browser draws through the 2D canvas
// context (see canvas.rs); PixelSurface rasterizes into an RGBA buffer that
// can be blitted with putImageData or inspected in tests.

use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, ImageData};

use crate::color::Color;
use crate::config::FillStyle;
use crate::error::Error;

pub trait Surface {
    fn clear(&mut self) -> Result<(), Error>;

    fn fill_circle(
        &mut self,
        center: [f64; 2],
        radius: f64,
        color: Color,
        alpha: f64,
        style: FillStyle,
    ) -> Result<(), Error>;

    fn stroke_line(
        &mut self,
        from: [f64; 2],
        to: [f64; 2],
        color: Color,
        alpha: f64,
        width: f64,
    ) -> Result<(), Error>;
}

pub struct PixelSurface {
    width: u32,
    height: u32,
    pixel_data: Vec<u8>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> PixelSurface {
        PixelSurface {
            width,
            height,
            pixel_data: vec![0x00; (width * height * 4) as usize],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixel_data = vec![0x00; (width * height * 4) as usize];
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixel_data
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.get_pixel_index(x, y).map(|idx| Color {
            r: self.pixel_data[idx],
            g: self.pixel_data[idx + 1],
            b: self.pixel_data[idx + 2],
            a: self.pixel_data[idx + 3],
        })
    }

    /// True while either side is 0, as for a viewport that is not laid out.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    // ImageData rejects a 0 sized buffer, there is nothing to show anyway
    pub fn blit(&self, ctx: &CanvasRenderingContext2d) -> Result<(), Error> {
        if self.is_empty() {
            return Ok(());
        }
        let image_data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&self.pixel_data[..]),
            self.width,
            self.height,
        )?;
        ctx.put_image_data(&image_data, 0.0, 0.0)?;
        Ok(())
    }

    fn get_pixel_index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(((y * self.width as i32 + x) * 4) as usize)
        } else {
            None
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f64) {
        if let Some(dst) = self.pixel(x, y) {
            let out = color.blend_over(dst, alpha);
            let idx = ((y * self.width as i32 + x) * 4) as usize;
            self.pixel_data[idx] = out.r;
            self.pixel_data[idx + 1] = out.g;
            self.pixel_data[idx + 2] = out.b;
            self.pixel_data[idx + 3] = out.a;
        }
    }
}

impl Surface for PixelSurface {
    fn clear(&mut self) -> Result<(), Error> {
        for byte in self.pixel_data.iter_mut() {
            *byte = 0x00;
        }
        Ok(())
    }

    fn fill_circle(
        &mut self,
        center: [f64; 2],
        radius: f64,
        color: Color,
        alpha: f64,
        style: FillStyle,
    ) -> Result<(), Error> {
        if !(radius > 0.0) || alpha <= 0.0 {
            return Ok(());
        }
        let left = (center[0] - radius).floor() as i32;
        let right = (center[0] + radius).ceil() as i32;
        let top = (center[1] - radius).floor() as i32;
        let bottom = (center[1] + radius).ceil() as i32;

        for pixel_y in top.max(0)..bottom.min(self.height as i32) {
            for pixel_x in left.max(0)..right.min(self.width as i32) {
                let dx = pixel_x as f64 + 0.5 - center[0];
                let dy = pixel_y as f64 + 0.5 - center[1];
                let d = (dx * dx + dy * dy).sqrt();
                if d > radius {
                    continue;
                }
                let coverage = match style {
                    FillStyle::Solid => 1.0,
                    FillStyle::Glow => 1.0 - d / radius,
                };
                self.blend_pixel(pixel_x, pixel_y, color, alpha * coverage);
            }
        }
        Ok(())
    }

    // One pixel wide regardless of `width`, good enough for faint links
    fn stroke_line(
        &mut self,
        from: [f64; 2],
        to: [f64; 2],
        color: Color,
        alpha: f64,
        _width: f64,
    ) -> Result<(), Error> {
        if alpha <= 0.0 {
            return Ok(());
        }
        let delta = [to[0] - from[0], to[1] - from[1]];
        let steps = delta[0].abs().max(delta[1].abs()).ceil().max(1.0) as i32;
        let mut last = None;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (from[0] + delta[0] * t).floor() as i32;
            let y = (from[1] + delta[1] * t).floor() as i32;
            if last == Some((x, y)) {
                continue;
            }
            last = Some((x, y));
            self.blend_pixel(x, y, color, alpha);
        }
        Ok(())
    }
}
