use crate::draw::model::Rgb;
use crate::draw::render::blend_pixel;
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Mutable RGBA raster the brushes paint into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    background: Rgb,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_background(width, height, Rgb::WHITE)
    }

    pub fn with_background(width: u32, height: u32, background: Rgb) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut surface = Self {
            width,
            height,
            background,
            pixels: vec![0; buffer_len(width, height)],
        };
        surface.clear();
        surface
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 4;
        let px = &self.pixels[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn clear(&mut self) {
        let bg = self.background;
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[bg.r, bg.g, bg.b, 255]);
        }
    }

    /// Resizing reallocates the buffer; previous content is dropped.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.pixels = vec![0; buffer_len(self.width, self.height)];
        self.clear();
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// Clears the surface and draws `image` scaled to fit, preserving its
    /// aspect ratio and centering it.
    pub fn draw_image_fitted(&mut self, image: &RgbaImage) {
        self.clear();
        let (iw, ih) = image.dimensions();
        if iw == 0 || ih == 0 {
            return;
        }

        let scale = (self.width as f32 / iw as f32).min(self.height as f32 / ih as f32);
        let dw = ((iw as f32 * scale).round() as u32).clamp(1, self.width);
        let dh = ((ih as f32 * scale).round() as u32).clamp(1, self.height);
        let x = (self.width - dw) / 2;
        let y = (self.height - dh) / 2;

        if (dw, dh) == (iw, ih) {
            self.composite(image, x, y);
        } else {
            let scaled = imageops::resize(image, dw, dh, FilterType::Triangle);
            self.composite(&scaled, x, y);
        }
    }

    /// Source-over draws `image` with its top-left corner at `(x, y)`,
    /// clipping whatever falls outside the surface.
    fn composite(&mut self, image: &RgbaImage, x: u32, y: u32) {
        for (ix, iy, px) in image.enumerate_pixels() {
            let (tx, ty) = (x + ix, y + iy);
            if tx >= self.width || ty >= self.height {
                continue;
            }
            let [r, g, b, a] = px.0;
            if a == 0 {
                continue;
            }
            let idx = ((ty as usize * self.width as usize) + tx as usize) * 4;
            blend_pixel(
                &mut self.pixels[idx..idx + 4],
                Rgb::new(r, g, b),
                a as f32 / 255.0,
            );
        }
    }
}

fn buffer_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}
