use crate::draw::model::{BrushConfig, BrushType, Rgb, Segment};
use crate::draw::render::{stroke_segment, DashPattern, DirtyRect, LineCap, StrokeStyle};
use crate::draw::surface::Surface;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CRAYON_PASSES: usize = 5;
const CRAYON_JITTER: f32 = 0.15;
const CRAYON_ALPHA: f32 = 0.9;

const WATERCOLOR_PASSES: usize = 6;
const WATERCOLOR_ALPHA: f32 = 0.1;

const PENCIL_DASH: DashPattern = DashPattern::new(0.5, 2.0);
const PENCIL_WIDTH_SCALE: f32 = 0.5;
const PENCIL_ALPHA: f32 = 0.6;

const OIL_WIDTH_SCALE: f32 = 1.5;
const OIL_BLEND_STEPS: usize = 5;

/// Paints segments with one of the procedural brushes.
///
/// Crayon and watercolor draw from the renderer's own RNG; seed it with
/// [`StrokeRenderer::with_seed`] to make their output reproducible.
#[derive(Debug)]
pub struct StrokeRenderer {
    rng: StdRng,
}

impl Default for StrokeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeRenderer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn render(
        &mut self,
        surface: &mut Surface,
        segment: Segment,
        brush: &BrushConfig,
    ) -> Option<DirtyRect> {
        let color = brush.paint_color(surface.background());
        let size = brush.size_f32();
        match brush.brush {
            BrushType::Crayon => self.render_crayon(surface, segment, color, size),
            BrushType::Watercolor => self.render_watercolor(surface, segment, color, size),
            BrushType::Pencil => render_pencil(surface, segment, color, size),
            BrushType::Oil => render_oil(surface, segment, color, brush.color, size),
            BrushType::Default => render_plain(surface, segment, color, size),
        }
    }

    fn render_crayon(
        &mut self,
        surface: &mut Surface,
        segment: Segment,
        color: Rgb,
        size: f32,
    ) -> Option<DirtyRect> {
        let style = StrokeStyle::solid(size).with_alpha(CRAYON_ALPHA);
        let reach = size * CRAYON_JITTER;
        let mut dirty = None;
        for _ in 0..CRAYON_PASSES {
            let dx = self.rng.gen_range(-reach..reach);
            let dy = self.rng.gen_range(-reach..reach);
            let pass = stroke_segment(surface, segment.offset(dx, dy), color, &style);
            dirty = merge(dirty, pass);
        }
        dirty
    }

    fn render_watercolor(
        &mut self,
        surface: &mut Surface,
        segment: Segment,
        color: Rgb,
        size: f32,
    ) -> Option<DirtyRect> {
        let mut dirty = None;
        for _ in 0..WATERCOLOR_PASSES {
            let width = size * (1.0 + self.rng.gen::<f32>());
            let style = StrokeStyle::solid(width).with_alpha(WATERCOLOR_ALPHA);
            dirty = merge(dirty, stroke_segment(surface, segment, color, &style));
        }
        dirty
    }
}

fn render_pencil(
    surface: &mut Surface,
    segment: Segment,
    color: Rgb,
    size: f32,
) -> Option<DirtyRect> {
    let style = StrokeStyle::solid(size * PENCIL_WIDTH_SCALE)
        .with_alpha(PENCIL_ALPHA)
        .with_cap(LineCap::Round)
        .with_dash(PENCIL_DASH);
    stroke_segment(surface, segment, color, &style)
}

fn render_plain(
    surface: &mut Surface,
    segment: Segment,
    color: Rgb,
    size: f32,
) -> Option<DirtyRect> {
    let style = StrokeStyle::solid(size).with_cap(LineCap::Round);
    stroke_segment(surface, segment, color, &style)
}

/// The base stroke uses the paint color (background while erasing); the
/// blend always mixes in the selected brush color.
fn render_oil(
    surface: &mut Surface,
    segment: Segment,
    paint: Rgb,
    brush_color: Rgb,
    size: f32,
) -> Option<DirtyRect> {
    let base = stroke_segment(
        surface,
        segment,
        paint,
        &StrokeStyle::solid(size * OIL_WIDTH_SCALE),
    );
    let blended = blend_oil(surface, segment, brush_color);
    merge(base, blended)
}

/// Mixes the paint into the pixels around evenly spaced samples along the
/// segment: every channel becomes `(old + paint) / 2`, truncated. Alpha is
/// left alone and pixels off the surface are skipped.
pub fn blend_oil(surface: &mut Surface, segment: Segment, color: Rgb) -> Option<DirtyRect> {
    let (width, height) = surface.size();
    let paint = color.to_array();
    let pixels = surface.pixels_mut();
    let mut dirty: Option<DirtyRect> = None;

    for step in 0..=OIL_BLEND_STEPS {
        let t = step as f32 / OIL_BLEND_STEPS as f32;
        let sample = segment.start.lerp(segment.end, t);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let x = (sample.x + dx as f32).floor() as i64;
                let y = (sample.y + dy as f32).floor() as i64;
                if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                    continue;
                }
                let idx = ((y as usize * width as usize) + x as usize) * 4;
                for (channel, paint) in pixels[idx..idx + 3].iter_mut().zip(paint) {
                    *channel = ((*channel as u16 + paint as u16) >> 1) as u8;
                }
                let touched = DirtyRect {
                    x: x as i32,
                    y: y as i32,
                    width: 1,
                    height: 1,
                };
                dirty = Some(dirty.map_or(touched, |rect| rect.union(touched)));
            }
        }
    }
    dirty
}

fn merge(a: Option<DirtyRect>, b: Option<DirtyRect>) -> Option<DirtyRect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Point;

    const WHITE_PX: [u8; 4] = [255, 255, 255, 255];

    fn brush(kind: BrushType, size: u32) -> BrushConfig {
        BrushConfig::new(kind, size, Rgb::new(200, 20, 40))
    }

    fn diagonal() -> Segment {
        Segment::new(Point::new(10.0, 10.0), Point::new(40.0, 30.0))
    }

    fn changed_pixels(surface: &Surface) -> usize {
        surface
            .pixels()
            .chunks_exact(4)
            .filter(|px| *px != WHITE_PX)
            .count()
    }

    #[test]
    fn every_brush_paints_a_segment() {
        for kind in BrushType::ALL {
            let mut surface = Surface::new(64, 48);
            let mut renderer = StrokeRenderer::with_seed(7);
            renderer.render(&mut surface, diagonal(), &brush(kind, 10));
            assert!(changed_pixels(&surface) > 0, "{} painted nothing", kind.as_label());
        }
    }

    #[test]
    fn zero_length_segment_touches_only_the_point_neighbourhood() {
        let point = Point::new(20.0, 20.0);
        let segment = Segment::new(point, point);
        for kind in BrushType::ALL {
            for size in [1, 50] {
                let mut surface = Surface::new(128, 128);
                let mut renderer = StrokeRenderer::with_seed(3);
                renderer.render(&mut surface, segment, &brush(kind, size));

                let reach = size as f32 * 1.5 + 2.0;
                for y in 0..surface.height() {
                    for x in 0..surface.width() {
                        let far = (x as f32 - point.x).abs() > reach
                            || (y as f32 - point.y).abs() > reach;
                        if far {
                            assert_eq!(surface.pixel(x, y), Some(WHITE_PX));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn extreme_sizes_do_not_panic_at_edges() {
        let corner = Segment::new(Point::new(-5.0, -5.0), Point::new(3.0, 2.0));
        for kind in BrushType::ALL {
            for size in [1, 50] {
                let mut surface = Surface::new(16, 16);
                StrokeRenderer::with_seed(1).render(&mut surface, corner, &brush(kind, size));
            }
        }
    }

    #[test]
    fn seeded_crayon_is_reproducible() {
        let mut a = Surface::new(64, 48);
        let mut b = Surface::new(64, 48);
        let config = brush(BrushType::Crayon, 12);
        StrokeRenderer::with_seed(42).render(&mut a, diagonal(), &config);
        StrokeRenderer::with_seed(42).render(&mut b, diagonal(), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn watercolor_passes_accumulate_lightly() {
        let mut surface = Surface::new(64, 48);
        let config = BrushConfig::new(BrushType::Watercolor, 10, Rgb::BLACK);
        StrokeRenderer::with_seed(9).render(&mut surface, diagonal(), &config);

        // Six passes at 10% alpha never reach full coverage.
        let darkest = surface
            .pixels()
            .chunks_exact(4)
            .map(|px| px[0])
            .min()
            .unwrap_or(255);
        assert!(darkest < 255);
        assert!(darkest >= 130, "darkest channel {darkest}");
    }

    #[test]
    fn pencil_is_translucent() {
        let mut surface = Surface::new(64, 48);
        let config = BrushConfig::new(BrushType::Pencil, 20, Rgb::BLACK);
        let segment = Segment::new(Point::new(5.0, 20.0), Point::new(50.0, 20.0));
        StrokeRenderer::new().render(&mut surface, segment, &config);

        assert!(changed_pixels(&surface) > 0);
        assert!(surface.pixels().chunks_exact(4).all(|px| px[0] >= 100));
    }

    #[test]
    fn erasing_paints_background_white() {
        let mut surface = Surface::new(32, 32);
        let segment = Segment::new(Point::new(4.0, 16.0), Point::new(28.0, 16.0));
        let ink = BrushConfig::new(BrushType::Default, 6, Rgb::BLACK);
        let mut renderer = StrokeRenderer::with_seed(5);
        renderer.render(&mut surface, segment, &ink);
        assert!(changed_pixels(&surface) > 0);

        renderer.render(&mut surface, segment, &ink.with_erasing(true));
        assert_eq!(changed_pixels(&surface), 0);
    }

    #[test]
    fn oil_blend_mixes_brush_color_while_erasing() {
        let mut surface = Surface::new(32, 32);
        let point = Point::new(16.0, 16.0);
        let eraser = BrushConfig::new(BrushType::Oil, 4, Rgb::BLACK).with_erasing(true);
        StrokeRenderer::with_seed(2).render(&mut surface, Segment::new(point, point), &eraser);

        // Six halvings towards black: 255 -> 127 -> 63 -> 31 -> 15 -> 7 -> 3.
        assert_eq!(surface.pixel(16, 16), Some([3, 3, 3, 255]));
        assert_eq!(surface.pixel(20, 16), Some(WHITE_PX));
    }

    #[test]
    fn oil_erasing_base_stroke_paints_background() {
        let mut surface = Surface::new(32, 32);
        let segment = Segment::new(Point::new(2.0, 10.0), Point::new(30.0, 10.0));
        let eraser = BrushConfig::new(BrushType::Oil, 6, Rgb::BLACK).with_erasing(true);
        StrokeRenderer::with_seed(2).render(&mut surface, segment, &eraser);

        // Rows covered by the base stroke but outside the 3x3 blend stay white.
        assert_eq!(surface.pixel(10, 13), Some(WHITE_PX));
        assert_ne!(surface.pixel(13, 10), Some(WHITE_PX));
    }

    #[test]
    fn oil_blend_is_deterministic() {
        let mut base = Surface::new(32, 32);
        StrokeRenderer::with_seed(11).render(
            &mut base,
            Segment::new(Point::new(0.0, 0.0), Point::new(31.0, 31.0)),
            &brush(BrushType::Watercolor, 8),
        );
        let segment = Segment::new(Point::new(4.5, 6.0), Point::new(20.0, 9.5));
        let color = Rgb::new(10, 200, 90);

        let mut first = base.clone();
        let mut second = base.clone();
        blend_oil(&mut first, segment, color);
        blend_oil(&mut second, segment, color);
        assert_eq!(first, second);
    }

    #[test]
    fn oil_blend_averages_with_truncation() {
        let mut surface = Surface::new(8, 8);
        let point = Point::new(4.0, 4.0);
        blend_oil(&mut surface, Segment::new(point, point), Rgb::new(0, 100, 255));

        // Zero-length: all six samples land on the same 3x3 block.
        let mut expected = [255u16, 255, 255];
        let paint = [0u16, 100, 255];
        for _ in 0..=OIL_BLEND_STEPS {
            for (channel, paint) in expected.iter_mut().zip(paint) {
                *channel = (*channel + paint) >> 1;
            }
        }
        let expected = [expected[0] as u8, expected[1] as u8, expected[2] as u8, 255];
        assert_eq!(surface.pixel(3, 3), Some(expected));
        assert_eq!(surface.pixel(5, 5), Some(expected));
        assert_eq!(surface.pixel(6, 4), Some(WHITE_PX));
    }

    #[test]
    fn oil_blend_skips_out_of_bounds_neighbours() {
        let mut surface = Surface::new(4, 4);
        let corner = Point::new(0.0, 0.0);
        let dirty = blend_oil(&mut surface, Segment::new(corner, corner), Rgb::BLACK)
            .expect("in-bounds neighbours blended");
        assert_eq!(
            dirty,
            DirtyRect {
                x: 0,
                y: 0,
                width: 2,
                height: 2
            }
        );
        assert_ne!(surface.pixel(0, 0), Some(WHITE_PX));
        assert_eq!(surface.pixel(3, 3), Some(WHITE_PX));
    }
}
