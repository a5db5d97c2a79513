use crate::draw::model::{Point, Rgb, Segment};
use crate::draw::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    pub fn from_segment(segment: Segment, pad: f32) -> Self {
        let min_x = (segment.start.x.min(segment.end.x) - pad).floor() as i32;
        let max_x = (segment.start.x.max(segment.end.x) + pad).ceil() as i32;
        let min_y = (segment.start.y.min(segment.end.y) - pad).floor() as i32;
        let max_y = (segment.start.y.max(segment.end.y) + pad).ceil() as i32;
        Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1).max(1),
            height: (max_y - min_y + 1).max(1),
        }
    }

    pub fn union(self, other: DirtyRect) -> DirtyRect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        DirtyRect {
            x: min_x,
            y: min_y,
            width: (max_x - min_x).max(1),
            height: (max_y - min_y).max(1),
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        let max_w = width as i32;
        let max_h = height as i32;
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = (self.x + self.width).clamp(0, max_w);
        let y1 = (self.y + self.height).clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// Alternating on/off lengths along the stroke, starting with "on".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashPattern {
    pub on: f32,
    pub off: f32,
}

impl DashPattern {
    pub const fn new(on: f32, off: f32) -> Self {
        Self { on, off }
    }

    fn period(&self) -> f32 {
        self.on + self.off
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub alpha: f32,
    pub cap: LineCap,
    pub dash: Option<DashPattern>,
}

impl StrokeStyle {
    pub fn solid(width: f32) -> Self {
        Self {
            width,
            alpha: 1.0,
            cap: LineCap::Butt,
            dash: None,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_dash(mut self, dash: DashPattern) -> Self {
        self.dash = Some(dash);
        self
    }
}

/// Strokes `segment` onto `surface`, blending `color` source-over at the
/// style's alpha. Each covered pixel is blended once per call.
pub fn stroke_segment(
    surface: &mut Surface,
    segment: Segment,
    color: Rgb,
    style: &StrokeStyle,
) -> Option<DirtyRect> {
    let half_width = style.width / 2.0;
    if half_width <= 0.0 || style.alpha <= 0.0 {
        return None;
    }
    if let Some(dash) = style.dash {
        if dash.on <= 0.0 || dash.period() <= 0.0 {
            return None;
        }
    }

    let (width, height) = surface.size();
    let dirty = DirtyRect::from_segment(segment, half_width + 1.0).clamp(width, height)?;
    let geometry = SegmentGeometry::new(segment);
    let pixels = surface.pixels_mut();
    let mut touched = false;

    for y in dirty.y..(dirty.y + dirty.height) {
        for x in dirty.x..(dirty.x + dirty.width) {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if !geometry.covers(center, half_width, style) {
                continue;
            }
            let idx = ((y as usize * width as usize) + x as usize) * 4;
            blend_pixel(&mut pixels[idx..idx + 4], color, style.alpha);
            touched = true;
        }
    }

    touched.then_some(dirty)
}

struct SegmentGeometry {
    start: Point,
    dir: (f32, f32),
    length: f32,
}

impl SegmentGeometry {
    fn new(segment: Segment) -> Self {
        let length = segment.length();
        let dir = if length > f32::EPSILON {
            (
                (segment.end.x - segment.start.x) / length,
                (segment.end.y - segment.start.y) / length,
            )
        } else {
            (0.0, 0.0)
        };
        Self {
            start: segment.start,
            dir,
            length,
        }
    }

    /// Distance along the segment and perpendicular distance from it.
    fn project(&self, point: Point) -> (f32, f32) {
        let wx = point.x - self.start.x;
        let wy = point.y - self.start.y;
        let along = wx * self.dir.0 + wy * self.dir.1;
        let across = (wx * self.dir.1 - wy * self.dir.0).abs();
        (along, across)
    }

    fn covers(&self, point: Point, half_width: f32, style: &StrokeStyle) -> bool {
        if self.length <= f32::EPSILON {
            // A zero-length butt stroke paints nothing; round caps leave a dot.
            if style.cap == LineCap::Butt {
                return false;
            }
            let dx = point.x - self.start.x;
            let dy = point.y - self.start.y;
            return dx * dx + dy * dy <= half_width * half_width;
        }

        let (along, across) = self.project(point);
        match (style.cap, style.dash) {
            (LineCap::Butt, None) => {
                (0.0..=self.length).contains(&along) && across <= half_width
            }
            (LineCap::Round, None) => {
                distance_to_span(along, across, 0.0, self.length) <= half_width
            }
            (LineCap::Butt, Some(dash)) => {
                if !(0.0..=self.length).contains(&along) || across > half_width {
                    return false;
                }
                along.rem_euclid(dash.period()) <= dash.on
            }
            (LineCap::Round, Some(dash)) => {
                let period = dash.period();
                let first = ((along - half_width) / period).floor() as i64;
                let last = ((along + half_width) / period).floor() as i64;
                (first..=last).any(|k| {
                    let span_start = (k as f32 * period).max(0.0);
                    let span_end = (k as f32 * period + dash.on).min(self.length);
                    span_start <= span_end
                        && distance_to_span(along, across, span_start, span_end) <= half_width
                })
            }
        }
    }
}

fn distance_to_span(along: f32, across: f32, span_start: f32, span_end: f32) -> f32 {
    let nearest = along.clamp(span_start, span_end);
    let dt = along - nearest;
    (dt * dt + across * across).sqrt()
}

pub(crate) fn blend_pixel(dst: &mut [u8], color: Rgb, alpha: f32) {
    let sa = alpha.clamp(0.0, 1.0);
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= f32::EPSILON {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }

    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    dst[0] = blend(color.r, dst[0]);
    dst[1] = blend(color.g, dst[1]);
    dst[2] = blend(color.b, dst[2]);
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}
