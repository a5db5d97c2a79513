use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`.
    pub fn lerp(self, other: Point, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.start.offset(dx, dy), self.end.offset(dx, dy))
    }

    pub fn length(&self) -> f32 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses the `#rrggbb` strings produced by the color picker.
    pub fn from_hex(value: &str) -> Result<Self> {
        let digits = value.trim().strip_prefix('#').unwrap_or(value.trim());
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(anyhow!("expected #rrggbb color, got {value:?}"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|err| anyhow!("invalid color {value:?}: {err}"))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrushType {
    #[default]
    Crayon,
    Watercolor,
    Pencil,
    Oil,
    #[serde(other)]
    Default,
}

impl BrushType {
    pub const ALL: [BrushType; 5] = [
        BrushType::Crayon,
        BrushType::Watercolor,
        BrushType::Pencil,
        BrushType::Oil,
        BrushType::Default,
    ];

    /// Selector values map onto brushes; anything unrecognised paints with
    /// the plain round brush.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "crayon" => BrushType::Crayon,
            "watercolor" => BrushType::Watercolor,
            "pencil" => BrushType::Pencil,
            "oil" => BrushType::Oil,
            _ => BrushType::Default,
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            BrushType::Crayon => "crayon",
            BrushType::Watercolor => "watercolor",
            BrushType::Pencil => "pencil",
            BrushType::Oil => "oil",
            BrushType::Default => "default",
        }
    }
}

pub fn clamp_brush_size(size: u32) -> u32 {
    size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushConfig {
    pub brush: BrushType,
    pub size: u32,
    pub color: Rgb,
    pub erasing: bool,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            brush: BrushType::Crayon,
            size: 10,
            color: Rgb::BLACK,
            erasing: false,
        }
    }
}

impl BrushConfig {
    pub fn new(brush: BrushType, size: u32, color: Rgb) -> Self {
        Self {
            brush,
            size: clamp_brush_size(size),
            color,
            erasing: false,
        }
    }

    pub fn with_erasing(mut self, erasing: bool) -> Self {
        self.erasing = erasing;
        self
    }

    /// Erasing paints with the background instead of clearing alpha.
    pub fn paint_color(&self, background: Rgb) -> Rgb {
        if self.erasing {
            background
        } else {
            self.color
        }
    }

    pub fn size_f32(&self) -> f32 {
        clamp_brush_size(self.size) as f32
    }
}
