use crate::draw::export::EXPORT_FILE_NAME;
use crate::draw::history::DEFAULT_HISTORY_DEPTH;
use crate::draw::model::{clamp_brush_size, BrushConfig, BrushType, Rgb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawSettings {
    #[serde(default = "default_brush_type")]
    pub brush_type: BrushType,
    #[serde(default = "default_brush_size")]
    pub brush_size: u32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_surface_width")]
    pub surface_width: u32,
    #[serde(default = "default_surface_height")]
    pub surface_height: u32,
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_brush_type() -> BrushType {
    BrushType::Crayon
}

fn default_brush_size() -> u32 {
    10
}

fn default_color() -> String {
    "#000000".to_owned()
}

fn default_surface_width() -> u32 {
    800
}

fn default_surface_height() -> u32 {
    600
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

fn default_export_file_name() -> String {
    EXPORT_FILE_NAME.to_owned()
}

fn default_storage_dir() -> String {
    "colorflow_data".to_owned()
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            brush_type: default_brush_type(),
            brush_size: default_brush_size(),
            color: default_color(),
            surface_width: default_surface_width(),
            surface_height: default_surface_height(),
            history_depth: default_history_depth(),
            export_file_name: default_export_file_name(),
            storage_dir: default_storage_dir(),
            debug_logging: false,
        }
    }
}

impl DrawSettings {
    /// Pulls out-of-range values back to something drawable. Returns whether
    /// anything changed.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;

        let size = clamp_brush_size(self.brush_size);
        changed |= size != self.brush_size;
        self.brush_size = size;

        if Rgb::from_hex(&self.color).is_err() {
            self.color = default_color();
            changed = true;
        }

        if self.history_depth == 0 {
            self.history_depth = 1;
            changed = true;
        }

        if self.surface_width == 0 || self.surface_height == 0 {
            self.surface_width = self.surface_width.max(1);
            self.surface_height = self.surface_height.max(1);
            changed = true;
        }

        if self.export_file_name.trim().is_empty() {
            self.export_file_name = default_export_file_name();
            changed = true;
        }

        changed
    }

    pub fn brush_config(&self) -> BrushConfig {
        let color = Rgb::from_hex(&self.color).unwrap_or(Rgb::BLACK);
        BrushConfig::new(self.brush_type, self.brush_size, color)
    }
}
