use crate::draw::surface::Surface;
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Immutable encoded capture of a surface. History and pages only move
/// these around; a [`SnapshotCodec`] is the one thing that looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Arc<str>);

impl Snapshot {
    pub fn from_encoded(encoded: impl Into<Arc<str>>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub trait SnapshotCodec {
    fn encode(&self, surface: &Surface) -> Result<Snapshot>;
    fn decode(&self, snapshot: &Snapshot) -> Result<RgbaImage>;
}

/// Stores snapshots as `data:image/png;base64,...` strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngDataUrlCodec;

impl SnapshotCodec for PngDataUrlCodec {
    fn encode(&self, surface: &Surface) -> Result<Snapshot> {
        let png = encode_png(surface)?;
        let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len() * 4 / 3 + 4);
        url.push_str(PNG_DATA_URL_PREFIX);
        general_purpose::STANDARD.encode_string(&png, &mut url);
        Ok(Snapshot::from_encoded(url))
    }

    fn decode(&self, snapshot: &Snapshot) -> Result<RgbaImage> {
        let payload = snapshot
            .as_str()
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .ok_or_else(|| anyhow!("snapshot is not a PNG data URL"))?;
        let bytes = general_purpose::STANDARD
            .decode(payload)
            .context("decode snapshot base64 payload")?;
        decode_image(&bytes)
    }
}

pub fn encode_png(surface: &Surface) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    surface
        .to_rgba_image()
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .context("encode surface as PNG")?;
    Ok(bytes)
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    let decoded = image::load_from_memory(bytes).context("decode image data")?;
    Ok(decoded.to_rgba8())
}
