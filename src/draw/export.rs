use crate::draw::snapshot::{decode_image, encode_png};
use crate::draw::surface::Surface;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const EXPORT_FILE_NAME: &str = "colorflow-export.png";
pub const EXPORT_SUBDIR: &str = "colorflow_exports";

/// Hands finished files to the user (browser download, save dialog, ...).
pub trait FileDownloader {
    fn download(&mut self, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Writes downloads into a fixed folder, replacing files of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsDownloader {
    output_dir: PathBuf,
}

impl FsDownloader {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn beside_executable() -> Result<Self> {
        let exe_path = std::env::current_exe().context("resolve current executable")?;
        Ok(Self::new(exe_relative_output_folder_from_path(&exe_path)?))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl FileDownloader for FsDownloader {
    fn download(&mut self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| anyhow!("invalid download file name {file_name:?}"))?;
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("create export folder {}", self.output_dir.display()))?;
        let path = self.output_dir.join(name);
        fs::write(&path, bytes).with_context(|| format!("write export {}", path.display()))?;
        Ok(path)
    }
}

pub fn exe_relative_output_folder_from_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(EXPORT_SUBDIR))
}

pub fn export_png(surface: &Surface) -> Result<Vec<u8>> {
    encode_png(surface)
}

pub fn export_to<D: FileDownloader + ?Sized>(
    surface: &Surface,
    file_name: &str,
    downloader: &mut D,
) -> Result<PathBuf> {
    let bytes = export_png(surface)?;
    let path = downloader.download(file_name, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "exported surface");
    Ok(path)
}

/// Decodes `bytes` and draws the image fitted and centered. A decode
/// failure leaves the surface untouched.
pub fn import_image(surface: &mut Surface, bytes: &[u8]) -> Result<()> {
    let image = decode_image(bytes).context("import image")?;
    surface.draw_image_fitted(&image);
    Ok(())
}
