use anyhow::{bail, Context, Result};
use colorflow::draw::{settings_store, BrushType, DrawSession, FileStorage, FsDownloader};
use std::path::PathBuf;

const USAGE: &str = "usage: colorflow import <image> | colorflow export [dir] \
                     | colorflow brush <type> [size] [#rrggbb]";

fn main() -> Result<()> {
    let settings = settings_store::load().unwrap_or_else(|err| {
        eprintln!("failed to load settings, using defaults: {err:#}");
        Default::default()
    });
    colorflow::logging::init(settings.debug_logging, None);

    let storage_dir = resolve_storage_dir(&settings.storage_dir)?;
    let mut session = DrawSession::open(settings, FileStorage::new(storage_dir));

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("import") => {
            let Some(file) = args.next() else {
                bail!(USAGE);
            };
            let bytes = std::fs::read(&file).with_context(|| format!("read image {file}"))?;
            session.import_image(&bytes)?;
            tracing::info!(
                pages = session.pages().len(),
                history = session.history().undo_len(),
                "import finished"
            );
        }
        Some("export") => {
            let mut downloader = match args.next() {
                Some(dir) => FsDownloader::new(dir),
                None => FsDownloader::beside_executable()?,
            };
            let path = session.export_to(&mut downloader)?;
            println!("{}", path.display());
        }
        Some("brush") => {
            let Some(kind) = args.next() else {
                bail!(USAGE);
            };
            session.set_brush_type(BrushType::from_name(&kind));
            if let Some(size) = args.next() {
                let size = size
                    .parse::<u32>()
                    .with_context(|| format!("invalid brush size {size:?}"))?;
                session.set_brush_size(size);
            }
            if let Some(color) = args.next() {
                session.set_color(&color)?;
            }
            let path = settings_store::save(session.settings())?;
            tracing::info!(
                path = %path.display(),
                brush = ?session.brush(),
                "saved brush settings"
            );
        }
        _ => bail!(USAGE),
    }
    Ok(())
}

/// Relative storage folders live next to the executable.
fn resolve_storage_dir(dir: &str) -> Result<PathBuf> {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        return Ok(path);
    }
    let exe = std::env::current_exe().context("resolve current executable")?;
    let base = exe.parent().map(PathBuf::from).unwrap_or_default();
    Ok(base.join(path))
}
