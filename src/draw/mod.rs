pub mod brush;
pub mod export;
pub mod history;
pub mod input;
pub mod model;
pub mod pages;
pub mod redraw;
pub mod render;
pub mod session;
pub mod settings;
pub mod settings_store;
pub mod snapshot;
pub mod surface;

pub use brush::StrokeRenderer;
pub use export::{FileDownloader, FsDownloader};
pub use history::DrawHistory;
pub use input::{InputTracker, PointerEvent, PointerPosition, StrokeSink, SurfaceTransform};
pub use model::{BrushConfig, BrushType, Point, Rgb, Segment};
pub use pages::{FileStorage, MemoryStorage, Page, PageStore, Storage};
pub use session::DrawSession;
pub use settings::DrawSettings;
pub use snapshot::{PngDataUrlCodec, Snapshot, SnapshotCodec};
pub use surface::Surface;
