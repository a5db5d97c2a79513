use crate::draw::brush::StrokeRenderer;
use crate::draw::export::{self, FileDownloader};
use crate::draw::history::DrawHistory;
use crate::draw::input::{InputTracker, PointerEvent, StrokeSink, SurfaceTransform};
use crate::draw::model::{clamp_brush_size, BrushConfig, BrushType, Rgb, Segment};
use crate::draw::pages::{Page, PageStore, Storage};
use crate::draw::redraw::{PendingRedraw, RedrawOutcome, RedrawQueue};
use crate::draw::render::DirtyRect;
use crate::draw::settings::DrawSettings;
use crate::draw::snapshot::{PngDataUrlCodec, Snapshot, SnapshotCodec};
use crate::draw::surface::Surface;
use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::PathBuf;

/// One drawing view: pointer input in, painted surface plus undo history
/// and persisted pages out.
pub struct DrawSession<S, C = PngDataUrlCodec> {
    tracker: InputTracker,
    canvas: CanvasState<S, C>,
}

struct CanvasState<S, C> {
    surface: Surface,
    renderer: StrokeRenderer,
    brush: BrushConfig,
    stroke_brush: Option<BrushConfig>,
    dirty: Option<DirtyRect>,
    history: DrawHistory<Snapshot>,
    pages: PageStore<S>,
    codec: C,
    redraw: RedrawQueue,
    settings: DrawSettings,
}

impl<S: Storage> DrawSession<S> {
    pub fn open(settings: DrawSettings, storage: S) -> Self {
        Self::open_with(settings, storage, PngDataUrlCodec, StrokeRenderer::new())
    }
}

impl<S: Storage, C: SnapshotCodec> DrawSession<S, C> {
    /// Loads persisted pages and, when there are any, restores the first one
    /// as both the visible surface and the only history entry.
    pub fn open_with(
        mut settings: DrawSettings,
        storage: S,
        codec: C,
        renderer: StrokeRenderer,
    ) -> Self {
        if settings.sanitize() {
            tracing::warn!("draw settings were adjusted to valid ranges");
        }
        let surface = Surface::new(settings.surface_width, settings.surface_height);
        let mut canvas = CanvasState {
            surface,
            renderer,
            brush: settings.brush_config(),
            stroke_brush: None,
            dirty: None,
            history: DrawHistory::with_depth(settings.history_depth),
            pages: PageStore::load(storage),
            codec,
            redraw: RedrawQueue::new(),
            settings,
        };
        canvas.restore_current_page();
        Self {
            tracker: InputTracker::default(),
            canvas,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.canvas.surface
    }

    pub fn history(&self) -> &DrawHistory<Snapshot> {
        &self.canvas.history
    }

    pub fn pages(&self) -> &PageStore<S> {
        &self.canvas.pages
    }

    pub fn codec(&self) -> &C {
        &self.canvas.codec
    }

    pub fn settings(&self) -> &DrawSettings {
        &self.canvas.settings
    }

    pub fn brush(&self) -> BrushConfig {
        self.canvas.brush
    }

    pub fn tracker(&self) -> &InputTracker {
        &self.tracker
    }

    pub fn set_transform(&mut self, transform: SurfaceTransform) {
        self.tracker.set_transform(transform);
    }

    pub fn pointer(&mut self, event: PointerEvent) -> Result<()> {
        self.tracker.handle_event(event, &mut self.canvas)
    }

    /// Region painted since the last call, for partial repaints.
    pub fn take_dirty(&mut self) -> Option<DirtyRect> {
        self.canvas.dirty.take()
    }

    pub fn set_color(&mut self, hex: &str) -> Result<()> {
        self.canvas.brush.color = Rgb::from_hex(hex)?;
        self.canvas.settings.color = self.canvas.brush.color.to_hex();
        Ok(())
    }

    pub fn set_brush_size(&mut self, size: u32) {
        let size = clamp_brush_size(size);
        self.canvas.brush.size = size;
        self.canvas.settings.brush_size = size;
    }

    pub fn set_brush_type(&mut self, brush: BrushType) {
        self.canvas.brush.brush = brush;
        self.canvas.settings.brush_type = brush;
    }

    pub fn set_erasing(&mut self, erasing: bool) {
        self.canvas.brush.erasing = erasing;
    }

    pub fn toggle_erasing(&mut self) -> bool {
        self.canvas.brush.erasing = !self.canvas.brush.erasing;
        self.canvas.brush.erasing
    }

    /// Toolbar "Save": the same save point a finished stroke makes, so it
    /// also lands in history and drops any redo entries.
    pub fn save_current_page(&mut self) -> Result<()> {
        self.canvas.commit().context("save current page")?;
        tracing::info!(page = self.canvas.pages.current_index(), "saved current page");
        Ok(())
    }

    /// Steps back one save point. The target is decoded before history
    /// moves, so a decode failure leaves history and surface as they were.
    pub fn undo(&mut self) -> Result<Option<Snapshot>> {
        let Some(target) = self.canvas.history.peek_undo().cloned() else {
            tracing::debug!("nothing to undo");
            return Ok(None);
        };
        let (pending, decoded) = self
            .canvas
            .prepare_redraw(target)
            .context("redraw after undo")?;
        self.canvas.history.undo();
        self.canvas.apply_redraw(&pending, &decoded);
        tracing::debug!(
            undo = self.canvas.history.undo_len(),
            redo = self.canvas.history.redo_len(),
            "undo"
        );
        Ok(Some(pending.snapshot))
    }

    pub fn redo(&mut self) -> Result<Option<Snapshot>> {
        let Some(target) = self.canvas.history.peek_redo().cloned() else {
            tracing::debug!("nothing to redo");
            return Ok(None);
        };
        let (pending, decoded) = self
            .canvas
            .prepare_redraw(target)
            .context("redraw after redo")?;
        self.canvas.history.redo();
        self.canvas.apply_redraw(&pending, &decoded);
        tracing::debug!(
            undo = self.canvas.history.undo_len(),
            redo = self.canvas.history.redo_len(),
            "redo"
        );
        Ok(Some(pending.snapshot))
    }

    /// Draws an encoded image fitted onto the surface and commits it like a
    /// finished stroke. Undecodable input or a failed save point changes
    /// nothing.
    pub fn import_image(&mut self, bytes: &[u8]) -> Result<()> {
        let before = self.canvas.surface.clone();
        export::import_image(&mut self.canvas.surface, bytes)?;
        if let Err(err) = self.canvas.commit() {
            self.canvas.surface = before;
            return Err(err.context("commit imported image"));
        }
        self.canvas.redraw.supersede();
        self.canvas.dirty = None;
        tracing::info!(bytes = bytes.len(), "imported image");
        Ok(())
    }

    pub fn export_png(&self) -> Result<Vec<u8>> {
        export::export_png(&self.canvas.surface)
    }

    pub fn export_to<D: FileDownloader + ?Sized>(&self, downloader: &mut D) -> Result<PathBuf> {
        export::export_to(
            &self.canvas.surface,
            &self.canvas.settings.export_file_name,
            downloader,
        )
    }

    /// Resizes the surface. Existing content is dropped; history keeps its
    /// snapshots and a later undo or redo draws them fitted.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.surface.resize(width, height);
        self.canvas.redraw.supersede();
        self.canvas.dirty = None;
        tracing::debug!(width, height, "surface resized");
    }

    /// Starts a blank page after the existing ones and makes it current.
    pub fn add_page(&mut self, name: Option<String>) -> Result<usize> {
        self.canvas.surface.clear();
        self.canvas.redraw.supersede();
        let snapshot = self.canvas.codec.encode(&self.canvas.surface)?;
        let index = self
            .canvas
            .pages
            .add_page(name, snapshot.clone())
            .context("add page")?;
        self.canvas.history = DrawHistory::seeded(snapshot, self.canvas.settings.history_depth);
        tracing::info!(index, "added page");
        Ok(index)
    }

    /// Makes page `index` current, drawing it and restarting history from
    /// it. Returns `false` when no such page exists.
    pub fn select_page(&mut self, index: usize) -> bool {
        if self.canvas.pages.select_page(index).is_none() {
            return false;
        }
        self.canvas.restore_current_page();
        true
    }

    pub fn rename_page(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.canvas.pages.rename_page(index, name)
    }

    /// Removing the current page brings up whichever page takes its place.
    pub fn remove_page(&mut self, index: usize) -> Result<Page> {
        let was_current = index == self.canvas.pages.current_index();
        let removed = self.canvas.pages.remove_page(index)?;
        if was_current {
            self.canvas.restore_current_page();
        }
        tracing::info!(index, name = %removed.name, "removed page");
        Ok(removed)
    }
}

impl<S: Storage, C: SnapshotCodec> CanvasState<S, C> {
    /// Save point: snapshot the surface into the current page and history.
    /// Pages are persisted first; history only grows once that succeeded.
    fn commit(&mut self) -> Result<()> {
        let snapshot = self.codec.encode(&self.surface)?;
        if let Err(err) = self.pages.set_current_page(snapshot.clone()) {
            tracing::warn!(?err, "failed to persist pages at save point");
            return Err(err);
        }
        self.history.push(snapshot);
        tracing::debug!(
            history = self.history.undo_len(),
            page = self.pages.current_index(),
            "save point committed"
        );
        Ok(())
    }

    fn prepare_redraw(&mut self, snapshot: Snapshot) -> Result<(PendingRedraw, RgbaImage)> {
        let pending = self.redraw.request(snapshot);
        let decoded = self.codec.decode(&pending.snapshot)?;
        Ok((pending, decoded))
    }

    fn apply_redraw(&mut self, pending: &PendingRedraw, decoded: &RgbaImage) -> RedrawOutcome {
        self.dirty = None;
        self.redraw.complete(pending.ticket, decoded, &mut self.surface)
    }

    /// Shows the current page (or a blank surface when there is none) and
    /// reseeds history with it.
    fn restore_current_page(&mut self) {
        let depth = self.settings.history_depth;
        let Some(snapshot) = self.pages.current_page().map(|page| page.snapshot.clone()) else {
            self.surface.clear();
            self.redraw.supersede();
            self.history = DrawHistory::with_depth(depth);
            return;
        };
        match self.prepare_redraw(snapshot.clone()) {
            Ok((pending, decoded)) => {
                self.apply_redraw(&pending, &decoded);
                tracing::debug!(page = self.pages.current_index(), "restored page");
                self.history = DrawHistory::seeded(snapshot, depth);
            }
            Err(err) => {
                tracing::warn!(?err, page = self.pages.current_index(), "could not restore page");
                self.surface.clear();
                self.history = DrawHistory::with_depth(depth);
            }
        }
    }
}

impl<S: Storage, C: SnapshotCodec> StrokeSink for CanvasState<S, C> {
    fn begin_stroke(&mut self) {
        self.stroke_brush = Some(self.brush);
        self.redraw.supersede();
    }

    fn segment(&mut self, segment: Segment) {
        let brush = self.stroke_brush.unwrap_or(self.brush);
        if let Some(rect) = self.renderer.render(&mut self.surface, segment, &brush) {
            self.dirty = Some(match self.dirty {
                Some(dirty) => dirty.union(rect),
                None => rect,
            });
        }
    }

    fn save_point(&mut self) -> Result<()> {
        self.stroke_brush = None;
        self.commit()
    }
}
