use crate::draw::model::{Point, Segment};
use anyhow::Result;

/// Receives the output of [`InputTracker`]: a stroke opens, its segments
/// arrive in order, and the stroke closes with a save point.
pub trait StrokeSink {
    fn begin_stroke(&mut self) {}
    fn segment(&mut self, segment: Segment);
    fn save_point(&mut self) -> Result<()>;
}

/// Maps client (viewport) coordinates onto surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTransform {
    /// Top-left corner of the surface in document coordinates.
    pub origin: Point,
    /// Current document scroll offset.
    pub scroll: Point,
    /// Surface pixels per layout pixel on each axis.
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for SurfaceTransform {
    fn default() -> Self {
        Self {
            origin: Point::default(),
            scroll: Point::default(),
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl SurfaceTransform {
    pub fn at(origin: Point) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// Derives the scale from the surface's layout size and its raster size.
    pub fn fitted(origin: Point, layout_size: (f32, f32), raster_size: (u32, u32)) -> Self {
        let scale = |layout: f32, raster: u32| {
            if layout > f32::EPSILON {
                raster as f32 / layout
            } else {
                1.0
            }
        };
        Self {
            origin,
            scroll: Point::default(),
            scale_x: scale(layout_size.0, raster_size.0),
            scale_y: scale(layout_size.1, raster_size.1),
        }
    }

    pub fn with_scroll(mut self, scroll: Point) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn to_surface(&self, client: Point) -> Point {
        Point::new(
            (client.x + self.scroll.x - self.origin.x) * self.scale_x,
            (client.y + self.scroll.y - self.origin.y) * self.scale_y,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerPosition {
    Mouse(Point),
    /// Active touches in client coordinates; the first one drives the stroke.
    Touch(Vec<Point>),
}

impl PointerPosition {
    fn primary(&self) -> Option<Point> {
        match self {
            PointerPosition::Mouse(point) => Some(*point),
            PointerPosition::Touch(touches) => touches.first().copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down(PointerPosition),
    Move(PointerPosition),
    Up,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerState {
    Idle,
    Dragging { last: Option<Point> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputTracker {
    state: TrackerState,
    transform: SurfaceTransform,
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new(SurfaceTransform::default())
    }
}

impl InputTracker {
    pub fn new(transform: SurfaceTransform) -> Self {
        Self {
            state: TrackerState::Idle,
            transform,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, TrackerState::Dragging { .. })
    }

    pub fn transform(&self) -> SurfaceTransform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: SurfaceTransform) {
        self.transform = transform;
    }

    pub fn handle_event<K: StrokeSink + ?Sized>(
        &mut self,
        event: PointerEvent,
        sink: &mut K,
    ) -> Result<()> {
        match event {
            PointerEvent::Down(position) => {
                self.handle_down(&position, sink);
                Ok(())
            }
            PointerEvent::Move(position) => {
                self.handle_move(&position, sink);
                Ok(())
            }
            PointerEvent::Up | PointerEvent::Leave => self.handle_up(sink),
        }
    }

    pub fn handle_down<K: StrokeSink + ?Sized>(
        &mut self,
        position: &PointerPosition,
        sink: &mut K,
    ) {
        let last = position
            .primary()
            .map(|client| self.transform.to_surface(client));
        self.state = TrackerState::Dragging { last };
        sink.begin_stroke();
    }

    pub fn handle_move<K: StrokeSink + ?Sized>(
        &mut self,
        position: &PointerPosition,
        sink: &mut K,
    ) {
        let TrackerState::Dragging { last } = &mut self.state else {
            return;
        };
        let Some(current) = position
            .primary()
            .map(|client| self.transform.to_surface(client))
        else {
            return;
        };
        if let Some(previous) = last {
            sink.segment(Segment::new(*previous, current));
            *last = Some(current);
        }
    }

    /// Ends the stroke. Releasing or leaving while idle does nothing.
    pub fn handle_up<K: StrokeSink + ?Sized>(&mut self, sink: &mut K) -> Result<()> {
        if !self.is_dragging() {
            return Ok(());
        }
        self.state = TrackerState::Idle;
        sink.save_point()
    }
}
