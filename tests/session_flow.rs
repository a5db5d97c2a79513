use colorflow::draw::brush::StrokeRenderer;
use colorflow::draw::history::DrawHistory;
use colorflow::draw::{
    DrawSession, DrawSettings, MemoryStorage, PngDataUrlCodec, Point, PointerEvent,
    PointerPosition, Snapshot, SnapshotCodec,
};
use image::{Rgba, RgbaImage};
use std::io::Cursor;

fn open_session() -> DrawSession<MemoryStorage> {
    let settings = DrawSettings {
        surface_width: 64,
        surface_height: 48,
        ..DrawSettings::default()
    };
    DrawSession::open_with(
        settings,
        MemoryStorage::new(),
        PngDataUrlCodec,
        StrokeRenderer::with_seed(42),
    )
}

fn mouse(x: f32, y: f32) -> PointerPosition {
    PointerPosition::Mouse(Point::new(x, y))
}

fn gradient_png() -> Vec<u8> {
    let source = RgbaImage::from_fn(16, 12, |x, y| Rgba([x as u8 * 15, y as u8 * 20, 90, 255]));
    let mut bytes = Vec::new();
    source
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}

fn surface_matches(session: &DrawSession<MemoryStorage>, snapshot: &Snapshot) -> bool {
    let decoded = session.codec().decode(snapshot).unwrap();
    decoded == session.surface().to_rgba_image()
}

#[test]
fn import_draw_undo_redo_scenario() {
    let mut session = open_session();
    assert!(session.pages().is_empty());

    session.import_image(&gradient_png()).unwrap();
    assert_eq!(session.pages().len(), 1);
    assert_eq!(session.history().undo_len(), 1);
    let after_import = session.history().current().cloned().unwrap();

    session.pointer(PointerEvent::Down(mouse(10.0, 10.0))).unwrap();
    session.pointer(PointerEvent::Move(mouse(20.0, 20.0))).unwrap();
    session.pointer(PointerEvent::Up).unwrap();
    assert_eq!(session.history().undo_len(), 2);
    assert_eq!(session.history().redo_len(), 0);
    let after_stroke = session.history().current().cloned().unwrap();
    assert_ne!(after_import, after_stroke);

    let undone = session.undo().unwrap();
    assert_eq!(undone.as_ref(), Some(&after_import));
    assert!(surface_matches(&session, &after_import));
    assert_eq!(session.history().redo_len(), 1);

    let redone = session.redo().unwrap();
    assert_eq!(redone.as_ref(), Some(&after_stroke));
    assert!(surface_matches(&session, &after_stroke));
}

#[test]
fn strokes_beyond_history_depth_keep_the_latest_twenty() {
    let mut session = open_session();
    for i in 0..25 {
        let y = 2.0 + i as f32 * 1.5;
        session.pointer(PointerEvent::Down(mouse(2.0, y))).unwrap();
        session.pointer(PointerEvent::Move(mouse(60.0, y))).unwrap();
        session.pointer(PointerEvent::Up).unwrap();
    }
    assert_eq!(session.history().undo_len(), 20);

    let mut undos = 0;
    while session.undo().unwrap().is_some() {
        undos += 1;
    }
    assert_eq!(undos, 19);
}

#[test]
fn push_then_redo_returns_none() {
    let mut history = DrawHistory::default();
    for i in 0..5 {
        history.push(i);
    }
    history.undo();
    history.undo();
    history.push(99);
    assert_eq!(history.redo(), None);
}

#[test]
fn overflowing_pushes_keep_most_recent_in_order() {
    let mut history = DrawHistory::default();
    for i in 0..27 {
        history.push(i);
    }
    let kept: Vec<i32> = history.undo_entries().copied().collect();
    assert_eq!(kept, (7..27).collect::<Vec<_>>());
}

#[test]
fn undo_then_redo_restores_previous_top() {
    let mut history = DrawHistory::default();
    history.push("a");
    history.push("b");
    history.push("c");
    assert_eq!(history.undo(), Some("b"));
    assert_eq!(history.redo(), Some("c"));
    assert_eq!(history.current(), Some(&"c"));
}

#[test]
fn releasing_without_drawing_still_commits() {
    let mut session = open_session();
    session.pointer(PointerEvent::Down(mouse(5.0, 5.0))).unwrap();
    session.pointer(PointerEvent::Leave).unwrap();
    session.pointer(PointerEvent::Leave).unwrap();
    assert_eq!(session.history().undo_len(), 1);
}
