use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use opencv::core::Point;
use opencv::core::Rect;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    Down,
    Move,
    Up,
}

#[derive(Copy, Clone, Debug)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: i32,
    pub y: i32,
}

/// Buffer between the highgui mouse callback (GUI thread) and the frame
/// loop. Events are drained once per frame in arrival order.
pub type MouseEventQueue = Arc<Mutex<VecDeque<MouseEvent>>>;

pub fn new_event_queue() -> MouseEventQueue {
    Arc::new(Mutex::new(VecDeque::new()))
}

/// Turns a mouse drag into a committed track window.
///
/// Idle until a button press anchors a drag; every event while dragging
/// recomputes the selection as the normalized rectangle spanning the
/// anchor and the cursor; releasing the button commits the selection as
/// the track window. A new drag supersedes a committed window, there is
/// no cancel gesture.
pub struct RegionSelector {
    drag_anchor: Option<Point>,
    selection: Option<Rect>,
    track_window: Option<Rect>,
}

impl RegionSelector {
    pub fn new() -> Self {
        Self {
            drag_anchor: None,
            selection: None,
            track_window: None,
        }
    }

    pub fn handle_mouse_event(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Down => self.drag_anchor = Some(Point::new(event.x, event.y)),
            MouseEventKind::Up => {
                self.drag_anchor = None;
                self.track_window = self.selection;
            }
            MouseEventKind::Move => {}
        }

        if let Some(anchor) = self.drag_anchor {
            let xmin = event.x.min(anchor.x);
            let ymin = event.y.min(anchor.y);
            let xmax = event.x.max(anchor.x);
            let ymax = event.y.max(anchor.y);
            self.selection = Some(Rect::new(xmin, ymin, xmax - xmin, ymax - ymin));
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    pub fn track_window(&self) -> Option<Rect> {
        self.track_window
    }

    /// Feedback from the tracking step: the window produced by frame N
    /// seeds frame N+1.
    pub fn set_track_window(&mut self, window: Rect) {
        self.track_window = Some(window);
    }

    pub fn reset(&mut self) {
        self.drag_anchor = None;
        self.selection = None;
        self.track_window = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: MouseEventKind, x: i32, y: i32) -> MouseEvent {
        MouseEvent { kind, x, y }
    }

    #[test]
    fn drag_commits_on_release() {
        let mut selector = RegionSelector::new();
        selector.handle_mouse_event(event(MouseEventKind::Down, 10, 10));
        selector.handle_mouse_event(event(MouseEventKind::Move, 50, 40));
        assert!(selector.is_dragging());
        selector.handle_mouse_event(event(MouseEventKind::Up, 50, 40));
        assert!(!selector.is_dragging());
        assert_eq!(selector.track_window(), Some(Rect::new(10, 10, 40, 30)));
    }

    #[test]
    fn reversed_drag_is_normalized() {
        let mut selector = RegionSelector::new();
        selector.handle_mouse_event(event(MouseEventKind::Down, 50, 40));
        selector.handle_mouse_event(event(MouseEventKind::Move, 10, 10));
        let selection = selector.selection().unwrap();
        assert_eq!(selection, Rect::new(10, 10, 40, 30));
        assert!(selection.width >= 0 && selection.height >= 0);
    }

    #[test]
    fn selection_follows_every_move() {
        let mut selector = RegionSelector::new();
        selector.handle_mouse_event(event(MouseEventKind::Down, 0, 0));
        selector.handle_mouse_event(event(MouseEventKind::Move, 10, 10));
        selector.handle_mouse_event(event(MouseEventKind::Move, 4, 8));
        assert_eq!(selector.selection(), Some(Rect::new(0, 0, 4, 8)));
    }

    #[test]
    fn move_without_drag_changes_nothing() {
        let mut selector = RegionSelector::new();
        selector.handle_mouse_event(event(MouseEventKind::Move, 30, 30));
        assert_eq!(selector.selection(), None);
        assert_eq!(selector.track_window(), None);
    }

    #[test]
    fn track_window_accessor_is_idempotent() {
        let mut selector = RegionSelector::new();
        selector.handle_mouse_event(event(MouseEventKind::Down, 1, 2));
        selector.handle_mouse_event(event(MouseEventKind::Move, 9, 12));
        selector.handle_mouse_event(event(MouseEventKind::Up, 9, 12));
        assert_eq!(selector.track_window(), selector.track_window());
    }

    #[test]
    fn new_drag_supersedes_committed_window() {
        let mut selector = RegionSelector::new();
        selector.handle_mouse_event(event(MouseEventKind::Down, 0, 0));
        selector.handle_mouse_event(event(MouseEventKind::Up, 10, 10));
        assert_eq!(selector.track_window(), Some(Rect::new(0, 0, 10, 10)));

        selector.handle_mouse_event(event(MouseEventKind::Down, 20, 20));
        selector.handle_mouse_event(event(MouseEventKind::Move, 25, 30));
        // committed window survives until the next release
        assert_eq!(selector.track_window(), Some(Rect::new(0, 0, 10, 10)));
        selector.handle_mouse_event(event(MouseEventKind::Up, 25, 30));
        assert_eq!(selector.track_window(), Some(Rect::new(20, 20, 5, 10)));
    }

    #[test]
    fn down_collapses_selection_to_anchor() {
        let mut selector = RegionSelector::new();
        selector.handle_mouse_event(event(MouseEventKind::Down, 7, 7));
        assert_eq!(selector.selection(), Some(Rect::new(7, 7, 0, 0)));
    }
}
