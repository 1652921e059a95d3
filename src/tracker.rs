use log::debug;
use opencv::core::Mat;
use opencv::core::Rect;
use opencv::prelude::*;

use crate::camshift;
use crate::geometry;
use crate::overlay::BlendWeights;
use crate::overlay::OverlaySprite;
use crate::selection::MouseEvent;
use crate::selection::RegionSelector;
use crate::target::HueHistogram;
use crate::ui;

/// Frame-by-frame tracking state. While the user drags, the color
/// signature is rebuilt from the selection; afterwards every frame
/// re-locates the signature and pastes the sprite on top. Dragging and
/// tracking never act in the same frame.
pub struct ObjectTracker {
    selector: RegionSelector,
    histogram: HueHistogram,
    sprite: OverlaySprite,
    weights: BlendWeights,
}

impl ObjectTracker {
    pub fn new(sprite: OverlaySprite, weights: BlendWeights) -> opencv::Result<Self> {
        Ok(Self {
            selector: RegionSelector::new(),
            histogram: HueHistogram::new()?,
            sprite,
            weights,
        })
    }

    pub fn handle_mouse_event(&mut self, event: MouseEvent) {
        self.selector.handle_mouse_event(event);
    }

    pub fn track_window(&self) -> Option<Rect> {
        self.selector.track_window()
    }

    pub fn track_object(&mut self, frame: &mut Mat) -> opencv::Result<()> {
        let hue = camshift::hue_plane(frame)?;
        let frame_size = frame.size()?;

        if self.selector.is_dragging() {
            let selection = self
                .selector
                .selection()
                .map(|rect| geometry::clip_rect(rect, frame_size))
                .filter(|rect| geometry::rect_is_nonzero(*rect));
            if let Some(selection) = selection {
                ui::highlight_selection(frame, selection)?;
                self.histogram.rebuild_from(&hue, selection)?;
            }
            return Ok(());
        }

        // a drag past the window edge can commit an overhanging window
        let Some(mut window) = self
            .selector
            .track_window()
            .map(|rect| geometry::clip_rect(rect, frame_size))
            .filter(|rect| geometry::rect_is_nonzero(*rect))
        else {
            return Ok(());
        };

        let track_box = camshift::advance(&self.histogram, &hue, &mut window)?;
        self.selector.set_track_window(window);

        if !geometry::rect_is_nonzero(window) {
            debug!("track window collapsed, waiting for a new selection");
        } else if geometry::rect_within(window, frame_size) {
            self.sprite.composite(frame, &track_box, self.weights)?;
        }
        Ok(())
    }

    /// Recovery for transient per-frame failures.
    pub fn reset(&mut self) -> opencv::Result<()> {
        self.selector.reset();
        self.histogram.zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::MouseEventKind;
    use image::Rgba;
    use image::RgbaImage;
    use opencv::core;
    use opencv::core::Scalar;
    use opencv::core::Vec3b;

    fn test_tracker() -> ObjectTracker {
        let sprite = OverlaySprite::new(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));
        ObjectTracker::new(sprite, BlendWeights::OVERWRITE).unwrap()
    }

    fn event(kind: MouseEventKind, x: i32, y: i32) -> MouseEvent {
        MouseEvent { kind, x, y }
    }

    /// Gray frame with a green patch at (10,10)..(20,20).
    fn frame_with_patch() -> Mat {
        let frame =
            Mat::new_rows_cols_with_default(40, 40, core::CV_8UC3, Scalar::all(128.0)).unwrap();
        let mut patch = Mat::roi(&frame, Rect::new(10, 10, 10, 10)).unwrap();
        patch
            .set_to(&Scalar::new(0.0, 255.0, 0.0, 0.0), &core::no_array())
            .unwrap();
        frame
    }

    #[test]
    fn zero_area_window_skips_tracking() {
        let mut tracker = test_tracker();
        tracker.handle_mouse_event(event(MouseEventKind::Down, 5, 5));
        tracker.handle_mouse_event(event(MouseEventKind::Up, 5, 5));
        let mut frame = frame_with_patch();
        tracker.track_object(&mut frame).unwrap();
        assert_eq!(tracker.track_window(), Some(Rect::new(5, 5, 0, 0)));
    }

    #[test]
    fn dragging_suspends_tracking() {
        let mut tracker = test_tracker();
        tracker.handle_mouse_event(event(MouseEventKind::Down, 10, 10));
        tracker.handle_mouse_event(event(MouseEventKind::Move, 20, 20));
        let mut frame = frame_with_patch();
        tracker.track_object(&mut frame).unwrap();
        assert_eq!(tracker.track_window(), None);
    }

    #[test]
    fn dragging_dims_the_frame_outside_the_selection() {
        let mut tracker = test_tracker();
        tracker.handle_mouse_event(event(MouseEventKind::Down, 10, 10));
        tracker.handle_mouse_event(event(MouseEventKind::Move, 20, 20));
        let mut frame = frame_with_patch();
        tracker.track_object(&mut frame).unwrap();
        assert_eq!(frame.at_2d::<Vec3b>(5, 5).unwrap().0, [64, 64, 64]);
        // inside the selection the frame keeps its brightness
        assert_eq!(frame.at_2d::<Vec3b>(15, 15).unwrap().0, [0, 255, 0]);
    }

    #[test]
    fn committed_selection_is_tracked_across_frames() {
        let mut tracker = test_tracker();
        tracker.handle_mouse_event(event(MouseEventKind::Down, 10, 10));
        tracker.handle_mouse_event(event(MouseEventKind::Move, 20, 20));

        // histogram is rebuilt while the drag is active
        let mut drag_frame = frame_with_patch();
        tracker.track_object(&mut drag_frame).unwrap();

        tracker.handle_mouse_event(event(MouseEventKind::Up, 20, 20));
        let mut frame = frame_with_patch();
        tracker.track_object(&mut frame).unwrap();

        let window = tracker.track_window().unwrap();
        assert!(geometry::rect_is_nonzero(window));
        // the search stays on the green patch
        let patch = Rect::new(10, 10, 10, 10);
        assert!(window.x < patch.x + patch.width && window.x + window.width > patch.x);
        assert!(window.y < patch.y + patch.height && window.y + window.height > patch.y);
    }

    #[test]
    fn reset_clears_the_committed_window() {
        let mut tracker = test_tracker();
        tracker.handle_mouse_event(event(MouseEventKind::Down, 10, 10));
        tracker.handle_mouse_event(event(MouseEventKind::Up, 20, 20));
        tracker.reset().unwrap();
        assert_eq!(tracker.track_window(), None);
    }
}
