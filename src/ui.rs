use std::collections::VecDeque;
use std::time::Duration;

use log::debug;
use log::info;
use log::warn;
use opencv::core::Mat;
use opencv::core::Point;
use opencv::core::Rect;
use opencv::core::Scalar;
use opencv::core::Size;
use opencv::core::Vector;
use opencv::highgui;
use opencv::imgproc;
use opencv::prelude::*;
use rand::Rng;

use crate::selection::MouseEvent;
use crate::selection::MouseEventKind;
use crate::selection::MouseEventQueue;

const FONT_FACE: i32 = imgproc::FONT_HERSHEY_PLAIN;
const FONT_SCALE: f64 = 1.0;
const FONT_THICKNESS: i32 = 1;

pub fn create_window(window_name: &str) -> opencv::Result<()> {
    highgui::named_window(window_name, highgui::WINDOW_AUTOSIZE)
}

/// Forward highgui mouse events into the queue the frame loop drains.
pub fn install_mouse_handler(window_name: &str, queue: MouseEventQueue) -> opencv::Result<()> {
    highgui::set_mouse_callback(
        window_name,
        Some(Box::new(move |event, x, y, _flags| {
            let kind = match event {
                highgui::EVENT_LBUTTONDOWN => MouseEventKind::Down,
                highgui::EVENT_LBUTTONUP => MouseEventKind::Up,
                highgui::EVENT_MOUSEMOVE => MouseEventKind::Move,
                _ => return,
            };
            queue.lock().unwrap().push_back(MouseEvent { kind, x, y });
        })),
    )
}

/// Returns true once the user presses a key.
pub fn show_frame(window_name: &str, frame: &Mat) -> opencv::Result<bool> {
    highgui::imshow(window_name, frame)?;
    let key = highgui::wait_key(10)?;
    if key >= 0 {
        info!("stop requested by user");
        return Ok(true);
    }
    Ok(false)
}

pub fn draw_face_boxes(frame: &mut Mat, faces: &[Rect]) -> opencv::Result<()> {
    let dark_violet = Scalar::new(211.0, 0.0, 148.0, 0.0);
    for face in faces {
        imgproc::rectangle(frame, *face, dark_violet, 1, 8, 0)?;
    }
    Ok(())
}

/// Dim everything except the active selection and frame it in white.
pub fn highlight_selection(frame: &mut Mat, selection: Rect) -> opencv::Result<()> {
    let saved = Mat::roi(frame, selection)?.try_clone()?;
    let mut dimmed = Mat::default();
    frame.convert_to(&mut dimmed, -1, 0.5, 0.0)?;
    *frame = dimmed;
    let mut region = Mat::roi(frame, selection)?;
    saved.copy_to(&mut region)?;
    imgproc::rectangle(frame, selection, Scalar::all(255.0), 1, 8, 0)?;
    Ok(())
}

/// Write one text next to each face, balloon first, clamped into the
/// frame. The placement is nudged a little every frame so the balloons
/// wobble.
pub fn write_text(frame: &mut Mat, texts: &VecDeque<String>, faces: &[Rect]) -> opencv::Result<()> {
    let mut rng = rand::thread_rng();
    for (text, face) in texts.iter().zip(faces.iter()) {
        let mut baseline = 0;
        let text_size =
            imgproc::get_text_size(text, FONT_FACE, FONT_SCALE, FONT_THICKNESS, &mut baseline)?;
        let Size { width, height } = text_size;

        if width > frame.cols() || height > frame.rows() {
            warn!(
                "frame is smaller than the text: ({}, {}) x ({}, {})",
                frame.cols(),
                frame.rows(),
                width,
                height
            );
            break;
        }

        // bottom-left corner of the text
        let mut origin = Point::new(
            ((face.x - width) as f32 * rng.gen_range(0.95..1.05)) as i32,
            ((face.y - height) as f32 * rng.gen_range(0.95..1.05)) as i32,
        );

        if origin.x < 0 {
            debug!("moved text balloon to the right");
            origin.x = 0;
        }
        if origin.x + width > frame.cols() {
            debug!("moved text balloon to the left");
            origin.x = frame.cols() - width;
        }
        if origin.y - height < 0 {
            debug!("moved text balloon down");
            origin.y = height;
        }
        if origin.y > frame.rows() {
            debug!("moved text balloon up");
            origin.y = frame.rows() - baseline;
        }

        let center = Point::new(origin.x + width / 2, origin.y - height / 2);
        draw_balloon(frame, Rect::new(center.x, center.y, width, height), &mut rng)?;
        imgproc::put_text(
            frame,
            text,
            origin,
            FONT_FACE,
            FONT_SCALE,
            Scalar::all(0.0),
            FONT_THICKNESS,
            imgproc::LINE_AA,
            false,
        )?;
    }
    Ok(())
}

/// Balloon centered on the rect: a filled ellipse with a triangular tail.
fn draw_balloon(frame: &mut Mat, rect: Rect, rng: &mut impl Rng) -> opencv::Result<()> {
    let white = Scalar::all(255.0);
    let width = (rect.width as f32 * 1.4) as i32;
    let height = (rect.height as f32 * 4.2) as i32;
    let (x, y) = (rect.x, rect.y);

    let tail_tip_x = ((x + width / 3) as f32 * rng.gen_range(0.95..1.1)) as i32;
    let tail = Vector::from_iter([
        Point::new(x, y),
        Point::new(x + width / 3, y),
        Point::new(tail_tip_x, y + height),
    ]);
    imgproc::fill_convex_poly(frame, &tail, white, imgproc::LINE_AA, 0)?;

    let angle = rng.gen_range(0.0..2.0);
    imgproc::ellipse(
        frame,
        Point::new(x, y),
        Size::new(width / 2, height / 2),
        angle,
        0.0,
        360.0,
        white,
        -1,
        imgproc::LINE_AA,
        0,
    )?;
    Ok(())
}

/// Grouped fps average: samples collapse to their mean every
/// `group_size` frames and the mean seeds the next group.
pub struct FpsMeter {
    group_size: usize,
    samples: Vec<f64>,
}

impl FpsMeter {
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size: group_size.max(1),
            samples: vec![],
        }
    }

    /// Feed one frame duration; yields the average once per full group.
    pub fn tick(&mut self, elapsed: Duration) -> Option<f64> {
        let seconds = elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.samples.push(1.0 / seconds);
        }
        if self.samples.len() < self.group_size {
            return None;
        }
        let average = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        self.samples = vec![average];
        Some(average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_meter_reports_once_per_group() {
        let mut meter = FpsMeter::new(4);
        let frame_time = Duration::from_millis(100);
        assert_eq!(meter.tick(frame_time), None);
        assert_eq!(meter.tick(frame_time), None);
        assert_eq!(meter.tick(frame_time), None);
        let average = meter.tick(frame_time).unwrap();
        assert!((average - 10.0).abs() < 1e-9);
    }

    #[test]
    fn group_average_seeds_the_next_group() {
        let mut meter = FpsMeter::new(2);
        meter.tick(Duration::from_millis(100));
        assert!(meter.tick(Duration::from_millis(100)).is_some());
        // the buffer kept the previous average, one sample completes it
        let average = meter.tick(Duration::from_millis(50)).unwrap();
        assert!((average - 15.0).abs() < 1e-9);
    }

    #[test]
    fn zero_durations_are_ignored() {
        let mut meter = FpsMeter::new(2);
        assert_eq!(meter.tick(Duration::ZERO), None);
        assert_eq!(meter.tick(Duration::ZERO), None);
    }
}
