use opencv::core;
use opencv::core::Mat;
use opencv::core::Rect;
use opencv::core::RotatedRect;
use opencv::core::TermCriteria;
use opencv::imgproc;
use opencv::video;

use crate::target::HueHistogram;

const MAX_ITERATIONS: i32 = 10;
const EPSILON: f64 = 1.0;

/// Hue channel of a BGR frame.
pub fn hue_plane(frame: &Mat) -> opencv::Result<Mat> {
    let mut hsv = Mat::default();
    imgproc::cvt_color(frame, &mut hsv, imgproc::COLOR_BGR2HSV, 0)?;
    let mut hue = Mat::default();
    core::extract_channel(&hsv, &mut hue, 0)?;
    Ok(hue)
}

/// One CamShift step: back-project the signature and let the mean-shift
/// search re-locate it around the previous window. The window is mutated
/// in place, the output of frame N seeds frame N+1. Callers must skip the
/// call while the window is zero-area and treat a collapsed result as a
/// lost target.
pub fn advance(
    hist: &HueHistogram,
    hue: &Mat,
    window: &mut Rect,
) -> opencv::Result<RotatedRect> {
    let backproject = hist.back_project(hue)?;
    let criteria = TermCriteria::new(
        core::TermCriteria_EPS | core::TermCriteria_COUNT,
        MAX_ITERATIONS,
        EPSILON,
    )?;
    video::cam_shift(&backproject, window, criteria)
}
