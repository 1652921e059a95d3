use std::time::Instant;

use log::debug;
use opencv::core;
use opencv::core::Mat;
use opencv::core::Rect;
use opencv::core::Size;
use opencv::core::Vector;
use opencv::imgproc;
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;

/// Cascade tuning for real video: faster than the accurate-but-slow
/// defaults (scale factor 2, 3 neighbors).
pub struct DetectParams {
    pub downscale: f64,
    pub scale_factor: f64,
    pub min_neighbors: i32,
    pub flags: i32,
    pub min_size: Size,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            downscale: 2.0,
            scale_factor: 1.2,
            min_neighbors: 2,
            flags: 0,
            min_size: Size::new(20, 20),
        }
    }
}

/// Lets an expensive step run only every Nth call.
pub struct RefreshGate {
    every: u32,
    calls: u32,
}

impl RefreshGate {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            calls: 0,
        }
    }

    pub fn due(&mut self) -> bool {
        let due = self.calls == 0;
        self.calls = (self.calls + 1) % self.every;
        due
    }
}

pub struct FaceDetector {
    cascade: CascadeClassifier,
    params: DetectParams,
    gate: RefreshGate,
    cache: Vec<Rect>,
}

impl FaceDetector {
    pub fn from_file(path: &str, refresh_every: u32) -> opencv::Result<Self> {
        let cascade = CascadeClassifier::new(path)?;
        if cascade.empty()? {
            return Err(opencv::Error::new(
                core::StsObjectNotFound,
                format!("cascade {path} could not be loaded"),
            ));
        }
        Ok(Self {
            cascade,
            params: DetectParams::default(),
            gate: RefreshGate::new(refresh_every),
            cache: vec![],
        })
    }

    /// Face rectangles in frame coordinates. The cascade only runs when
    /// the gate is due; in between the previous result is reused.
    pub fn detect(&mut self, frame: &Mat) -> opencv::Result<Vec<Rect>> {
        if self.gate.due() {
            let started = Instant::now();
            self.cache = self.run_cascade(frame)?;
            debug!(
                "face detection took {:.1}ms",
                started.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(self.cache.clone())
    }

    fn run_cascade(&mut self, frame: &Mat) -> opencv::Result<Vec<Rect>> {
        let downscale = self.params.downscale;

        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

        let small_size = Size::new(
            (frame.cols() as f64 / downscale).round() as i32,
            (frame.rows() as f64 / downscale).round() as i32,
        );
        let mut small = Mat::default();
        imgproc::resize(&gray, &mut small, small_size, 0.0, 0.0, imgproc::INTER_LINEAR)?;

        let mut equalized = Mat::default();
        imgproc::equalize_hist(&small, &mut equalized)?;

        let mut faces = Vector::<Rect>::new();
        self.cascade.detect_multi_scale(
            &equalized,
            &mut faces,
            self.params.scale_factor,
            self.params.min_neighbors,
            self.params.flags,
            self.params.min_size,
            Size::new(0, 0),
        )?;

        // the cascade saw the downscaled image
        Ok(faces
            .iter()
            .map(|face| {
                Rect::new(
                    (face.x as f64 * downscale) as i32,
                    (face.y as f64 * downscale) as i32,
                    (face.width as f64 * downscale) as i32,
                    (face.height as f64 * downscale) as i32,
                )
            })
            .collect())
    }
}
