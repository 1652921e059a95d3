use log::info;
use opencv::core;
use opencv::core::Mat;
use opencv::imgcodecs;
use opencv::prelude::*;
use opencv::videoio;
use opencv::videoio::VideoCapture;

/// Lazy frame sequence: a live camera or a still image repeated forever.
pub enum FrameSource {
    Camera(VideoCapture),
    Still(Mat),
}

impl FrameSource {
    pub fn open_camera(index: i32) -> opencv::Result<Self> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(opencv::Error::new(
                core::StsError,
                format!("could not open camera {index}"),
            ));
        }
        info!("capturing from camera {index}");
        Ok(Self::Camera(capture))
    }

    pub fn open_still(path: &str) -> opencv::Result<Self> {
        let image = imgcodecs::imread(path, imgcodecs::IMREAD_COLOR)?;
        if image.empty() {
            return Err(opencv::Error::new(
                core::StsObjectNotFound,
                format!("could not read image {path}"),
            ));
        }
        info!("capturing from still image {path}");
        Ok(Self::Still(image))
    }

    /// `Ok(None)` once the camera stops delivering frames.
    pub fn next_frame(&mut self) -> opencv::Result<Option<Mat>> {
        match self {
            Self::Camera(capture) => {
                let mut frame = Mat::default();
                if !capture.read(&mut frame)? || frame.empty() {
                    return Ok(None);
                }
                // mirror, so the preview moves the way the user does
                let mut mirrored = Mat::default();
                core::flip(&frame, &mut mirrored, 1)?;
                Ok(Some(mirrored))
            }
            Self::Still(image) => Ok(Some(image.clone())),
        }
    }
}
