use log::debug;
use opencv::core;
use opencv::core::Mat;
use opencv::core::Rect;
use opencv::core::Vector;
use opencv::imgproc;
use opencv::prelude::*;

use crate::geometry;

pub const HUE_BINS: i32 = 180;

fn hue_range() -> Vector<f32> {
    Vector::from_slice(&[0f32, 180f32])
}

/// Color signature of the tracked object: a histogram over the hue
/// channel, rebuilt from scratch every time the user marks a region.
pub struct HueHistogram {
    bins: Mat,
}

impl HueHistogram {
    pub fn new() -> opencv::Result<Self> {
        Ok(Self {
            bins: Mat::zeros(HUE_BINS, 1, core::CV_32F)?.to_mat()?,
        })
    }

    pub fn zero(&mut self) -> opencv::Result<()> {
        self.bins = Mat::zeros(HUE_BINS, 1, core::CV_32F)?.to_mat()?;
        Ok(())
    }

    pub fn bins(&self) -> &Mat {
        &self.bins
    }

    /// Recompute the signature from the selected region of the hue plane.
    ///
    /// The rectangle is clipped to the plane first; a selection clipped to
    /// nothing leaves the bins all zero, which makes the back-projection
    /// zero everywhere until the next selection. The max bin is rescaled
    /// to 255 so a rare modal color still saturates the back-projection.
    pub fn rebuild_from(&mut self, hue_plane: &Mat, selection: Rect) -> opencv::Result<()> {
        let clipped = geometry::clip_rect(selection, hue_plane.size()?);
        if !geometry::rect_is_nonzero(clipped) {
            debug!("selection lies outside the frame, histogram cleared");
            return self.zero();
        }

        let roi = Mat::roi(hue_plane, clipped)?;
        let images: Vector<Mat> = Vector::from_iter([roi]);
        imgproc::calc_hist(
            &images,
            &Vector::from_slice(&[0]),
            &core::no_array(),
            &mut self.bins,
            &Vector::from_slice(&[HUE_BINS]),
            &hue_range(),
            false,
        )?;

        let mut max_val = 0f64;
        core::min_max_loc(
            &self.bins,
            None,
            Some(&mut max_val),
            None,
            None,
            &core::no_array(),
        )?;
        if max_val != 0.0 {
            let mut scaled = Mat::default();
            self.bins.convert_to(&mut scaled, -1, 255.0 / max_val, 0.0)?;
            self.bins = scaled;
        }
        Ok(())
    }

    /// Per-pixel match of the hue plane against the signature.
    pub fn back_project(&self, hue_plane: &Mat) -> opencv::Result<Mat> {
        let images: Vector<Mat> = Vector::from_iter([hue_plane.clone()]);
        let mut map = Mat::default();
        imgproc::calc_back_project(
            &images,
            &Vector::from_slice(&[0]),
            &self.bins,
            &mut map,
            &hue_range(),
            1.0,
        )?;
        Ok(map)
    }
}
