use image::imageops;
use image::imageops::FilterType;
use image::RgbaImage;
use opencv::core::Mat;
use opencv::core::RotatedRect;
use opencv::core::Vec3b;
use opencv::prelude::*;

/// Per-channel contributions of the frame and the sprite inside the
/// sprite's alpha mask. `OVERWRITE` reproduces a plain paste; other
/// weights give translucent blends.
#[derive(Copy, Clone, Debug)]
pub struct BlendWeights {
    pub frame: [f32; 4],
    pub sprite: [f32; 4],
}

impl BlendWeights {
    pub const OVERWRITE: BlendWeights = BlendWeights {
        frame: [0.0; 4],
        sprite: [1.0; 4],
    };

    pub fn translucent(opacity: f32) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        Self {
            frame: [1.0 - opacity; 4],
            sprite: [opacity; 4],
        }
    }
}

/// alpha fades between the untouched frame pixel and the weighted mix.
fn blend_channel(frame: u8, sprite: u8, alpha: f32, frame_weight: f32, sprite_weight: f32) -> u8 {
    let frame = frame as f32;
    let mixed = frame_weight * frame + sprite_weight * sprite as f32;
    ((1.0 - alpha) * frame + alpha * mixed).round().clamp(0.0, 255.0) as u8
}

/// Sprite pasted over the tracked object, loaded once and rescaled every
/// frame to the tracked box.
pub struct OverlaySprite {
    image: RgbaImage,
    aspect_ratio: f32,
}

impl OverlaySprite {
    pub fn load(path: &str) -> Result<Self, image::ImageError> {
        Ok(Self::new(image::open(path)?.to_rgba8()))
    }

    pub fn new(image: RgbaImage) -> Self {
        let aspect_ratio = image.width() as f32 / image.height() as f32;
        Self {
            image,
            aspect_ratio,
        }
    }

    /// Blend the sprite over `frame`, scaled to the larger dimension of
    /// the tracked box (aspect ratio preserved) and centered on the box
    /// center. The overlap with the frame is clipped once up front;
    /// a degenerate size or an empty overlap leaves the frame untouched.
    pub fn composite(
        &self,
        frame: &mut Mat,
        track_box: &RotatedRect,
        weights: BlendWeights,
    ) -> opencv::Result<()> {
        let box_size = track_box.size();
        let height = box_size.width.max(box_size.height) as i32;
        let width = (box_size.width.max(box_size.height) * self.aspect_ratio) as i32;
        if width <= 0 || height <= 0 {
            return Ok(());
        }

        let resized = imageops::resize(
            &self.image,
            width as u32,
            height as u32,
            FilterType::Lanczos3,
        );

        let center = track_box.center();
        let left = center.x as i32 - width / 2;
        let top = center.y as i32 - height / 2;

        let frame_cols = frame.cols();
        let frame_rows = frame.rows();
        let x0 = left.max(0);
        let y0 = top.max(0);
        let x1 = (left + width).min(frame_cols);
        let y1 = (top + height).min(frame_rows);
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }

        let pixels = frame.data_typed_mut::<Vec3b>()?;
        for y in y0..y1 {
            let row = &mut pixels[(y * frame_cols) as usize..((y + 1) * frame_cols) as usize];
            for x in x0..x1 {
                let sprite_pixel = resized.get_pixel((x - left) as u32, (y - top) as u32).0;
                let alpha = sprite_pixel[3] as f32 / 255.0;
                if alpha == 0.0 {
                    continue;
                }
                let pixel = &mut row[x as usize];
                // sprite channels are RGBA, the frame is BGR
                for (channel, source) in [(0usize, 2usize), (1, 1), (2, 0)] {
                    pixel.0[channel] = blend_channel(
                        pixel.0[channel],
                        sprite_pixel[source],
                        alpha,
                        weights.frame[channel],
                        weights.sprite[channel],
                    );
                }
            }
        }
        Ok(())
    }
}
