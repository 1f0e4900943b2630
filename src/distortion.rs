use anyhow::Result;
use image::DynamicImage;
use rand::Rng;
use serde::Serialize;

use crate::geometry::{iou, Rectangle};

/// Maximum shift, as a fraction of the region's width/height.
pub const DEFAULT_STRENGTH: f64 = 0.6;

/// Upper limit used when clamping a shifted region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
pub enum ClampBounds {
    /// Clamp x to the region's own width and y to its own height.
    ///
    /// For a full-image region this is one pixel short of the image size.
    #[default]
    #[value(name = "region")]
    RegionExtent,
    /// Clamp to the width and height of the image frame.
    #[value(name = "image")]
    ImageBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistortionConfig {
    pub strength: f64,
    pub clamp: ClampBounds,
}

impl DistortionConfig {
    pub fn new() -> Self {
        Self {
            strength: DEFAULT_STRENGTH,
            clamp: ClampBounds::default(),
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Result<Self> {
        if !strength.is_finite() || strength < 0.0 {
            anyhow::bail!("distortion strength must be a non-negative number, got {}", strength);
        }
        self.strength = strength;
        Ok(self)
    }

    pub fn with_clamp(mut self, clamp: ClampBounds) -> Self {
        self.clamp = clamp;
        self
    }
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The clamp frame of a `width` x `height` image, `(0, 0, width, height)`.
pub fn image_frame(image: &DynamicImage) -> Rectangle {
    Rectangle::new(0.0, 0.0, image.width() as f64, image.height() as f64)
}

fn clamp_to(value: f64, upper: f64) -> f64 {
    value.min(upper).max(0.0)
}

fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(0.5) { 1.0 } else { -1.0 }
}

/// Shift `region` by `(dx, dy)` and clamp the result.
///
/// x is clamped into `[0, upper_x]` and y into `[0, upper_y]`, where the
/// upper limits depend on `clamp`. Coordinates are truncated to whole pixels.
pub fn shift_region(
    region: &Rectangle,
    image_bounds: &Rectangle,
    clamp: ClampBounds,
    dx: f64,
    dy: f64,
) -> Rectangle {
    let (upper_x, upper_y) = match clamp {
        ClampBounds::RegionExtent => (region.width(), region.height()),
        ClampBounds::ImageBounds => (image_bounds.x2, image_bounds.y2),
    };

    let x1 = clamp_to(region.x1 + dx, upper_x).trunc();
    let y1 = clamp_to(region.y1 + dy, upper_y).trunc();
    // A clamp can push the far edge past the near one; collapse to zero size.
    let x2 = clamp_to(region.x2 + dx, upper_x).trunc().max(x1);
    let y2 = clamp_to(region.y2 + dy, upper_y).trunc().max(y1);

    Rectangle::new(x1, y1, x2, y2)
}

/// Shift `region` by a random offset and clamp it back into range.
///
/// The horizontal offset is drawn uniformly from `[0, strength * width]`
/// and the vertical one from `[0, strength * height]`, each with an
/// independent random sign.
pub fn distort_rect<R: Rng + ?Sized>(
    region: &Rectangle,
    image_bounds: &Rectangle,
    config: &DistortionConfig,
    rng: &mut R,
) -> Rectangle {
    let max_dx = (config.strength * region.width()).max(0.0);
    let max_dy = (config.strength * region.height()).max(0.0);

    let dx = rng.gen_range(0.0..=max_dx);
    let dy = rng.gen_range(0.0..=max_dy);
    let dx = random_sign(rng) * dx;
    let dy = random_sign(rng) * dy;

    shift_region(region, image_bounds, config.clamp, dx, dy)
}

/// Crop `image` to the whole-pixel part of `rect`.
pub fn crop(image: &DynamicImage, rect: &Rectangle) -> DynamicImage {
    let rect = rect.truncate();
    image.crop_imm(
        rect.x1 as u32,
        rect.y1 as u32,
        rect.width() as u32,
        rect.height() as u32,
    )
}

/// Produce a randomly shifted crop of `image`.
///
/// Returns the IoU between the full-image region `(0, 0, w-1, h-1)` and the
/// shifted region, together with the cropped image.
pub fn distort_image<R: Rng + ?Sized>(
    image: &DynamicImage,
    image_bounds: &Rectangle,
    config: &DistortionConfig,
    rng: &mut R,
) -> (f64, DynamicImage) {
    let original = Rectangle::from_image_size(image.width(), image.height());
    let distorted = distort_rect(&original, image_bounds, config, rng);

    (iou(&original, &distorted), crop(image, &distorted))
}
