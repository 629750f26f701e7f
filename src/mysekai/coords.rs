//! World-to-pixel coordinate projection.
//!
//! Each site projects world `(x, z)` coordinates onto its scaled background
//! image through an affine transform, then optionally re-bases into a
//! cropped viewport. The projection midpoint is always computed from the
//! *uncropped* background: cropping shifts the viewport, it never moves the
//! projection's center. Computing the midpoint after cropping silently
//! shifts every marker.

use super::sites::SiteMapConfig;

/// A fully resolved projection for one site.
///
/// Pure data: `to_pixel` is a deterministic function of the construction
/// inputs with no hidden state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scaled_grid: f64,
    dir_x: f64,
    dir_z: f64,
    rev_xz: bool,
    mid_x: f64,
    mid_z: f64,
    offset_x: f64,
    offset_z: f64,
    crop_x: f64,
    crop_z: f64,
    drawable_width: i64,
    drawable_height: i64,
}

impl Projection {
    /// Build the projection for a site.
    ///
    /// `bg_width`/`bg_height` are the dimensions of the full, uncropped
    /// background image; `scale` is the global image scale factor. When
    /// `enable_crop` is false the configured crop rectangle is ignored and
    /// the drawable area is the whole scaled background.
    pub fn new(
        config: &SiteMapConfig,
        bg_width: u32,
        bg_height: u32,
        scale: f64,
        enable_crop: bool,
    ) -> Self {
        let scaled_w = bg_width as f64 * scale;
        let scaled_h = bg_height as f64 * scale;

        let (crop_x, crop_z, drawable_w, drawable_h) = match config.crop.filter(|_| enable_crop) {
            Some(bbox) => (
                bbox.x * scale,
                bbox.y * scale,
                bbox.width * scale,
                bbox.height * scale,
            ),
            None => (0.0, 0.0, scaled_w, scaled_h),
        };

        Self {
            scaled_grid: config.grid_size * scale,
            dir_x: config.dir_x,
            dir_z: config.dir_z,
            rev_xz: config.rev_xz,
            // Midpoint of the scaled, uncropped image.
            mid_x: scaled_w / 2.0,
            mid_z: scaled_h / 2.0,
            offset_x: config.offset_x * scale,
            offset_z: config.offset_z * scale,
            crop_x,
            crop_z,
            drawable_width: drawable_w as i64,
            drawable_height: drawable_h as i64,
        }
    }

    /// Project world coordinates into drawable pixel space.
    ///
    /// The result is clamped into `[0, drawable_width] × [0, drawable_height]`.
    pub fn to_pixel(&self, world_x: f64, world_z: f64) -> (i64, i64) {
        let (wx, wz) = if self.rev_xz {
            (world_z, world_x)
        } else {
            (world_x, world_z)
        };

        let px = wx * self.scaled_grid * self.dir_x + self.mid_x + self.offset_x - self.crop_x;
        let pz = wz * self.scaled_grid * self.dir_z + self.mid_z + self.offset_z - self.crop_z;

        (
            (px as i64).clamp(0, self.drawable_width),
            (pz as i64).clamp(0, self.drawable_height),
        )
    }

    /// Dimensions of the drawable (post-crop, post-scale) canvas.
    pub fn drawable_size(&self) -> (i64, i64) {
        (self.drawable_width, self.drawable_height)
    }

    /// Scaled crop origin, zero when cropping is disabled.
    pub fn crop_origin(&self) -> (i64, i64) {
        (self.crop_x as i64, self.crop_z as i64)
    }
}
