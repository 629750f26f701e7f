//! Static per-site map configuration.
//!
//! Each of the four harvestable sites has its own background image and
//! world-to-pixel mapping constants. The values are deployment constants
//! tuned against the game's site backgrounds; they are not derived from the
//! snapshot.

use super::error::{Result, SnapshotError};

/// Global scale factor applied to every harvest map background and marker.
pub const HARVEST_MAP_IMAGE_SCALE: f64 = 0.8;

/// Sites in the order they are presented (and combined) in the output.
pub const SITE_ID_ORDER: [i64; 4] = [5, 7, 6, 8];

/// Crop rectangle in unscaled background pixels: origin + size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// World-to-pixel mapping constants for one site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteMapConfig {
    pub site_id: i64,
    /// Logical path of the full (uncropped) background image.
    pub image: &'static str,
    /// Logical path of the smaller preview used in the summary panel.
    pub preview_image: &'static str,
    /// Pixels per world unit on the unscaled background.
    pub grid_size: f64,
    /// Projection offsets in unscaled background pixels.
    pub offset_x: f64,
    pub offset_z: f64,
    /// Axis direction multipliers (±1).
    pub dir_x: f64,
    pub dir_z: f64,
    /// Some sites store their axes rotated 90°; swap x/z before projecting.
    pub rev_xz: bool,
    pub crop: Option<CropBox>,
}

// Note the site 6/7 background swap: it is present in the deployed asset
// set, not a typo.
const SITE_MAP_CONFIGS: [SiteMapConfig; 4] = [
    SiteMapConfig {
        site_id: 5,
        image: "mysekai/site_map/5.png",
        preview_image: "mysekai/site_map/5.png",
        grid_size: 33.333,
        offset_x: 0.0,
        offset_z: -60.0,
        dir_x: -1.0,
        dir_z: -1.0,
        rev_xz: true,
        crop: Some(CropBox { x: 250.0, y: 150.0, width: 840.0, height: 560.0 }),
    },
    SiteMapConfig {
        site_id: 6,
        image: "mysekai/site_map/7.png",
        preview_image: "mysekai/site_map/7.png",
        grid_size: 20.6,
        offset_x: -10.0,
        offset_z: 90.0,
        dir_x: 1.0,
        dir_z: -1.0,
        rev_xz: false,
        crop: Some(CropBox { x: 350.0, y: 150.0, width: 840.0, height: 560.0 }),
    },
    SiteMapConfig {
        site_id: 7,
        image: "mysekai/site_map/6.png",
        preview_image: "mysekai/site_map/6.png",
        grid_size: 24.8,
        offset_x: -55.0,
        offset_z: 30.0,
        dir_x: -1.0,
        dir_z: -1.0,
        rev_xz: true,
        crop: Some(CropBox { x: 300.0, y: 120.0, width: 840.0, height: 560.0 }),
    },
    SiteMapConfig {
        site_id: 8,
        image: "mysekai/site_map/8.png",
        preview_image: "mysekai/site_map/8.png",
        grid_size: 21.3,
        offset_x: 10.0,
        offset_z: -120.0,
        dir_x: 1.0,
        dir_z: -1.0,
        rev_xz: false,
        crop: Some(CropBox { x: 350.0, y: 100.0, width: 840.0, height: 560.0 }),
    },
];

/// Look up the map configuration for a site.
///
/// # Errors
/// [`SnapshotError::UnknownSite`] when no configuration is registered: with
/// no coordinate system there is nothing meaningful to lay out.
pub fn site_config(site_id: i64) -> Result<&'static SiteMapConfig> {
    SITE_MAP_CONFIGS
        .iter()
        .find(|c| c.site_id == site_id)
        .ok_or(SnapshotError::UnknownSite(site_id))
}
