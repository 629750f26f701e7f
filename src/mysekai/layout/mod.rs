//! Layout engine: record tree → render-ready drawing primitives.
//!
//! Two products, both pure transforms over an already-decoded snapshot:
//!
//! - [`summary::build_summary`]: weather/gate/visitor panel plus per-site
//!   resource tallies, ordered by a rarity-aware quantity rank
//! - [`harvest::build_harvest_maps`]: per-site harvest maps with projected
//!   marker positions, deterministic stacking and draw order
//!
//! Neither paints pixels; the output is consumed by an external renderer.

pub mod harvest;
pub mod models;
pub mod summary;

pub use harvest::{build_harvest_maps, build_site_harvest_map};
pub use models::*;
pub use summary::build_summary;

use super::sites::HARVEST_MAP_IMAGE_SCALE;

/// Knobs shared by both layout products.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// When false, only drops still waiting to be collected (and only
    /// fixtures still spawned) are laid out.
    pub include_harvested: bool,
    /// Global image scale factor.
    pub scale: f64,
    /// Crop harvest map backgrounds to their configured viewport.
    pub enable_cropping: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            include_harvested: true,
            scale: HARVEST_MAP_IMAGE_SCALE,
            enable_cropping: true,
        }
    }
}
