//! Layout output structures consumed by the renderer.

use crate::mysekai::assets::ImageHandle;
use crate::mysekai::resource::ResourceKey;

/// An axis-aligned rectangle in (scaled) pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// RGBA outline drawn around an emphasized icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outline {
    pub color: [u8; 4],
    pub width: i64,
}

/// Emphasis for most-rare resources.
pub const MOST_RARE_OUTLINE: Outline = Outline { color: [255, 50, 50, 150], width: 2 };
/// Lighter emphasis for demoted small icons.
pub const SMALL_ICON_OUTLINE: Outline = Outline { color: [50, 50, 255, 100], width: 1 };

/// Background drawing instructions: scale the referenced image by `scale`,
/// then crop to `crop` (already expressed in scaled pixels) when present.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSpec {
    pub image: ImageHandle,
    pub scale: f64,
    pub crop: Option<PixelRect>,
}

/// A fixed collection-point marker: square icon at a top-left position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestPoint {
    pub image: ImageHandle,
    pub size: i64,
    pub x: i64,
    pub y: i64,
}

/// One aggregated resource drop marker.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedResource {
    pub image: ImageHandle,
    pub key: ResourceKey,
    pub quantity: u64,
    /// Top-left position in drawable pixels.
    pub x: i64,
    pub z: i64,
    /// Rendered square size.
    pub size: i64,
    /// Total paint-order key; later paints on top.
    pub draw_order: i64,
    pub is_small_icon: bool,
    pub outline: Option<Outline>,
    /// Glow radius for most-rare resources.
    pub glow_size: Option<i64>,
}

/// Render-ready layout of one site's harvest map.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestMapLayout {
    pub site_id: i64,
    pub background: BackgroundSpec,
    pub draw_width: i64,
    pub draw_height: i64,
    pub spawn_point: (i64, i64),
    pub harvest_points: Vec<HarvestPoint>,
    /// Sorted by draw order: small and most-rare markers paint last.
    pub dropped_resources: Vec<DroppedResource>,
}

/// Weather phenomena strip for the summary panel.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherInfo {
    pub phenomena_images: Vec<ImageHandle>,
    pub current_phenomenon_id: i64,
    pub current_index: usize,
}

/// A character visiting through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedCharacter {
    pub image: ImageHandle,
}

/// One aggregated resource entry in a site's summary tally.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceTally {
    pub key: ResourceKey,
    pub quantity: u64,
    pub image: ImageHandle,
    pub is_rare: bool,
    pub is_most_rare: bool,
    /// The music record this entry unlocks is already owned.
    pub has_music_record: bool,
}

/// Per-site block of the summary panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSummary {
    pub site_id: i64,
    pub preview: ImageHandle,
    /// Ordered by rarity-aware quantity rank, rarest first.
    pub resources: Vec<ResourceTally>,
}

/// Render-ready summary panel layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLayout {
    pub weather: WeatherInfo,
    pub gate_icon: ImageHandle,
    pub gate_level: i64,
    pub visited_characters: Vec<VisitedCharacter>,
    /// Sites with no aggregated resources are omitted.
    pub sites: Vec<SiteSummary>,
}
