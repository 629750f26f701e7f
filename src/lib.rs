//! # mysekai-reader
//!
//! Decrypts MySekai game-state snapshots (AES-CBC + MessagePack) and
//! computes deterministic, render-ready layouts: a summary panel (weather,
//! gate visitors, per-site resource tallies) and per-site harvest maps with
//! projected marker positions and stacking.
//!
//! The crate produces layout data only; rasterization is left to an
//! external renderer.
pub mod mysekai;

// Re-export the main types for convenience
pub use mysekai::{
    assets::{AssetSource, ImageHandle, LocalAssets},
    codec::Value,
    error::{Result, SnapshotError},
    layout::{build_harvest_maps, build_summary, HarvestMapLayout, LayoutOptions, SummaryLayout},
    metadata::{LocalMetadata, MetadataSource, Table},
    resource::{ResourceKey, ResourceKind},
    Snapshot,
};
