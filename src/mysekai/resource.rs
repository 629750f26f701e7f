//! Resource identity, rarity tiers and icon resolution.

use std::fmt;

use super::assets::{AssetSource, ImageHandle};
use super::metadata::{MetadataSource, Table};

/// The collectible resource families appearing in snapshot drop records.
///
/// The `Other` variant keeps the identity open: game updates introduce new
/// `resourceType` strings faster than this crate updates, and unknown kinds
/// must still aggregate and order correctly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    MysekaiMaterial,
    Material,
    MysekaiItem,
    MysekaiFixture,
    MysekaiMusicRecord,
    Other(String),
}

impl ResourceKind {
    pub fn parse(type_str: &str) -> Self {
        match type_str {
            "mysekai_material" => ResourceKind::MysekaiMaterial,
            "material" => ResourceKind::Material,
            "mysekai_item" => ResourceKind::MysekaiItem,
            "mysekai_fixture" => ResourceKind::MysekaiFixture,
            "mysekai_music_record" => ResourceKind::MysekaiMusicRecord,
            other => ResourceKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::MysekaiMaterial => "mysekai_material",
            ResourceKind::Material => "material",
            ResourceKind::MysekaiItem => "mysekai_item",
            ResourceKind::MysekaiFixture => "mysekai_fixture",
            ResourceKind::MysekaiMusicRecord => "mysekai_music_record",
            ResourceKind::Other(s) => s,
        }
    }
}

/// Composite identity of a collectible drop: `(kind, id)`.
///
/// Equality, hashing and ordering are by the composite, never by the
/// rendered label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    pub kind: ResourceKind,
    pub id: i64,
}

impl ResourceKey {
    pub fn new(kind: ResourceKind, id: i64) -> Self {
        Self { kind, id }
    }

    pub fn parse(type_str: &str, id: i64) -> Self {
        Self::new(ResourceKind::parse(type_str), id)
    }

    /// Highest rarity tier: gets outline + glow emphasis and dominates
    /// summary ordering.
    pub fn is_most_rare(&self) -> bool {
        match (&self.kind, self.id) {
            (ResourceKind::MysekaiMaterial, 5 | 12 | 20 | 24) => true,
            (ResourceKind::MysekaiFixture, 121) => true,
            (ResourceKind::Material, 17 | 170) => true,
            _ => false,
        }
    }

    /// Second rarity tier: ordering priority only, no visual emphasis.
    pub fn is_rare(&self) -> bool {
        matches!(
            (&self.kind, self.id),
            (ResourceKind::MysekaiMaterial, 32 | 33 | 34 | 61 | 64 | 65 | 66)
        )
    }

    /// The cotton pair. When present at a pixel position it anchors the
    /// large-icon row and demotes everything else to small badges.
    pub fn is_cotton(&self) -> bool {
        matches!((&self.kind, self.id), (ResourceKind::MysekaiMaterial, 21 | 22))
    }

    /// The two ubiquitous base materials whose "full stack of 6" drop is a
    /// sentinel that is not meant to render.
    pub fn is_common_stack_material(&self) -> bool {
        matches!((&self.kind, self.id), (ResourceKind::MysekaiMaterial, 1 | 6))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.as_str(), self.id)
    }
}

/// Logical icon path for a resource, resolved through the metadata tables.
///
/// Returns `None` when the resource kind has no icon rule or the metadata
/// record is absent.
pub fn icon_path(key: &ResourceKey, metadata: &dyn MetadataSource) -> Option<String> {
    match &key.kind {
        ResourceKind::MysekaiMaterial => {
            let record = metadata.find_by_id(Table::MysekaiMaterials, key.id)?;
            let asset = record.get("iconAssetbundleName")?.as_str()?.to_string();
            Some(format!("mysekai/thumbnail/material/{}.png", asset))
        }
        ResourceKind::Material => Some(format!("thumbnail/material/{}.png", key.id)),
        ResourceKind::MysekaiItem => {
            let record = metadata.find_by_id(Table::MysekaiItems, key.id)?;
            let asset = record.get("iconAssetbundleName")?.as_str()?.to_string();
            Some(format!("mysekai/thumbnail/item/{}.png", asset))
        }
        ResourceKind::MysekaiFixture => {
            let record = metadata.find_by_id(Table::MysekaiFixtures, key.id)?;
            let asset = record.get("assetbundleName")?.as_str()?.to_string();
            Some(format!("mysekai/thumbnail/fixture/{}_1.png", asset))
        }
        ResourceKind::MysekaiMusicRecord => {
            // Two-step lookup: the record points at a music entry, whose
            // jacket doubles as the icon.
            let record = metadata.find_by_id(Table::MysekaiMusicRecords, key.id)?;
            let music_id = record.get("externalId")?.as_i64()?;
            let music = metadata.find_by_id(Table::Musics, music_id)?;
            let asset = music.get("assetbundleName")?.as_str()?.to_string();
            Some(format!("music/jacket/{}/{}.png", asset, asset))
        }
        ResourceKind::Other(_) => None,
    }
}

/// Resolve a resource's icon, falling back to the missing sentinel.
pub fn resource_icon(
    key: &ResourceKey,
    assets: &dyn AssetSource,
    metadata: &dyn MetadataSource,
) -> ImageHandle {
    match icon_path(key, metadata) {
        Some(path) => assets.resolve(&path),
        None => ImageHandle::missing(),
    }
}
