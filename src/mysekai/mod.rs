//! Core MySekai snapshot module

pub mod assets;
pub mod codec;
pub mod coords;
pub mod crypto;
pub mod decoder;
pub mod error;
pub mod layout;
pub mod metadata;
pub mod resource;
pub mod sites;

use std::collections::BTreeSet;

use log::info;

use codec::Value;
pub use error::{Result, SnapshotError};

/// A decoded game-state snapshot.
///
/// Thin typed facade over the record tree: it owns the decoded [`Value`]
/// root and exposes the stable snapshot sections by name, so the layout
/// engine never hardcodes tree paths. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    root: Value,
}

impl Snapshot {
    /// Decrypt and decode an encrypted snapshot blob.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The key/iv are unusable or the ciphertext is not block-aligned
    /// - The PKCS#7 padding is malformed (wrong key/iv, corruption)
    /// - The plaintext is not a valid MessagePack record tree
    pub fn from_encrypted(blob: &[u8], key: &[u8], iv: &[u8]) -> Result<Self> {
        let root = decoder::decrypt_and_decode(blob, key, iv)?;
        info!("Snapshot decoded successfully");
        Ok(Self { root })
    }

    /// Wrap an already-decoded record tree.
    pub fn from_tree(root: Value) -> Self {
        Self { root }
    }

    /// The raw record tree.
    pub fn tree(&self) -> &Value {
        &self.root
    }

    /// Snapshot upload time, milliseconds since the Unix epoch.
    pub fn updated_at_millis(&self) -> Option<i64> {
        self.root.get("updatedResources")?.get("now")?.as_i64()
    }

    /// The day's scheduled weather phenomena, in schedule order.
    pub fn phenomena_schedules(&self) -> &[Value] {
        self.root
            .get("mysekaiPhenomenaSchedules")
            .and_then(|v| v.as_array())
            .unwrap_or(&[])
    }

    /// The gate/visitor section, when present.
    pub fn gate_visit(&self) -> Option<&Value> {
        self.root.get("userMysekaiGateCharacterVisit")
    }

    /// Per-site harvest map subtrees, in snapshot order.
    pub fn harvest_maps(&self) -> &[Value] {
        self.root
            .get("updatedResources")
            .and_then(|v| v.get("userMysekaiHarvestMaps"))
            .and_then(|v| v.as_array())
            .unwrap_or(&[])
    }

    /// The harvest map subtree for one site, when the snapshot has it.
    pub fn harvest_map_for_site(&self, site_id: i64) -> Option<&Value> {
        self.harvest_maps()
            .iter()
            .find(|m| m.get("mysekaiSiteId").and_then(Value::as_i64) == Some(site_id))
    }

    /// Ids of the music records the player already owns.
    pub fn owned_music_record_ids(&self) -> BTreeSet<i64> {
        self.root
            .get("updatedResources")
            .and_then(|v| v.get("userMysekaiMusicRecords"))
            .and_then(|v| v.as_array())
            .unwrap_or(&[])
            .iter()
            .filter_map(|item| item.get("mysekaiMusicRecordId").and_then(Value::as_i64))
            .collect()
    }

    /// Pretty-printed JSON rendering of the record tree, for debugging.
    pub fn to_pretty_json(&self) -> String {
        decoder::dump_pretty(&self.root)
    }
}
