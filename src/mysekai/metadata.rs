//! Metadata table access.
//!
//! Layout code resolves display metadata (icon asset names, fixture
//! rarities, music jackets) from per-table JSON files shipped alongside the
//! assets. The set of tables is a closed registry: [`Table`] enumerates
//! every table the layouts consult, and [`MetadataSource`] is the
//! lookup-by-id capability over it.
//!
//! A missing record is never an error. Snapshots routinely reference tables
//! that drift across game updates, so lookup misses are the steady state and
//! resolve to `None`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use log::{debug, warn};
use serde_json::Value as JsonValue;

/// The metadata tables consulted during layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    MysekaiMaterials,
    MysekaiItems,
    MysekaiFixtures,
    MysekaiMusicRecords,
    Musics,
    MysekaiPhenomenas,
    MysekaiSiteHarvestFixtures,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::MysekaiMaterials,
        Table::MysekaiItems,
        Table::MysekaiFixtures,
        Table::MysekaiMusicRecords,
        Table::Musics,
        Table::MysekaiPhenomenas,
        Table::MysekaiSiteHarvestFixtures,
    ];

    /// File stem of the backing JSON file (camelCase, as shipped).
    pub fn file_stem(self) -> &'static str {
        match self {
            Table::MysekaiMaterials => "mysekaiMaterials",
            Table::MysekaiItems => "mysekaiItems",
            Table::MysekaiFixtures => "mysekaiFixtures",
            Table::MysekaiMusicRecords => "mysekaiMusicrecords",
            Table::Musics => "musics",
            Table::MysekaiPhenomenas => "mysekaiPhenomenas",
            Table::MysekaiSiteHarvestFixtures => "mysekaiSiteHarvestFixtures",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Lookup-by-id over the metadata table registry.
pub trait MetadataSource {
    /// Find the record with the given `id`, or `None` when the table or the
    /// record is absent.
    fn find_by_id(&self, table: Table, id: i64) -> Option<JsonValue>;
}

/// Metadata tables loaded from local JSON files.
///
/// Each table is a JSON array of objects carrying an `"id"` field. Tables
/// are loaded and indexed at most once, on first access; a missing or
/// unreadable file degrades to an empty table with a warning.
pub struct LocalMetadata {
    metadata_dir: PathBuf,
    indexes: RefCell<HashMap<Table, HashMap<i64, JsonValue>>>,
}

impl LocalMetadata {
    /// `metadata_dir` is the directory holding `<tableName>.json` files,
    /// e.g. `<resource_root>/metadata/<region>`.
    pub fn new(metadata_dir: impl Into<PathBuf>) -> Self {
        Self {
            metadata_dir: metadata_dir.into(),
            indexes: RefCell::new(HashMap::new()),
        }
    }

    fn load_index(&self, table: Table) -> HashMap<i64, JsonValue> {
        let path = self.metadata_dir.join(format!("{}.json", table.file_stem()));
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Metadata file not found or unreadable: {} ({})", path.display(), e);
                return HashMap::new();
            }
        };
        let records: Vec<JsonValue> = match serde_json::from_str(&raw) {
            Ok(JsonValue::Array(records)) => records,
            Ok(_) => {
                warn!("Metadata file is not a JSON array: {}", path.display());
                return HashMap::new();
            }
            Err(e) => {
                warn!("Malformed metadata file {}: {}", path.display(), e);
                return HashMap::new();
            }
        };

        let mut index = HashMap::with_capacity(records.len());
        for record in records {
            if let Some(id) = record.get("id").and_then(JsonValue::as_i64) {
                index.insert(id, record);
            }
        }
        debug!("Indexed metadata table {}: {} records", table, index.len());
        index
    }
}

impl MetadataSource for LocalMetadata {
    fn find_by_id(&self, table: Table, id: i64) -> Option<JsonValue> {
        let mut indexes = self.indexes.borrow_mut();
        let index = indexes
            .entry(table)
            .or_insert_with(|| self.load_index(table));
        index.get(&id).cloned()
    }
}
