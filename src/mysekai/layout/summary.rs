//! Summary panel layout: weather, gate visitors and per-site resource tallies.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{TimeZone, Timelike, Utc};
use log::debug;

use crate::mysekai::assets::{AssetSource, ImageHandle};
use crate::mysekai::codec::Value;
use crate::mysekai::metadata::{MetadataSource, Table};
use crate::mysekai::resource::{resource_icon, ResourceKey, ResourceKind};
use crate::mysekai::sites::{site_config, SITE_ID_ORDER};
use crate::mysekai::Snapshot;

use super::models::*;
use super::LayoutOptions;

/// Phenomenon id assumed when the schedule is empty or too short.
const FALLBACK_PHENOMENON_ID: i64 = 1;

/// Rarity boosts added to the raw quantity before the descending sort, so
/// rarity dominates raw quantity no matter how large common stacks get.
const MOST_RARE_ORDER_BOOST: i64 = 1_000_000;
const RARE_ORDER_BOOST: i64 = 100_000;

/// Build the summary panel layout from a decoded snapshot.
///
/// Metadata and asset misses never fail the build; affected entries carry
/// the missing-image sentinel instead.
pub fn build_summary(
    snapshot: &Snapshot,
    assets: &dyn AssetSource,
    metadata: &dyn MetadataSource,
    options: &LayoutOptions,
) -> SummaryLayout {
    let weather = build_weather(snapshot, assets, metadata);
    let (gate_icon, gate_level, visited_characters) = build_gate_visit(snapshot, assets);

    let site_totals = aggregate_site_resources(snapshot, options);
    let owned_records = snapshot.owned_music_record_ids();

    let mut sites = Vec::new();
    for site_id in SITE_ID_ORDER {
        let Some(totals) = site_totals.get(&site_id).filter(|t| !t.is_empty()) else {
            debug!("No resource data for site {}, omitting summary entry", site_id);
            continue;
        };
        let Ok(config) = site_config(site_id) else {
            continue;
        };

        let mut entries: Vec<(&ResourceKey, u64)> =
            totals.iter().map(|(key, &qty)| (key, qty)).collect();
        entries.sort_by_key(|(key, qty)| (Reverse(rarity_adjusted_order(key, *qty)), (*key).clone()));

        let resources = entries
            .into_iter()
            .map(|(key, quantity)| ResourceTally {
                key: key.clone(),
                quantity,
                image: resource_icon(key, assets, metadata),
                is_rare: key.is_rare(),
                is_most_rare: key.is_most_rare(),
                has_music_record: key.kind == ResourceKind::MysekaiMusicRecord
                    && owned_records.contains(&key.id),
            })
            .collect();

        sites.push(SiteSummary {
            site_id,
            preview: assets.resolve(config.preview_image),
            resources,
        });
    }

    SummaryLayout {
        weather,
        gate_icon,
        gate_level,
        visited_characters,
        sites,
    }
}

/// Quantity adjusted so rarity tiers sort ahead of any common quantity.
fn rarity_adjusted_order(key: &ResourceKey, quantity: u64) -> i64 {
    let base = i64::try_from(quantity).unwrap_or(i64::MAX / 2);
    if key.is_most_rare() {
        base + MOST_RARE_ORDER_BOOST
    } else if key.is_rare() {
        base + RARE_ORDER_BOOST
    } else {
        base
    }
}

/// The schedule holds two phenomena per day; the active one is picked by the
/// snapshot-time hour bucket (late-night/evening → second entry).
fn active_schedule_index(snapshot: &Snapshot) -> usize {
    let hour = snapshot
        .updated_at_millis()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|t| t.hour());
    match hour {
        Some(h) if !(4..16).contains(&h) => 1,
        _ => 0,
    }
}

fn build_weather(
    snapshot: &Snapshot,
    assets: &dyn AssetSource,
    metadata: &dyn MetadataSource,
) -> WeatherInfo {
    let mut images = Vec::new();
    let mut ids = Vec::new();
    for item in snapshot.phenomena_schedules() {
        let Some(id) = item.get("mysekaiPhenomenaId").and_then(Value::as_i64) else {
            continue;
        };
        let Some(record) = metadata.find_by_id(Table::MysekaiPhenomenas, id) else {
            continue;
        };
        let Some(asset) = record.get("iconAssetbundleName").and_then(|v| v.as_str()) else {
            continue;
        };
        images.push(assets.resolve(&format!("mysekai/thumbnail/phenomena/{}.png", asset)));
        ids.push(id);
    }

    let current_index = active_schedule_index(snapshot);
    let current_phenomenon_id = ids
        .get(current_index)
        .copied()
        .unwrap_or(FALLBACK_PHENOMENON_ID);

    WeatherInfo {
        phenomena_images: images,
        current_phenomenon_id,
        current_index,
    }
}

fn build_gate_visit(
    snapshot: &Snapshot,
    assets: &dyn AssetSource,
) -> (ImageHandle, i64, Vec<VisitedCharacter>) {
    let visit = snapshot.gate_visit();
    let user_gate = visit.and_then(|v| v.get("userMysekaiGate"));
    let gate_id = user_gate
        .and_then(|g| g.get("mysekaiGateId"))
        .and_then(Value::as_i64)
        .unwrap_or(1);
    let gate_level = user_gate
        .and_then(|g| g.get("mysekaiGateLevel"))
        .and_then(Value::as_i64)
        .unwrap_or(1);
    let gate_icon = assets.resolve(&format!("mysekai/gate_icon/gate_{}.png", gate_id));

    let mut visited_characters = Vec::new();
    let characters = visit
        .and_then(|v| v.get("userMysekaiGateCharacters"))
        .and_then(|v| v.as_array())
        .unwrap_or(&[]);
    for item in characters {
        let Some(cuid) = item
            .get("mysekaiGameCharacterUnitGroupId")
            .and_then(Value::as_i64)
        else {
            continue;
        };
        let image = assets.resolve(&format!("character/character_sd_l/chr_sp_{}.png", cuid));
        if !image.is_missing() {
            visited_characters.push(VisitedCharacter { image });
        }
    }

    (gate_icon, gate_level, visited_characters)
}

/// Sum drop quantities per site and resource key, honoring the visibility
/// filter. Sites outside the known order are ignored.
fn aggregate_site_resources(
    snapshot: &Snapshot,
    options: &LayoutOptions,
) -> BTreeMap<i64, BTreeMap<ResourceKey, u64>> {
    let mut totals: BTreeMap<i64, BTreeMap<ResourceKey, u64>> =
        SITE_ID_ORDER.iter().map(|&id| (id, BTreeMap::new())).collect();

    for site_map in snapshot.harvest_maps() {
        let Some(site_id) = site_map.get("mysekaiSiteId").and_then(Value::as_i64) else {
            continue;
        };
        let Some(site_totals) = totals.get_mut(&site_id) else {
            continue;
        };
        let drops = site_map
            .get("userMysekaiSiteHarvestResourceDrops")
            .and_then(|v| v.as_array())
            .unwrap_or(&[]);
        for drop in drops {
            if !options.include_harvested
                && drop
                    .get("mysekaiSiteHarvestResourceDropStatus")
                    .and_then(|v| v.as_str())
                    != Some("before_drop")
            {
                continue;
            }
            let (Some(type_str), Some(id)) = (
                drop.get("resourceType").and_then(|v| v.as_str()),
                drop.get("resourceId").and_then(Value::as_i64),
            ) else {
                continue;
            };
            let quantity = drop.get("quantity").and_then(Value::as_u64).unwrap_or(0);
            *site_totals
                .entry(ResourceKey::parse(type_str, id))
                .or_insert(0) += quantity;
        }
    }

    totals
}
