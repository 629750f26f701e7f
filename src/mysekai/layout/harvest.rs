//! Harvest map layout: projected markers with deterministic stacking.
//!
//! Drops landing on the same pixel are aggregated per resource key, then laid
//! out as one group: visually dominant resources form a centered row of large
//! icons while the rest demote to a compact badge column on the right. Draw
//! order is a composite key, so small and most-rare markers always paint on
//! top of co-located ordinary ones without a z-buffer.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::mysekai::assets::{AssetSource, ImageHandle};
use crate::mysekai::codec::Value;
use crate::mysekai::coords::Projection;
use crate::mysekai::error::Result;
use crate::mysekai::metadata::{MetadataSource, Table};
use crate::mysekai::resource::{resource_icon, ResourceKey, ResourceKind};
use crate::mysekai::sites::{site_config, SiteMapConfig, SITE_ID_ORDER};
use crate::mysekai::Snapshot;

use super::models::*;
use super::LayoutOptions;

/// Unscaled square size of a collection-point icon.
const HARVEST_POINT_ICON_SIZE: f64 = 160.0;
/// Unscaled square sizes of drop markers.
const LARGE_ICON_SIZE: f64 = 35.0;
const SMALL_ICON_SIZE: f64 = 17.0;
/// Unscaled base glow radius for most-rare markers.
const GLOW_BASE_SIZE: f64 = 45.0;
/// Most-rare large icons render at this multiple of the base large size.
const MOST_RARE_SIZE_BOOST: f64 = 1.5;

/// Draw-order bucket offsets (see module docs).
const SMALL_ICON_ORDER_BUCKET: i64 = 1_000_000;
const MOST_RARE_ORDER_BUCKET: i64 = 100_000;

/// The "full stack" quantity of the two ubiquitous base materials; such a
/// drop is a sentinel that is not meant to render.
const FULL_STACK_QUANTITY: u64 = 6;

/// Build harvest map layouts for every site present in the snapshot, in
/// display order. Sites absent from the snapshot are skipped.
pub fn build_harvest_maps(
    snapshot: &Snapshot,
    assets: &dyn AssetSource,
    metadata: &dyn MetadataSource,
    options: &LayoutOptions,
) -> Result<Vec<HarvestMapLayout>> {
    let mut layouts = Vec::new();
    for site_id in SITE_ID_ORDER {
        match snapshot.harvest_map_for_site(site_id) {
            Some(site_tree) => {
                let config = site_config(site_id)?;
                layouts.push(build_site_harvest_map(
                    site_tree, config, assets, metadata, options,
                ));
            }
            None => info!("No harvest map data for site {}, skipping", site_id),
        }
    }
    Ok(layouts)
}

/// Build the layout for a single site's harvest map subtree.
pub fn build_site_harvest_map(
    site_tree: &Value,
    config: &SiteMapConfig,
    assets: &dyn AssetSource,
    metadata: &dyn MetadataSource,
    options: &LayoutOptions,
) -> HarvestMapLayout {
    let scale = options.scale;
    let background_image = assets.resolve(config.image);
    let projection = Projection::new(
        config,
        background_image.width(),
        background_image.height(),
        scale,
        options.enable_cropping,
    );
    let (draw_width, draw_height) = projection.drawable_size();

    let crop = config
        .crop
        .filter(|_| options.enable_cropping)
        .map(|bbox| PixelRect {
            x: (bbox.x * scale) as i64,
            y: (bbox.y * scale) as i64,
            width: (bbox.width * scale) as i64,
            height: (bbox.height * scale) as i64,
        });

    let harvest_points = layout_harvest_points(site_tree, &projection, assets, metadata, options);
    let dropped_resources = layout_dropped_resources(site_tree, &projection, assets, metadata, options);

    debug!(
        "Site {}: {} harvest points, {} drop markers",
        config.site_id,
        harvest_points.len(),
        dropped_resources.len()
    );

    HarvestMapLayout {
        site_id: config.site_id,
        background: BackgroundSpec {
            image: background_image,
            scale,
            crop,
        },
        draw_width,
        draw_height,
        spawn_point: projection.to_pixel(0.0, 0.0),
        harvest_points,
        dropped_resources,
    }
}

fn layout_harvest_points(
    site_tree: &Value,
    projection: &Projection,
    assets: &dyn AssetSource,
    metadata: &dyn MetadataSource,
    options: &LayoutOptions,
) -> Vec<HarvestPoint> {
    let size = (HARVEST_POINT_ICON_SIZE * options.scale) as i64;
    let fixtures = site_tree
        .get("userMysekaiSiteHarvestFixtures")
        .and_then(|v| v.as_array())
        .unwrap_or(&[]);

    let mut points = Vec::new();
    for item in fixtures {
        if !options.include_harvested
            && item
                .get("userMysekaiSiteHarvestFixtureStatus")
                .and_then(|v| v.as_str())
                != Some("spawned")
        {
            continue;
        }
        let (Some(wx), Some(wz)) = (
            item.get("positionX").and_then(Value::as_f64),
            item.get("positionZ").and_then(Value::as_f64),
        ) else {
            continue;
        };
        let (x, y) = projection.to_pixel(wx, wz);

        let image = item
            .get("mysekaiSiteHarvestFixtureId")
            .and_then(Value::as_i64)
            .and_then(|id| metadata.find_by_id(Table::MysekaiSiteHarvestFixtures, id))
            .and_then(|meta| {
                let rarity = meta.get("mysekaiSiteHarvestFixtureRarityType")?.as_str()?.to_string();
                let asset = meta.get("assetbundleName")?.as_str()?.to_string();
                Some(assets.resolve(&format!(
                    "mysekai/harvest_fixture_icon/{}/{}.png",
                    rarity, asset
                )))
            })
            .unwrap_or_else(ImageHandle::missing);

        points.push(HarvestPoint { image, size, x, y });
    }
    points
}

/// Sum drop quantities per `(pixel position, resource key)`.
///
/// The nested `BTreeMap` fixes the group iteration order, which together with
/// the composite sort keys makes the whole layout a pure total order.
fn aggregate_drops(
    site_tree: &Value,
    projection: &Projection,
    options: &LayoutOptions,
) -> BTreeMap<(i64, i64), BTreeMap<ResourceKey, u64>> {
    let drops = site_tree
        .get("userMysekaiSiteHarvestResourceDrops")
        .and_then(|v| v.as_array())
        .unwrap_or(&[]);

    let mut aggregated: BTreeMap<(i64, i64), BTreeMap<ResourceKey, u64>> = BTreeMap::new();
    for item in drops {
        if !options.include_harvested
            && item
                .get("mysekaiSiteHarvestResourceDropStatus")
                .and_then(|v| v.as_str())
                != Some("before_drop")
        {
            continue;
        }
        let (Some(wx), Some(wz)) = (
            item.get("positionX").and_then(Value::as_f64),
            item.get("positionZ").and_then(Value::as_f64),
        ) else {
            continue;
        };
        let (Some(type_str), Some(id)) = (
            item.get("resourceType").and_then(|v| v.as_str()),
            item.get("resourceId").and_then(Value::as_i64),
        ) else {
            continue;
        };
        let quantity = item.get("quantity").and_then(Value::as_u64).unwrap_or(0);

        let center = projection.to_pixel(wx, wz);
        *aggregated
            .entry(center)
            .or_default()
            .entry(ResourceKey::parse(type_str, id))
            .or_insert(0) += quantity;
    }
    aggregated
}

fn layout_dropped_resources(
    site_tree: &Value,
    projection: &Projection,
    assets: &dyn AssetSource,
    metadata: &dyn MetadataSource,
    options: &LayoutOptions,
) -> Vec<DroppedResource> {
    let scale = options.scale;
    let large_size = (LARGE_ICON_SIZE * scale) as i64;
    let small_size = (SMALL_ICON_SIZE * scale) as i64;
    // Nudge every marker up so it sits above the tile it annotates.
    let global_zoffset = -(HARVEST_POINT_ICON_SIZE * scale) * 0.2;

    let mut markers = Vec::new();
    for (&(center_x, center_z), group) in &aggregate_drops(site_tree, projection, options) {
        // Quantity-descending, key tie-break.
        let mut entries: Vec<(&ResourceKey, u64)> =
            group.iter().map(|(key, &qty)| (key, qty)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let has_material = entries
            .iter()
            .any(|(key, _)| key.kind == ResourceKind::MysekaiMaterial);
        let has_cotton = entries.iter().any(|(key, _)| key.is_cotton());

        // Classification pass: drop the full-stack sentinel, then demote
        // everything the dominant resources push aside.
        let mut classified = Vec::new();
        let mut large_total = 0i64;
        for (key, quantity) in entries {
            if key.is_common_stack_material() && quantity == FULL_STACK_QUANTITY {
                continue;
            }
            let is_small = (has_material && key.kind != ResourceKind::MysekaiMaterial)
                || (has_cotton && !key.is_cotton());
            if !is_small {
                large_total += 1;
            }
            classified.push((key, quantity, is_small));
        }

        let mut small_idx = 0i64;
        let mut large_idx = 0i64;
        for (key, quantity, is_small) in classified {
            let most_rare = key.is_most_rare();
            let (size, top_left_x, mut top_left_z, mut outline);
            if is_small {
                size = small_size;
                // Badge column to the right of the large-icon block.
                top_left_x = (center_x as f64 + 0.5 * large_size as f64 * large_total as f64
                    - 0.6 * small_size as f64) as i64;
                top_left_z = (center_z as f64 - 0.45 * large_size as f64
                    + small_size as f64 * small_idx as f64
                    + global_zoffset) as i64;
                small_idx += 1;
                outline = Some(SMALL_ICON_OUTLINE);
            } else {
                size = if most_rare {
                    (large_size as f64 * MOST_RARE_SIZE_BOOST) as i64
                } else {
                    large_size
                };
                // Left-to-right row, centered as a block on the anchor.
                // Centering uses the base large size so a boosted icon never
                // shifts its neighbors.
                top_left_x = (center_x as f64 - 0.5 * large_size as f64 * large_total as f64
                    + large_size as f64 * large_idx as f64) as i64;
                top_left_z = (center_z as f64 - 0.5 * large_size as f64 + global_zoffset) as i64;
                large_idx += 1;
                outline = None;
            }

            // Off-canvas guard for near-origin drops.
            if top_left_z <= 0 {
                top_left_z += large_size / 2;
            }

            let mut glow_size = None;
            if most_rare {
                outline = Some(MOST_RARE_OUTLINE);
                glow_size =
                    Some((GLOW_BASE_SIZE * scale * if is_small { 3.0 } else { 6.0 }) as i64);
            }

            let mut draw_order = center_z * 1000 + center_x;
            if is_small {
                draw_order += SMALL_ICON_ORDER_BUCKET;
            } else if most_rare {
                draw_order += MOST_RARE_ORDER_BUCKET;
            }

            markers.push(DroppedResource {
                image: resource_icon(key, assets, metadata),
                key: key.clone(),
                quantity,
                x: top_left_x,
                z: top_left_z,
                size,
                draw_order,
                is_small_icon: is_small,
                outline,
                glow_size,
            });
        }
    }

    markers.sort_by(|a, b| {
        a.draw_order
            .cmp(&b.draw_order)
            .then_with(|| a.key.cmp(&b.key))
    });
    markers
}
