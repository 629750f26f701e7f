use std::env;
use std::fs;
use std::process;

use mysekai_reader::{
    build_harvest_maps, build_summary, LayoutOptions, LocalAssets, LocalMetadata, Snapshot,
};

struct Args {
    snapshot_path: String,
    key_hex: Option<String>,
    iv_hex: Option<String>,
    resources_dir: Option<String>,
    region: String,
    json_out: Option<String>,
    include_harvested: bool,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} <snapshot.bin> [--key <HEX>] [--iv <HEX>] [--resources <DIR>] \
         [--region <REGION>] [--json <OUT.json>] [--hide-harvested]",
        program
    );
    eprintln!();
    eprintln!("The AES key/iv may also be supplied via the MYSEKAI_AES_KEY and");
    eprintln!("MYSEKAI_AES_IV environment variables (hex).");
    process::exit(1);
}

fn parse_args() -> Args {
    let argv: Vec<String> = env::args().collect();
    let program = argv.first().map(String::as_str).unwrap_or("mysekai-reader");
    if argv.len() < 2 {
        usage(program);
    }

    let mut args = Args {
        snapshot_path: String::new(),
        key_hex: env::var("MYSEKAI_AES_KEY").ok(),
        iv_hex: env::var("MYSEKAI_AES_IV").ok(),
        resources_dir: None,
        region: "jp".to_string(),
        json_out: None,
        include_harvested: true,
    };

    let mut iter = argv[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--key" => match iter.next() {
                Some(v) => args.key_hex = Some(v.clone()),
                None => usage(program),
            },
            "--iv" => match iter.next() {
                Some(v) => args.iv_hex = Some(v.clone()),
                None => usage(program),
            },
            "--resources" => match iter.next() {
                Some(v) => args.resources_dir = Some(v.clone()),
                None => usage(program),
            },
            "--region" => match iter.next() {
                Some(v) => args.region = v.clone(),
                None => usage(program),
            },
            "--json" => match iter.next() {
                Some(v) => args.json_out = Some(v.clone()),
                None => usage(program),
            },
            "--hide-harvested" => args.include_harvested = false,
            other if args.snapshot_path.is_empty() && !other.starts_with("--") => {
                args.snapshot_path = other.to_string();
            }
            _ => usage(program),
        }
    }
    if args.snapshot_path.is_empty() {
        usage(program);
    }
    args
}

fn decode_hex(label: &str, hex_str: Option<&String>) -> Vec<u8> {
    let Some(hex_str) = hex_str else {
        eprintln!("ERROR: missing {} (flag or environment variable)", label);
        process::exit(1);
    };
    match hex::decode(hex_str.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("ERROR: invalid hex for {}: {}", label, e);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();
    let args = parse_args();

    let key = decode_hex("AES key", args.key_hex.as_ref());
    let iv = decode_hex("AES iv", args.iv_hex.as_ref());

    println!("Reading snapshot: {}", args.snapshot_path);
    println!("{}", "=".repeat(60));

    let blob = match fs::read(&args.snapshot_path) {
        Ok(blob) => blob,
        Err(e) => {
            eprintln!("ERROR: failed to read {}: {}", args.snapshot_path, e);
            process::exit(1);
        }
    };
    println!("Encrypted blob: {} bytes", blob.len());

    let snapshot = match Snapshot::from_encrypted(&blob, &key, &iv) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("\nERROR: failed to decode snapshot");
            eprintln!("  {}", e);
            process::exit(1);
        }
    };
    println!("Snapshot decoded.");

    if let Some(json_path) = &args.json_out {
        match fs::write(json_path, snapshot.to_pretty_json()) {
            Ok(()) => println!("Record tree dumped to {}", json_path),
            Err(e) => {
                eprintln!("ERROR: failed to write {}: {}", json_path, e);
                process::exit(1);
            }
        }
    }

    println!("\nSnapshot sections:");
    println!("  Harvest maps: {}", snapshot.harvest_maps().len());
    println!("  Phenomena schedules: {}", snapshot.phenomena_schedules().len());
    println!("  Owned music records: {}", snapshot.owned_music_record_ids().len());
    if let Some(ms) = snapshot.updated_at_millis() {
        println!("  Updated at: {} ms", ms);
    }

    let Some(resources_dir) = &args.resources_dir else {
        println!("\nNo --resources directory given; skipping layout.");
        return;
    };

    let assets = LocalAssets::new(resources_dir, &args.region);
    let metadata = LocalMetadata::new(format!("{}/metadata/{}", resources_dir, args.region));
    let options = LayoutOptions {
        include_harvested: args.include_harvested,
        ..LayoutOptions::default()
    };

    let summary = build_summary(&snapshot, &assets, &metadata, &options);
    println!("\nSummary layout:");
    println!(
        "  Weather: {} phenomena, current id {} (index {})",
        summary.weather.phenomena_images.len(),
        summary.weather.current_phenomenon_id,
        summary.weather.current_index
    );
    println!("  Gate level: {}", summary.gate_level);
    println!("  Visitors: {}", summary.visited_characters.len());
    for site in &summary.sites {
        println!("  Site {}: {} resource entries", site.site_id, site.resources.len());
    }

    match build_harvest_maps(&snapshot, &assets, &metadata, &options) {
        Ok(maps) => {
            println!("\nHarvest map layouts:");
            for map in &maps {
                println!(
                    "  Site {}: {}x{}, {} points, {} drop markers, spawn at {:?}",
                    map.site_id,
                    map.draw_width,
                    map.draw_height,
                    map.harvest_points.len(),
                    map.dropped_resources.len(),
                    map.spawn_point
                );
            }
        }
        Err(e) => {
            eprintln!("\nERROR: failed to build harvest maps");
            eprintln!("  {}", e);
            process::exit(1);
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("Done.");
}
