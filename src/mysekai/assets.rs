//! Asset resolution.
//!
//! The layout engine only needs image *dimensions*; it never decodes pixel
//! data. [`LocalAssets`] probes dimensions straight from the PNG IHDR chunk
//! and memoizes the result per logical path. A missing asset resolves to a
//! 1×1 transparent sentinel handle, never an error: layouts proceed with a
//! visibly blank marker instead of aborting.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder};
use log::{debug, trace};

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// A resolved image: logical path plus dimensions.
///
/// The renderer loads pixel data itself using the logical path; the layout
/// engine only consumes the dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    path: String,
    width: u32,
    height: u32,
}

impl ImageHandle {
    pub fn new(path: impl Into<String>, width: u32, height: u32) -> Self {
        Self { path: path.into(), width, height }
    }

    /// The 1×1 transparent sentinel signalling "not found".
    pub fn missing() -> Self {
        Self { path: String::new(), width: 1, height: 1 }
    }

    pub fn is_missing(&self) -> bool {
        self.width <= 1
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Resolves logical asset paths to image handles.
pub trait AssetSource {
    fn resolve(&self, path: &str) -> ImageHandle;
}

/// Local on-disk asset lookup with an in-memory cache.
///
/// Lookup order mirrors the deployed resource tree: the hand-curated
/// `static_images` directory overlays the per-region extracted asset
/// directory. Every logical path is probed at most once; misses are cached
/// too.
pub struct LocalAssets {
    static_dir: PathBuf,
    asset_dir: PathBuf,
    cache: RefCell<HashMap<String, ImageHandle>>,
}

impl LocalAssets {
    /// `resource_root` is the deployment resource directory; assets live in
    /// `<root>/assets/<region>` and static overrides in `<root>/static_images`.
    pub fn new(resource_root: impl AsRef<Path>, region: &str) -> Self {
        let root = resource_root.as_ref();
        Self {
            static_dir: root.join("static_images"),
            asset_dir: root.join("assets").join(region),
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn probe(&self, logical: &str) -> ImageHandle {
        for base in [&self.static_dir, &self.asset_dir] {
            let candidate = base.join(logical);
            if let Some((width, height)) = probe_png_dimensions(&candidate) {
                trace!("Resolved asset {} -> {}x{}", logical, width, height);
                return ImageHandle::new(logical, width, height);
            }
        }
        debug!("Asset not found, using missing sentinel: {}", logical);
        ImageHandle::missing()
    }
}

impl AssetSource for LocalAssets {
    fn resolve(&self, path: &str) -> ImageHandle {
        // Asset rips are sometimes referenced with a "_rip" suffix that is
        // absent from the extracted tree.
        let logical = path.replace("_rip", "");
        if let Some(handle) = self.cache.borrow().get(&logical) {
            return handle.clone();
        }
        let handle = self.probe(&logical);
        self.cache
            .borrow_mut()
            .insert(logical, handle.clone());
        handle
    }
}

/// Read width/height from a PNG file header without decoding the image.
///
/// PNG layout: 8-byte signature, then the IHDR chunk (4-byte length,
/// 4-byte type, 4-byte width, 4-byte height, ...).
fn probe_png_dimensions(path: &Path) -> Option<(u32, u32)> {
    let mut file = File::open(path).ok()?;
    let mut header = [0u8; 24];
    file.read_exact(&mut header).ok()?;

    if header[..8] != PNG_SIGNATURE || &header[12..16] != b"IHDR" {
        return None;
    }
    let width = BigEndian::read_u32(&header[16..20]);
    let height = BigEndian::read_u32(&header[20..24]);
    Some((width, height))
}
