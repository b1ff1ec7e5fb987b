use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::codec;
use crate::error::Result;

/// Extensions recognised as mask images (compared case-insensitively).
pub const MASK_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Where masks come from. Implementations are shared read-only by every page job.
pub trait MaskSource: Sync {
    /// Loads the mask for sprite `name`. `Ok(None)` means there is no such mask.
    fn load_mask(&self, name: &str) -> Result<Option<RgbaImage>>;

    /// True when a mask exists for `name`, without loading it.
    fn has_mask(&self, name: &str) -> bool;
}

/// Sprite-name → file lookup over a directory tree of mask images.
///
/// Keys are paths relative to the root with the extension stripped and `/` as separator,
/// so `root/arm/left.png` is found as `arm/left`.
#[derive(Debug, Clone, Default)]
pub struct MaskIndex {
    root: PathBuf,
    masks: BTreeMap<String, PathBuf>,
}

impl MaskIndex {
    /// Recursively indexes every mask image under `root`.
    pub fn scan(root: impl AsRef<Path>) -> Result<Self> {
        Self::scan_filtered(root, |_| true)
    }

    /// Like [`MaskIndex::scan`], keeping only files whose key satisfies `keep`.
    pub fn scan_filtered(root: impl AsRef<Path>, keep: impl Fn(&str) -> bool) -> Result<Self> {
        let root = root.as_ref();
        let mut masks = BTreeMap::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_mask_file(path) {
                continue;
            }
            let Some(key) = mask_key(root, path) else {
                continue;
            };
            if !keep(&key) {
                continue;
            }
            if let Some(existing) = masks.get(&key) {
                warn!(key = %key, kept = ?existing, ignored = ?path, "duplicate mask name");
                continue;
            }
            masks.insert(key, path.to_path_buf());
        }
        debug!(root = ?root, count = masks.len(), "indexed masks");
        Ok(Self {
            root: root.to_path_buf(),
            masks,
        })
    }

    /// Builds an index from explicit `(key, path)` pairs. Later duplicates are ignored.
    pub fn from_entries<I, K, P>(root: impl Into<PathBuf>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<PathBuf>,
    {
        let mut masks = BTreeMap::new();
        for (k, p) in entries {
            masks.entry(k.into()).or_insert_with(|| p.into());
        }
        Self {
            root: root.into(),
            masks,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.masks.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.masks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.masks.keys().map(String::as_str)
    }
}

impl MaskSource for MaskIndex {
    fn load_mask(&self, name: &str) -> Result<Option<RgbaImage>> {
        match self.get(name) {
            Some(path) => codec::load_rgba(path).map(Some),
            None => Ok(None),
        }
    }

    fn has_mask(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// In-memory masks, keyed like a [`MaskIndex`].
impl MaskSource for HashMap<String, RgbaImage> {
    fn load_mask(&self, name: &str) -> Result<Option<RgbaImage>> {
        Ok(self.get(name).cloned())
    }

    fn has_mask(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

/// True when `path` has one of [`MASK_EXTENSIONS`].
pub fn is_mask_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MASK_EXTENSIONS.iter().any(|m| e.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}

/// Lookup key for `path`: relative to `root`, extension stripped, `/`-separated.
pub fn mask_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let key = rel.with_extension("").to_string_lossy().replace('\\', "/");
    (!key.is_empty()).then_some(key)
}
