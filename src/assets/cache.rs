use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{
        Arc, OnceLock, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
        mpsc,
    },
    time::{Duration, Instant},
};

use anyhow::Context;

use crate::{
    assets::decode::{PreparedImage, decode_image},
    foundation::error::{RaffleError, RaffleResult},
};

type Slot = Arc<OnceLock<Option<Arc<PreparedImage>>>>;

/// Where an image reference points to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// File on the local filesystem.
    Local(PathBuf),
    /// `http(s)` URL. Remote references are never fetched and degrade to placeholder artwork.
    Remote(String),
}

impl ImageSource {
    /// Resolve a participant image reference against `root`.
    pub fn resolve(reference: &str, root: &Path) -> RaffleResult<Self> {
        let r = reference.trim();
        if r.is_empty() {
            return Err(RaffleError::config("image reference must be non-empty"));
        }
        let lower = r.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Remote(r.to_string()));
        }
        let r = r.strip_prefix("file://").unwrap_or(r);
        let p = Path::new(r);
        if p.is_absolute() {
            return Ok(Self::Local(p.to_path_buf()));
        }
        Ok(Self::Local(root.join(normalize_rel_path(r)?)))
    }

    /// Stable cache key for this source.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Local(p) => format!("file:{}", p.display()),
            Self::Remote(url) => format!("url:{url}"),
        }
    }

    fn load(&self) -> RaffleResult<PreparedImage> {
        match self {
            Self::Local(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("read image bytes from '{}'", path.display()))?;
                decode_image(&bytes)
            }
            Self::Remote(url) => Err(RaffleError::resource(format!(
                "remote image '{url}' is not fetched"
            ))),
        }
    }
}

/// Outcome of [`ImageCache::preload`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Distinct references requested.
    pub requested: usize,
    /// References available in the cache when preload returned.
    pub loaded: usize,
    /// References that failed to resolve, read or decode.
    pub missing: Vec<String>,
    /// References still loading when the wait budget ran out.
    pub timed_out: Vec<String>,
}

/// Shared image cache keyed by resolved reference.
///
/// Reads are concurrent. Population is idempotent: each key is decoded at most once, even when
/// several engines preload the same reference at the same time. Failed loads are cached as missing.
#[derive(Debug, Default)]
pub struct ImageCache {
    slots: RwLock<HashMap<String, Slot>>,
    decode_attempts: AtomicU64,
}

impl ImageCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn slot(&self, key: &str) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    fn peek(&self, key: &str) -> Option<Option<Arc<PreparedImage>>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|s| s.get().cloned())
    }

    /// Load `reference` (blocking) unless already cached. `None` means the image is unavailable.
    pub fn load(&self, reference: &str, root: &Path) -> Option<Arc<PreparedImage>> {
        let source = match ImageSource::resolve(reference, root) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(reference, %err, "unusable image reference");
                return None;
            }
        };
        let slot = self.slot(&source.cache_key());
        slot.get_or_init(|| {
            self.decode_attempts.fetch_add(1, Ordering::Relaxed);
            match source.load() {
                Ok(img) => Some(Arc::new(img)),
                Err(err) => {
                    tracing::warn!(reference, %err, "image unavailable, using placeholder artwork");
                    None
                }
            }
        })
        .clone()
    }

    /// Cached image for `reference`, without loading.
    pub fn get(&self, reference: &str, root: &Path) -> Option<Arc<PreparedImage>> {
        let source = ImageSource::resolve(reference, root).ok()?;
        self.peek(&source.cache_key()).flatten()
    }

    /// Whether `reference` finished loading, successfully or not.
    pub fn is_settled(&self, reference: &str, root: &Path) -> bool {
        ImageSource::resolve(reference, root)
            .map(|s| self.peek(&s.cache_key()).is_some())
            .unwrap_or(true)
    }

    /// Populate `reference` with an already decoded image. Returns `false` if it was already
    /// populated (the existing entry is kept).
    pub fn insert(&self, reference: &str, root: &Path, image: PreparedImage) -> RaffleResult<bool> {
        let source = ImageSource::resolve(reference, root)?;
        let slot = self.slot(&source.cache_key());
        Ok(slot.set(Some(Arc::new(image))).is_ok())
    }

    /// Load every distinct reference on the rayon pool, waiting at most `timeout`.
    ///
    /// Loads that outlive the budget keep running and populate the cache when they finish; the
    /// caller proceeds without them.
    #[tracing::instrument(skip(self, references, root), fields(root = %root.display()))]
    pub fn preload<'a>(
        self: &Arc<Self>,
        references: impl IntoIterator<Item = &'a str>,
        root: &Path,
        timeout: Duration,
    ) -> PreloadReport {
        let unique: Vec<String> = {
            let mut seen = HashSet::new();
            references
                .into_iter()
                .map(str::trim)
                .filter(|r| !r.is_empty() && seen.insert(r.to_string()))
                .map(str::to_string)
                .collect()
        };

        let mut report = PreloadReport {
            requested: unique.len(),
            ..PreloadReport::default()
        };

        let (tx, rx) = mpsc::channel::<(String, bool)>();
        let mut pending = HashSet::new();
        for reference in unique {
            if self.is_settled(&reference, root) {
                if self.get(&reference, root).is_some() {
                    report.loaded += 1;
                } else {
                    report.missing.push(reference);
                }
                continue;
            }
            pending.insert(reference.clone());
            let cache = Arc::clone(self);
            let tx = tx.clone();
            let root = root.to_path_buf();
            rayon::spawn(move || {
                let ok = cache.load(&reference, &root).is_some();
                let _ = tx.send((reference, ok));
            });
        }
        drop(tx);

        let deadline = Instant::now() + timeout;
        while !pending.is_empty() {
            let left = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(left) {
                Ok((reference, ok)) => {
                    pending.remove(&reference);
                    if ok {
                        report.loaded += 1;
                    } else {
                        report.missing.push(reference);
                    }
                }
                Err(_) => break,
            }
        }

        if !pending.is_empty() {
            tracing::warn!(
                count = pending.len(),
                "image preload budget exhausted, continuing without them"
            );
        }
        report.timed_out = pending.into_iter().collect();
        report.timed_out.sort();
        report.missing.sort();
        report
    }

    /// Number of keys (loaded, missing or in flight).
    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many decode attempts were made since construction.
    pub fn decode_attempts(&self) -> u64 {
        self.decode_attempts.load(Ordering::Relaxed)
    }

    /// Pixel bytes held by successfully loaded images.
    pub fn retained_bytes(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter_map(|s| s.get().cloned().flatten())
            .map(|img| img.byte_len())
            .sum()
    }

    /// Drop every cache entry. Images still referenced elsewhere stay alive.
    pub fn clear(&self) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Normalize and validate a relative image path.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects parent
/// traversals (`..`).
pub fn normalize_rel_path(source: &str) -> RaffleResult<String> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(RaffleError::config("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(RaffleError::config("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(RaffleError::config("image path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
