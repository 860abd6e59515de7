use std::io::Cursor;

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "raffle_anim_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(dir: &Path, name: &str) {
    let img = image::RgbaImage::from_raw(2, 1, vec![10, 20, 30, 255, 40, 50, 60, 255]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join(name), &buf).unwrap();
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("a/./b\\c.png").unwrap(), "a/b/c.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn resolve_classifies_sources() {
    let root = Path::new("/srv/raffle");
    assert_eq!(
        ImageSource::resolve("https://example.com/a.png", root).unwrap(),
        ImageSource::Remote("https://example.com/a.png".to_string())
    );
    assert_eq!(
        ImageSource::resolve("avatars/a.png", root).unwrap(),
        ImageSource::Local(root.join("avatars/a.png"))
    );
    assert!(ImageSource::resolve("   ", root).is_err());
}

#[test]
fn load_is_idempotent() {
    let dir = temp_dir("cache_idempotent");
    write_png(&dir, "a.png");
    let cache = ImageCache::new();

    let a = cache.load("a.png", &dir).unwrap();
    let b = cache.load("./a.png", &dir).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.decode_attempts(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.retained_bytes(), 8);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn concurrent_loads_decode_once() {
    let dir = temp_dir("cache_concurrent");
    write_png(&dir, "shared.png");
    let cache = Arc::new(ImageCache::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let dir = dir.clone();
            std::thread::spawn(move || cache.load("shared.png", &dir).is_some())
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap());
    }
    assert_eq!(cache.decode_attempts(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_and_remote_images_degrade() {
    let dir = temp_dir("cache_missing");
    let cache = ImageCache::new();
    assert!(cache.load("nope.png", &dir).is_none());
    assert!(cache.load("http://example.com/x.png", &dir).is_none());
    assert!(cache.is_settled("nope.png", &dir));
    assert!(cache.get("nope.png", &dir).is_none());
    assert_eq!(cache.decode_attempts(), 2);
    assert!(cache.load("nope.png", &dir).is_none());
    assert_eq!(cache.decode_attempts(), 2);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn preload_reports_loaded_and_missing() {
    let dir = temp_dir("cache_preload");
    write_png(&dir, "a.png");
    write_png(&dir, "b.png");
    let cache = Arc::new(ImageCache::new());

    let report = cache.preload(
        ["a.png", "b.png", "a.png", "gone.png", ""],
        &dir,
        Duration::from_secs(10),
    );
    assert_eq!(report.requested, 3);
    assert_eq!(report.loaded, 2);
    assert_eq!(report.missing, vec!["gone.png".to_string()]);
    assert!(report.timed_out.is_empty());

    let again = cache.preload(["a.png"], &dir, Duration::from_secs(10));
    assert_eq!(again.loaded, 1);
    assert_eq!(cache.decode_attempts(), 3);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn insert_keeps_first_entry() {
    let dir = temp_dir("cache_insert");
    let cache = ImageCache::new();
    let img = PreparedImage {
        width: 1,
        height: 1,
        rgba8_premul: Arc::new(vec![1, 2, 3, 4]),
    };
    assert!(cache.insert("host.png", &dir, img.clone()).unwrap());
    assert!(!cache.insert("host.png", &dir, img).unwrap());
    assert!(cache.get("host.png", &dir).is_some());
    assert_eq!(cache.decode_attempts(), 0);
    cache.clear();
    assert!(cache.is_empty());
}

/// Hold the slot for `reference` mid-load until the returned sender fires.
fn hold_loading(
    cache: &ImageCache,
    reference: &str,
    root: &Path,
) -> (mpsc::Sender<()>, std::thread::JoinHandle<()>) {
    let key = ImageSource::resolve(reference, root).unwrap().cache_key();
    let slot = cache.slot(&key);
    let (release, wait) = mpsc::channel::<()>();
    let (entered_tx, entered) = mpsc::channel::<()>();
    let holder = std::thread::spawn(move || {
        slot.get_or_init(|| {
            entered_tx.send(()).ok();
            wait.recv().ok();
            None
        });
    });
    entered.recv().unwrap();
    (release, holder)
}

#[test]
fn preload_gives_up_on_slow_loads() {
    let dir = temp_dir("cache_slow");
    write_png(&dir, "fast.png");
    let cache = Arc::new(ImageCache::new());
    let (release, holder) = hold_loading(&cache, "slow.png", &dir);

    let started = Instant::now();
    let report = cache.preload(["fast.png", "slow.png"], &dir, Duration::from_millis(50));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.requested, 2);
    assert_eq!(report.loaded, 1);
    assert!(report.missing.is_empty());
    assert_eq!(report.timed_out, vec!["slow.png".to_string()]);
    assert!(!cache.is_settled("slow.png", &dir));
    assert!(cache.get("slow.png", &dir).is_none());

    release.send(()).unwrap();
    holder.join().unwrap();
    assert!(cache.is_settled("slow.png", &dir));

    std::fs::remove_dir_all(&dir).ok();
}
