use super::*;
use std::fs;
use std::thread;

use tempfile::tempdir;

use crate::cover::CoverArt;
use crate::probe::DescriptiveTags;
use crate::testing::{FakeProbe, OpenFailure, RecordingCache, properties, services, strings};

fn full_tags() -> DescriptiveTags {
    DescriptiveTags {
        title: Some("The Long Take".into()),
        genre: Some("Drama".into()),
        comment: Some("Restored print".into()),
        composer: Some("Jane Doe".into()),
        composer_sort: Some("Doe, Jane".into()),
        performers: strings(&["Ann", "Bob"]),
        performers_sort: vec![],
        album_artists: strings(&["Studio"]),
    }
}

fn item_with(probe: FakeProbe) -> (Arc<FakeProbe>, Arc<RecordingCache>, VideoItem) {
    let probe = Arc::new(probe);
    let cache = Arc::new(RecordingCache::default());
    let item = VideoItem::new(
        "/videos/holiday.mkv",
        VideoType::Mkv,
        services(&probe, &cache),
    );
    (probe, cache, item)
}

#[test]
fn new_item_is_not_materialized_until_read() {
    let (probe, cache, item) = item_with(FakeProbe::new(None, Some(full_tags())));
    assert!(!item.is_initialized());
    assert_eq!(item.base_title(), "holiday");
    assert_eq!(item.kind(), VideoType::Mkv);
    assert_eq!(probe.opens(), 0);
    assert!(cache.events().is_empty());

    assert_eq!(item.title(), Some("The Long Take"));
    assert!(item.is_initialized());
    assert_eq!(probe.opens(), 1);
}

#[test]
fn materialization_runs_once_and_signals_once() {
    let (probe, cache, item) = item_with(FakeProbe::new(
        Some(properties(Duration::from_secs(5400), 1920, 1080)),
        Some(full_tags()),
    ));

    let first = item.ensure_materialized().clone();
    let second = item.ensure_materialized().clone();
    assert_eq!(first, second);
    let _ = item.title();
    let _ = item.genre();
    let _ = item.actors();

    assert_eq!(probe.opens(), 1);
    assert_eq!(cache.count(RefreshReason::Materialized), 1);
    assert_eq!(cache.events().len(), 1);
}

#[test]
fn concurrent_first_access_probes_once() {
    let probe = Arc::new(FakeProbe::new(None, Some(full_tags())));
    let cache = Arc::new(RecordingCache::default());
    let item = Arc::new(VideoItem::new(
        "/videos/race.mp4",
        VideoType::Mp4,
        services(&probe, &cache),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let item = Arc::clone(&item);
            thread::spawn(move || item.title().map(str::to_string))
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap().as_deref(), Some("The Long Take"));
    }

    assert_eq!(probe.opens(), 1);
    assert_eq!(cache.count(RefreshReason::Materialized), 1);
}

#[test]
fn cache_signal_sees_materialized_fields() {
    let (_probe, cache, item) = item_with(FakeProbe::new(None, Some(full_tags())));
    let _ = item.description();

    let events = cache.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].path, PathBuf::from("/videos/holiday.mkv"));
    let snapshot: serde_json::Value = serde_json::from_slice(&events[0].snapshot).unwrap();
    assert_eq!(snapshot["t"], "The Long Take");
    assert_eq!(snapshot["g"], "Drama");
}

#[test]
fn accessors_return_extracted_values() {
    let (_probe, _cache, item) = item_with(FakeProbe::new(
        Some(properties(Duration::from_secs(90), 1280, 720)),
        Some(full_tags()),
    ));

    assert_eq!(item.title(), Some("The Long Take"));
    assert_eq!(item.description(), Some("Restored print"));
    assert_eq!(item.director(), Some("Doe, Jane"));
    assert_eq!(item.genre(), Ok("Drama"));
    assert_eq!(item.actors(), Some(&strings(&["Ann", "Bob"])[..]));
    assert_eq!(item.duration(), Some(Duration::from_secs(90)));
    assert_eq!(item.width(), Some(1280));
    assert_eq!(item.height(), Some(720));
}

#[test]
fn near_zero_duration_is_absent() {
    let (_p, _c, short) = item_with(FakeProbe::new(
        Some(properties(Duration::from_millis(50), 640, 480)),
        None,
    ));
    assert_eq!(short.duration(), None);
    assert_eq!(short.width(), Some(640));

    let (_p, _c, ok) = item_with(FakeProbe::new(
        Some(properties(Duration::from_millis(200), 640, 480)),
        None,
    ));
    assert_eq!(ok.duration(), Some(Duration::from_millis(200)));
}

#[test]
fn director_falls_back_to_plain_composer() {
    let tags = DescriptiveTags {
        composer_sort: Some("  ".into()),
        composer: Some("Jane Doe".into()),
        ..DescriptiveTags::default()
    };
    let (_p, _c, item) = item_with(FakeProbe::new(None, Some(tags)));
    assert_eq!(item.director(), Some("Jane Doe"));
}

#[test]
fn actors_prefer_performers_over_album_artists() {
    let tags = DescriptiveTags {
        performers_sort: vec![],
        performers: strings(&["A", "B"]),
        album_artists: strings(&["C"]),
        ..DescriptiveTags::default()
    };
    let (_p, _c, item) = item_with(FakeProbe::new(None, Some(tags)));
    assert_eq!(item.actors(), Some(&strings(&["A", "B"])[..]));
}

#[test]
fn actors_fall_back_to_album_artists() {
    let tags = DescriptiveTags {
        album_artists: strings(&["C"]),
        ..DescriptiveTags::default()
    };
    let (_p, _c, item) = item_with(FakeProbe::new(None, Some(tags)));
    assert_eq!(item.actors(), Some(&strings(&["C"])[..]));
}

#[test]
fn missing_genre_is_an_error_but_missing_title_is_not() {
    let (_p, _c, item) = item_with(FakeProbe::new(None, Some(DescriptiveTags::default())));
    assert_eq!(item.genre(), Err(MetadataError::GenreUnsupported));
    assert_eq!(item.title(), None);

    let blank = DescriptiveTags {
        genre: Some(" ".into()),
        ..DescriptiveTags::default()
    };
    let (_p, _c, item) = item_with(FakeProbe::new(None, Some(blank)));
    assert_eq!(item.genre(), Err(MetadataError::GenreUnsupported));
}

#[test]
fn properties_failure_keeps_tags() {
    let (_p, _c, item) = item_with(FakeProbe::new(None, Some(full_tags())));
    assert_eq!(item.duration(), None);
    assert_eq!(item.width(), None);
    assert_eq!(item.title(), Some("The Long Take"));
}

#[test]
fn tags_failure_keeps_properties() {
    let (_p, _c, item) = item_with(FakeProbe::new(
        Some(properties(Duration::from_secs(10), 320, 240)),
        None,
    ));
    assert_eq!(item.duration(), Some(Duration::from_secs(10)));
    assert_eq!(item.height(), Some(240));
    assert_eq!(item.title(), None);
    assert_eq!(item.actors(), None);
    assert!(item.genre().is_err());
}

#[test]
fn open_failure_leaves_everything_absent_and_is_not_retried() {
    for failure in [OpenFailure::Corrupt, OpenFailure::Unreadable] {
        let (probe, cache, item) = item_with(FakeProbe::failing(failure));
        assert_eq!(item.ensure_materialized(), &VideoMetadata::default());
        assert!(item.is_initialized());
        assert_eq!(item.title(), None);
        assert_eq!(item.duration(), None);
        assert_eq!(probe.opens(), 1);
        assert_eq!(cache.count(RefreshReason::Materialized), 1);
    }
}

#[test]
fn display_title_joins_base_and_tagged_title() {
    let (_p, _c, item) = item_with(FakeProbe::new(None, Some(full_tags())));
    assert_eq!(item.display_title(), "holiday — The Long Take");

    let blank = DescriptiveTags {
        title: Some("   ".into()),
        ..DescriptiveTags::default()
    };
    let (_p, _c, item) = item_with(FakeProbe::new(None, Some(blank)));
    assert_eq!(item.display_title(), "holiday");

    let (_p, _c, item) = item_with(FakeProbe::failing(OpenFailure::Corrupt));
    assert_eq!(item.display_title(), "holiday");
}

#[cfg(unix)]
#[test]
fn base_title_keeps_non_utf8_stems_distinct() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let probe = Arc::new(FakeProbe::failing(OpenFailure::Corrupt));
    let cache = Arc::new(RecordingCache::default());
    let latin1 = VideoItem::new(
        Path::new("/videos").join(OsStr::from_bytes(b"caf\xe9.mkv")),
        VideoType::Mkv,
        services(&probe, &cache),
    );
    let other = VideoItem::new(
        Path::new("/videos").join(OsStr::from_bytes(b"na\xefve.mkv")),
        VideoType::Mkv,
        services(&probe, &cache),
    );

    assert_eq!(latin1.base_title(), "caf\u{FFFD}");
    assert_eq!(other.base_title(), "na\u{FFFD}ve");
    assert_eq!(latin1.display_title(), "caf\u{FFFD}");
}

fn on_disk_item(
    dir: &tempfile::TempDir,
) -> (Arc<FakeProbe>, Arc<RecordingCache>, Arc<VideoItem>) {
    let path = dir.path().join("film.mp4");
    fs::write(&path, b"not real").unwrap();
    let probe = Arc::new(FakeProbe::new(
        Some(properties(Duration::from_secs(60), 1920, 1080)),
        Some(full_tags()),
    ));
    let cache = Arc::new(RecordingCache::default());
    let item = Arc::new(VideoItem::new(
        path,
        VideoType::Mp4,
        services(&probe, &cache),
    ));
    (probe, cache, item)
}

fn tiny_art() -> CoverArt {
    CoverArt {
        width: 2,
        height: 2,
        mime_type: "image/jpeg".into(),
        data: vec![0xFF, 0xD8, 0xFF],
    }
}

#[test]
fn cover_is_created_once_and_materializes_first() {
    let dir = tempdir().unwrap();
    let (probe, _cache, item) = on_disk_item(&dir);

    let a = item.cover().unwrap();
    let b = item.cover().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(item.is_initialized());
    assert_eq!(probe.opens(), 1);
    assert!(item.resolved_cover().is_none());
}

#[test]
fn cover_construction_failure_is_retried() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("later.mkv");
    let probe = Arc::new(FakeProbe::new(None, None));
    let cache = Arc::new(RecordingCache::default());
    let item = Arc::new(VideoItem::new(
        path.clone(),
        VideoType::Mkv,
        services(&probe, &cache),
    ));

    assert!(item.cover().is_none());
    assert!(item.cover().is_none());

    fs::write(&path, b"now it exists").unwrap();
    assert!(item.cover().is_some());
}

#[test]
fn cover_resolution_signals_cache_once() {
    let dir = tempdir().unwrap();
    let (_probe, cache, item) = on_disk_item(&dir);

    let cover = item.cover().unwrap();
    assert_eq!(cache.count(RefreshReason::Materialized), 1);
    assert_eq!(cache.count(RefreshReason::CoverResolved), 0);

    cover.resolve_with(|_| Ok(tiny_art())).unwrap();
    cover.resolve_with(|_| Ok(tiny_art())).unwrap();

    assert_eq!(cache.count(RefreshReason::Materialized), 1);
    assert_eq!(cache.count(RefreshReason::CoverResolved), 1);
    let resolved = item.resolved_cover().unwrap();
    assert!(Arc::ptr_eq(&resolved, &cover));

    let events = cache.events();
    let last = events.last().unwrap();
    assert_eq!(last.reason, RefreshReason::CoverResolved);
    let snapshot: serde_json::Value = serde_json::from_slice(&last.snapshot).unwrap();
    assert_eq!(snapshot["c"]["w"], 2);
}

#[test]
fn cover_resolution_on_another_thread_reaches_the_cache() {
    let dir = tempdir().unwrap();
    let (_probe, cache, item) = on_disk_item(&dir);

    let cover = item.cover().unwrap();
    let worker = {
        let cover = Arc::clone(&cover);
        thread::spawn(move || {
            cover.resolve_with(|_| Ok(tiny_art())).unwrap();
        })
    };
    worker.join().unwrap();

    assert_eq!(cache.count(RefreshReason::CoverResolved), 1);
    assert!(item.resolved_cover().is_some());
}

#[test]
fn dropped_item_ignores_late_cover_resolution() {
    let dir = tempdir().unwrap();
    let (_probe, cache, item) = on_disk_item(&dir);

    let cover = item.cover().unwrap();
    drop(item);
    cover.resolve_with(|_| Ok(tiny_art())).unwrap();

    assert_eq!(cache.count(RefreshReason::CoverResolved), 0);
}
