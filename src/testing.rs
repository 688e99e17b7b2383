//! Test doubles for the probe and cache boundaries.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::{CacheStore, RefreshReason};
use crate::error::ProbeError;
use crate::item::{ItemServices, VideoItem};
use crate::probe::{DescriptiveTags, MetadataProbe, ProbedMedia, TechnicalProperties};

#[derive(Debug, Clone, Copy)]
pub enum OpenFailure {
    Corrupt,
    Unreadable,
}

/// Serves canned results and counts how often it was opened.
/// `None` for a group makes that group fail.
#[derive(Debug, Default)]
pub struct FakeProbe {
    opens: AtomicUsize,
    open_failure: Option<OpenFailure>,
    properties: Option<TechnicalProperties>,
    tags: Option<DescriptiveTags>,
}

impl FakeProbe {
    pub fn new(properties: Option<TechnicalProperties>, tags: Option<DescriptiveTags>) -> Self {
        Self {
            properties,
            tags,
            ..Self::default()
        }
    }

    pub fn failing(failure: OpenFailure) -> Self {
        Self {
            open_failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl MetadataProbe for FakeProbe {
    fn open(&self, path: &Path) -> Result<Box<dyn ProbedMedia>, ProbeError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match self.open_failure {
            Some(OpenFailure::Corrupt) => Err(ProbeError::Corrupt(path.display().to_string())),
            Some(OpenFailure::Unreadable) => {
                Err(ProbeError::Unreadable(path.display().to_string()))
            }
            None => Ok(Box::new(FakeMedia {
                properties: self.properties.clone(),
                tags: self.tags.clone(),
            })),
        }
    }
}

struct FakeMedia {
    properties: Option<TechnicalProperties>,
    tags: Option<DescriptiveTags>,
}

impl ProbedMedia for FakeMedia {
    fn properties(&self) -> Result<TechnicalProperties, ProbeError> {
        self.properties
            .clone()
            .ok_or_else(|| ProbeError::Unreadable("properties".into()))
    }

    fn tags(&self) -> Result<DescriptiveTags, ProbeError> {
        self.tags
            .clone()
            .ok_or_else(|| ProbeError::Unreadable("tags".into()))
    }
}

#[derive(Debug, Clone)]
pub struct RefreshEvent {
    pub path: PathBuf,
    pub reason: RefreshReason,
    /// The item's encoded state at signal time.
    pub snapshot: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct RecordingCache {
    events: Mutex<Vec<RefreshEvent>>,
}

impl RecordingCache {
    pub fn events(&self) -> Vec<RefreshEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, reason: RefreshReason) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.reason == reason)
            .count()
    }
}

impl CacheStore for RecordingCache {
    fn refresh_entry(&self, item: &VideoItem, reason: RefreshReason) {
        let snapshot = item.encode().unwrap();
        self.events.lock().unwrap().push(RefreshEvent {
            path: item.path().to_path_buf(),
            reason,
            snapshot,
        });
    }
}

pub fn services(probe: &Arc<FakeProbe>, cache: &Arc<RecordingCache>) -> ItemServices {
    ItemServices::new(
        Arc::clone(probe) as Arc<dyn MetadataProbe>,
        Arc::clone(cache) as Arc<dyn CacheStore>,
    )
}

pub fn properties(duration: Duration, width: u32, height: u32) -> TechnicalProperties {
    TechnicalProperties {
        duration,
        width: Some(width),
        height: Some(height),
    }
}

pub fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
