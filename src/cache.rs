use crate::config::Config;
use crate::model::{Event, EventId};
use crate::storage::LocalStorage;
use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

type FlyerMap = BTreeMap<EventId, String>;

/// Local persistence: one file for the event list, one for flyer images keyed by event id.
///
/// Flyers are kept apart so the list stays cheap to rewrite on every edit.
#[derive(Debug, Clone)]
pub struct Cache {
    events_path: PathBuf,
    flyers_path: PathBuf,
}

impl Cache {
    pub fn new(dir: &Path, events_key: &str, flyer_key: &str) -> Result<Self> {
        LocalStorage::ensure_dir(dir)?;
        Ok(Self {
            events_path: dir.join(format!("{}.json", events_key)),
            flyers_path: dir.join(format!("{}.json", flyer_key)),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.data_dir()?,
            &config.events_cache_key,
            &config.flyer_cache_key,
        )
    }

    /// Overwrites the whole list. Flyers are not part of it.
    pub fn save(&self, events: &[Event]) -> Result<()> {
        let json = serde_json::to_string_pretty(events)?;
        LocalStorage::atomic_write(&self.events_path, json)
    }

    /// Last saved list, or nothing if the file is missing or unreadable.
    pub fn load(&self) -> Vec<Event> {
        if !self.events_path.exists() {
            return vec![];
        }
        match fs::read_to_string(&self.events_path)
            .map_err(anyhow::Error::from)
            .and_then(|json| Ok(serde_json::from_str::<Vec<Event>>(&json)?))
        {
            Ok(events) => events,
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable event cache {}: {}",
                    self.events_path.display(),
                    e
                );
                vec![]
            }
        }
    }

    /// Event list with each flyer reattached by id.
    pub fn load_with_flyers(&self) -> Vec<Event> {
        let mut events = self.load();
        self.attach_flyers(&mut events);
        events
    }

    pub fn attach_flyers(&self, events: &mut [Event]) {
        let flyers = self.load_flyers();
        for event in events.iter_mut() {
            event.flyer_image = flyers.get(&event.id).cloned();
        }
    }

    pub fn load_flyers(&self) -> FlyerMap {
        Self::read_flyers(&self.flyers_path)
    }

    pub fn load_flyer(&self, id: EventId) -> Option<String> {
        self.load_flyers().remove(&id)
    }

    pub fn save_flyer(&self, id: EventId, image: &str) -> Result<()> {
        self.modify_flyers(|flyers| {
            flyers.insert(id, image.to_string());
        })
    }

    pub fn delete_flyer(&self, id: EventId) -> Result<()> {
        self.modify_flyers(|flyers| {
            flyers.remove(&id);
        })
    }

    fn read_flyers(path: &Path) -> FlyerMap {
        if path.exists()
            && let Ok(json) = fs::read_to_string(path)
            && let Ok(flyers) = serde_json::from_str(&json)
        {
            return flyers;
        }
        FlyerMap::new()
    }

    /// Locks -> Loads -> Applies Closure -> Saves -> Unlocks.
    fn modify_flyers<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut FlyerMap),
    {
        let path = &self.flyers_path;
        LocalStorage::with_lock(path, || {
            let mut flyers = Self::read_flyers(path);
            f(&mut flyers);
            LocalStorage::atomic_write(path, serde_json::to_string(&flyers)?)
        })
    }
}

/// Reads an image file into a `data:` URI suitable for the flyer cache.
pub fn data_uri_from_path(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => bail!("Not an image file: {}", path.display()),
    };
    let bytes = fs::read(path).with_context(|| format!("Unable to read {}", path.display()))?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
