// File: ./src/sync.rs
// Startup reconciliation between the remote sheet and the local cache
//
// The remote list decides which events exist. The local cache fills in what
// the sheet cannot carry: flyers always, planning data when the sheet has none.
use crate::cache::Cache;
use crate::client::{REMOTE_TIMEOUT, RemoteStore, call_with_timeout};
use crate::journal::{Action, Journal};
use crate::model::parser::{normalize_date, normalize_time};
use crate::model::{Event, EventId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    /// The remote could not be reached; the last cache is served as-is.
    Cache,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub events: Vec<Event>,
    pub source: LoadSource,
    /// Events whose planning data was restored from the cache and re-sent.
    pub repaired: Vec<EventId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    pub events: Vec<Event>,
    /// Merged records the remote must be told about again.
    pub reupserts: Vec<Event>,
}

/// Merges the remote list with the cached list and flyer images.
pub fn reconcile(
    remote: Vec<Event>,
    cached: &[Event],
    flyers: &BTreeMap<EventId, String>,
) -> Reconciled {
    let cached_by_id: HashMap<EventId, &Event> = cached.iter().map(|e| (e.id, e)).collect();
    let mut seen = HashSet::new();
    let mut merged = Reconciled::default();

    for mut event in remote {
        if !seen.insert(event.id) {
            log::warn!("Remote returned event {} twice, keeping the first", event.id);
            continue;
        }

        event.date = normalize_date(&event.date);
        event.time = normalize_time(&event.time);
        event.set_tbd(event.is_tbd);

        let cached = cached_by_id.get(&event.id);
        let mut restored = false;
        if let Some(local) = cached {
            if event.planning_checklist.is_empty() && !local.planning_checklist.is_empty() {
                log::debug!("Restoring cached planning data for event {}", event.id);
                event.planning_checklist = local.planning_checklist.clone();
                restored = true;
            }
            if event.planning_notes.trim().is_empty() {
                event.planning_notes = local.planning_notes.clone();
            }
        }
        event.flyer_image = flyers.get(&event.id).cloned();

        if restored {
            merged.reupserts.push(event.clone());
        }
        merged.events.push(event);
    }

    let dropped = cached.iter().filter(|e| !seen.contains(&e.id)).count();
    if dropped > 0 {
        log::debug!("{} cached events are no longer on the remote", dropped);
    }
    merged
}

/// Fetches the remote list, reconciles it and re-persists the result.
/// Falls back to the cache untouched if the fetch fails or stalls.
pub async fn load(remote: &dyn RemoteStore, cache: &Cache, journal: &Journal) -> LoadReport {
    load_within(remote, cache, journal, REMOTE_TIMEOUT).await
}

pub async fn load_within(
    remote: &dyn RemoteStore,
    cache: &Cache,
    journal: &Journal,
    limit: Duration,
) -> LoadReport {
    let remote_events = match call_with_timeout(limit, remote.list()).await {
        Ok(events) => events,
        Err(e) => {
            log::warn!("Remote list failed, using cached events: {:#}", e);
            return LoadReport {
                events: cache.load_with_flyers(),
                source: LoadSource::Cache,
                repaired: vec![],
            };
        }
    };

    let cached = cache.load();
    let merged = reconcile(remote_events, &cached, &cache.load_flyers());
    if let Err(e) = cache.save(&merged.events) {
        log::warn!("Unable to write event cache: {:#}", e);
    }

    let repaired = merged.reupserts.iter().map(|e| e.id).collect();
    for event in merged.reupserts {
        journal.push(Action::Upsert(event));
    }

    LoadReport {
        events: merged.events,
        source: LoadSource::Remote,
        repaired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlanningEntry;

    fn remote_row(id: EventId) -> Event {
        Event {
            id,
            name: format!("row {}", id),
            date: "10/31/2025".into(),
            time: "7:00 PM".into(),
            ..Event::default()
        }
    }

    #[test]
    fn remote_decides_membership() {
        let cached = vec![remote_row(1), remote_row(2)];
        let merged = reconcile(vec![remote_row(2)], &cached, &BTreeMap::new());
        assert_eq!(merged.events.len(), 1);
        assert_eq!(merged.events[0].id, 2);
    }

    #[test]
    fn dates_and_times_are_normalized() {
        let merged = reconcile(vec![remote_row(1)], &[], &BTreeMap::new());
        let e = &merged.events[0];
        assert_eq!(e.date, "2025-10-31");
        assert_eq!(e.time, "19:00");
        assert!(!e.is_tbd);
    }

    #[test]
    fn remote_planning_wins_when_present() {
        let mut local = remote_row(1);
        local
            .planning_checklist
            .insert("catering".into(), PlanningEntry { done: true, note: "old".into() });
        let mut row = remote_row(1);
        row.planning_checklist
            .insert("parking".into(), PlanningEntry { done: true, note: String::new() });

        let merged = reconcile(vec![row], &[local], &BTreeMap::new());
        assert!(merged.reupserts.is_empty());
        assert!(merged.events[0].planning_checklist.contains_key("parking"));
        assert!(!merged.events[0].planning_checklist.contains_key("catering"));
    }

    #[test]
    fn planning_notes_fall_back_and_flyers_attach() {
        let mut local = remote_row(4);
        local.planning_notes = "load-in at 3".into();
        let flyers = BTreeMap::from([(4, "data:image/png;base64,AAAA".to_string())]);

        let merged = reconcile(vec![remote_row(4)], &[local], &flyers);
        let e = &merged.events[0];
        assert_eq!(e.planning_notes, "load-in at 3");
        assert_eq!(e.flyer_image.as_deref(), Some("data:image/png;base64,AAAA"));
        // Notes alone do not trigger a re-send.
        assert!(merged.reupserts.is_empty());
    }

    #[test]
    fn duplicate_remote_rows_are_collapsed() {
        let merged = reconcile(vec![remote_row(1), remote_row(1)], &[], &BTreeMap::new());
        assert_eq!(merged.events.len(), 1);
    }
}
