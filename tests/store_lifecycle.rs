mod common;

use chrono::{TimeZone, Utc};
use common::MockRemote;
use marquee::cache::Cache;
use marquee::model::{Field, NewEvent};
use marquee::store::{Change, EventStore};
use marquee::sync::LoadSource;
use std::sync::Arc;

fn cache_in(dir: &tempfile::TempDir) -> Cache {
    Cache::new(dir.path(), "nsh-events", "nsh-flyers").unwrap()
}

fn draft(name: &str) -> NewEvent {
    NewEvent {
        name: name.into(),
        date: "2025-10-31".into(),
        time: "2:30 PM".into(),
        target_attendance: "80".into(),
        flyer_image: Some("data:image/png;base64,AAAA".into()),
        ..NewEvent::default()
    }
}

#[tokio::test]
async fn delete_purges_everywhere_and_stays_deleted() {
    common::init_logs();
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MockRemote::default());

    let (mut store, report) = EventStore::open(cache_in(&dir), remote.clone()).await;
    assert_eq!(report.source, LoadSource::Remote);
    assert!(store.state().events().is_empty());

    let now = Utc.timestamp_millis_opt(1_750_000_000_000).unwrap();
    store.dispatch(Change::Create(draft("Harvest Dance"), now)).unwrap();
    let id = store.state().events()[0].id;
    assert_eq!(store.state().events()[0].time, "14:30");

    let cache = cache_in(&dir);
    assert_eq!(cache.load().len(), 1);
    assert!(cache.load_flyer(id).is_some());

    store.dispatch(Change::Select(Some(id))).unwrap();
    store.dispatch(Change::Delete(id)).unwrap();
    assert!(store.state().events().is_empty());
    assert_eq!(store.state().selected_id(), None);
    assert!(cache.load().is_empty());
    assert_eq!(cache.load_flyer(id), None);
    store.close().await;

    assert_eq!(remote.deletes(), vec![id]);
    assert_eq!(remote.upserts().len(), 1);
    assert!(remote.upserts()[0].planning_checklist.is_empty());

    // Nothing comes back on the next start, online or offline.
    let (reopened, _) = EventStore::open(cache_in(&dir), remote.clone()).await;
    assert!(reopened.state().events().is_empty());
    reopened.close().await;

    let (offline, report) =
        EventStore::open(cache_in(&dir), Arc::new(MockRemote::unreachable())).await;
    assert_eq!(report.source, LoadSource::Cache);
    assert!(offline.state().events().is_empty());
    offline.close().await;
}

#[tokio::test]
async fn date_and_tbd_never_both_or_neither() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MockRemote::default());
    let (mut store, _) = EventStore::open(cache_in(&dir), remote.clone()).await;

    let now = Utc.timestamp_millis_opt(1_750_000_000_000).unwrap();
    store.dispatch(Change::Create(draft("Jazz"), now)).unwrap();
    let id = store.state().events()[0].id;

    let edits = [
        Field::Tbd(true),
        Field::Tbd(false),
        Field::Date("11/02/2025".into()),
        Field::Date("someday".into()),
        Field::Date("2025-12-24".into()),
        Field::Tbd(false),
    ];
    for field in edits {
        let state = store.dispatch(Change::Update(id, field)).unwrap();
        let e = state.get(id).unwrap();
        assert_eq!(e.date.is_empty(), e.is_tbd, "date={:?} tbd={}", e.date, e.is_tbd);
    }
    let e = store.state().get(id).unwrap();
    assert_eq!(e.date, "2025-12-24");
    assert!(!e.is_tbd);
    store.close().await;

    // Every edit went out as a whole record, in order.
    let sent = remote.upserts();
    assert_eq!(sent.len(), 7);
    assert_eq!(sent.last().unwrap().date, "2025-12-24");
}

#[tokio::test]
async fn edits_survive_restart_with_flyers_reattached() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MockRemote::default());
    let (mut store, _) = EventStore::open(cache_in(&dir), remote.clone()).await;

    let now = Utc.timestamp_millis_opt(1_750_000_000_000).unwrap();
    store.dispatch(Change::Create(draft("Open Mic"), now)).unwrap();
    let id = store.state().events()[0].id;
    store
        .dispatch(Change::ToggleMarketing(id, "press-release".into()))
        .unwrap();
    store
        .dispatch(Change::SetPlanningNote(id, "catering".into(), "tacos".into()))
        .unwrap();
    store
        .dispatch(Change::Update(id, Field::CurrentRsvps("12".into())))
        .unwrap();
    let before = store.state().get(id).unwrap().clone();
    store.close().await;

    let (reopened, _) = EventStore::open(cache_in(&dir), remote.clone()).await;
    let after = reopened.state().get(id).unwrap();
    assert_eq!(after, &before);
    assert_eq!(after.flyer_image.as_deref(), Some("data:image/png;base64,AAAA"));
    reopened.close().await;
}
