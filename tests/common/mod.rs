#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use marquee::client::RemoteStore;
use marquee::model::{Event, EventId};
use std::sync::Mutex;

/// In-memory endpoint that records every write it receives.
#[derive(Default)]
pub struct MockRemote {
    pub rows: Mutex<Vec<Event>>,
    pub upserts: Mutex<Vec<Event>>,
    pub deletes: Mutex<Vec<EventId>>,
    pub fail_list: bool,
    pub stall_list: bool,
}

impl MockRemote {
    pub fn with_rows(rows: Vec<Event>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_list: true,
            ..Self::default()
        }
    }

    /// `list` never answers.
    pub fn stalled() -> Self {
        Self {
            stall_list: true,
            ..Self::default()
        }
    }

    pub fn upserts(&self) -> Vec<Event> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<EventId> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn list(&self) -> Result<Vec<Event>> {
        if self.fail_list {
            bail!("connection refused");
        }
        if self.stall_list {
            std::future::pending::<()>().await;
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn upsert(&self, event: &Event) -> Result<()> {
        self.upserts.lock().unwrap().push(event.clone());
        let mut stored = event.clone();
        stored.flyer_image = None;
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| r.id != event.id);
        rows.push(stored);
        Ok(())
    }

    async fn delete(&self, id: EventId) -> Result<()> {
        self.deletes.lock().unwrap().push(id);
        self.rows.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }
}

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn row(id: EventId, name: &str) -> Event {
    Event {
        id,
        name: name.to_string(),
        date: "2025-10-31".into(),
        time: "19:00".into(),
        ..Event::default()
    }
}
