// File: ./src/journal.rs
use crate::client::{REMOTE_TIMEOUT, RemoteStore, call_with_timeout};
use crate::model::{Event, EventId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Upsert(Event),
    Delete(EventId),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Upsert(event) => write!(f, "upsert of event {}", event.id),
            Action::Delete(id) => write!(f, "delete of event {}", id),
        }
    }
}

/// Outbox for remote writes.
///
/// `push` never waits on the network. A single worker sends actions in the
/// order they were pushed, so a later edit cannot be overtaken by an earlier
/// one. A failed or timed-out action is logged and dropped; nothing is retried.
pub struct Journal {
    queue: mpsc::UnboundedSender<Action>,
    worker: JoinHandle<()>,
}

impl Journal {
    /// Must be called from within a tokio runtime.
    pub fn spawn(remote: Arc<dyn RemoteStore>) -> Self {
        Self::spawn_with_timeout(remote, REMOTE_TIMEOUT)
    }

    /// Same as `spawn`, with `limit` bounding each remote call.
    pub fn spawn_with_timeout(remote: Arc<dyn RemoteStore>, limit: Duration) -> Self {
        let (queue, mut pending) = mpsc::unbounded_channel::<Action>();
        let worker = tokio::spawn(async move {
            while let Some(action) = pending.recv().await {
                let call = async {
                    match &action {
                        Action::Upsert(event) => remote.upsert(event).await,
                        Action::Delete(id) => remote.delete(*id).await,
                    }
                };
                let result = call_with_timeout(limit, call).await;
                match result {
                    Ok(()) => log::debug!("Remote {} done", action),
                    Err(e) => log::warn!("Dropping remote {}: {:#}", action, e),
                }
            }
        });
        Self { queue, worker }
    }

    pub fn push(&self, action: Action) {
        if let Err(e) = self.queue.send(action) {
            log::warn!("Journal worker is gone, dropping remote {}", e.0);
        }
    }

    /// Stops accepting actions and waits until everything queued has been sent (or failed).
    pub async fn close(self) {
        drop(self.queue);
        if let Err(e) = self.worker.await {
            log::error!("Journal worker panicked: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RemoteStore for Recorder {
        async fn list(&self) -> Result<Vec<Event>> {
            Ok(vec![])
        }
        async fn upsert(&self, event: &Event) -> Result<()> {
            if event.name == "fail" {
                bail!("boom");
            }
            if event.name == "hang" {
                std::future::pending::<()>().await;
            }
            self.seen.lock().unwrap().push(format!("up:{}", event.name));
            Ok(())
        }
        async fn delete(&self, id: EventId) -> Result<()> {
            self.seen.lock().unwrap().push(format!("del:{}", id));
            Ok(())
        }
    }

    fn named(name: &str) -> Event {
        Event {
            id: 1,
            name: name.to_string(),
            ..Event::default()
        }
    }

    #[tokio::test]
    async fn actions_reach_remote_in_order() {
        let remote = Arc::new(Recorder::default());
        let journal = Journal::spawn(remote.clone());
        journal.push(Action::Upsert(named("a")));
        journal.push(Action::Upsert(named("fail")));
        journal.push(Action::Upsert(named("b")));
        journal.push(Action::Delete(1));
        journal.close().await;

        let seen = remote.seen.lock().unwrap().clone();
        assert_eq!(seen, vec!["up:a", "up:b", "del:1"]);
    }

    #[tokio::test]
    async fn stalled_call_does_not_block_later_actions() {
        let remote = Arc::new(Recorder::default());
        let journal = Journal::spawn_with_timeout(remote.clone(), Duration::from_millis(50));
        journal.push(Action::Upsert(named("hang")));
        journal.push(Action::Upsert(named("later")));
        journal.push(Action::Delete(3));

        tokio::time::timeout(Duration::from_secs(5), journal.close())
            .await
            .expect("journal should drain past a stalled call");

        let seen = remote.seen.lock().unwrap().clone();
        assert_eq!(seen, vec!["up:later", "del:3"]);
    }
}
