// File: ./src/store.rs
// Application state container
//
// `reduce` maps a snapshot and a `Change` to the next snapshot plus its effects,
// without touching disk or network. `EventStore` runs those effects: the event
// cache is written before `dispatch` returns, remote writes go through the journal.
use crate::cache::Cache;
use crate::client::RemoteStore;
use crate::journal::{Action, Journal};
use crate::model::catalog::{marketing_task, planning_task};
use crate::model::{Event, EventId, Field, NewEvent};
use crate::sync::{self, LoadReport};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Replaces the whole list, e.g. after the startup load.
    Loaded(Vec<Event>),
    Create(NewEvent, DateTime<Utc>),
    Select(Option<EventId>),
    Update(EventId, Field),
    ToggleMarketing(EventId, String),
    TogglePlanning(EventId, String),
    SetPlanningNote(EventId, String, String),
    SetFlyer(EventId, Option<String>),
    Delete(EventId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Upsert(Event),
    RemoteDelete(EventId),
    SaveFlyer(EventId, String),
    DeleteFlyer(EventId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    events: Vec<Event>,
    selected: Option<EventId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AppState,
    pub effects: Vec<Effect>,
    /// The event list changed and has to be written to the cache.
    pub dirty: bool,
}

impl AppState {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            selected: None,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn selected_id(&self) -> Option<EventId> {
        self.selected
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn reduce(&self, change: Change) -> Result<Transition> {
        let mut next = self.clone();
        let mut effects = Vec::new();
        let mut dirty = true;

        match change {
            Change::Loaded(events) => {
                next.events = events;
                if let Some(id) = next.selected
                    && next.get(id).is_none()
                {
                    next.selected = None;
                }
                // Whoever loaded the list already persisted it.
                dirty = false;
            }
            Change::Create(draft, now) => {
                if draft.name.trim().is_empty() {
                    bail!("An event needs a name");
                }
                let id = next.fresh_id(now.timestamp_millis());
                let created_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
                let event = Event::from_draft(draft, id, created_at);
                if let Some(flyer) = &event.flyer_image {
                    effects.push(Effect::SaveFlyer(id, flyer.clone()));
                }
                effects.push(Effect::Upsert(event.clone()));
                next.events.push(event);
            }
            Change::Select(id) => {
                if let Some(id) = id {
                    self.require(id)?;
                }
                next.selected = id;
                dirty = false;
            }
            Change::Update(id, field) => {
                let event = self.require(id)?.with_field(field);
                effects.push(Effect::Upsert(event.clone()));
                next.replace(event);
            }
            Change::ToggleMarketing(id, task) => {
                marketing_task(&task).with_context(|| format!("Unknown marketing task {}", task))?;
                let mut event = self.require(id)?.clone();
                event.toggle_marketing(&task);
                effects.push(Effect::Upsert(event.clone()));
                next.replace(event);
            }
            Change::TogglePlanning(id, task) => {
                planning_task(&task).with_context(|| format!("Unknown planning task {}", task))?;
                let mut event = self.require(id)?.clone();
                event.toggle_planning(&task);
                effects.push(Effect::Upsert(event.clone()));
                next.replace(event);
            }
            Change::SetPlanningNote(id, task, note) => {
                planning_task(&task).with_context(|| format!("Unknown planning task {}", task))?;
                let mut event = self.require(id)?.clone();
                event.set_planning_note(&task, note);
                effects.push(Effect::Upsert(event.clone()));
                next.replace(event);
            }
            Change::SetFlyer(id, image) => {
                let mut event = self.require(id)?.clone();
                effects.push(match &image {
                    Some(uri) => Effect::SaveFlyer(id, uri.clone()),
                    None => Effect::DeleteFlyer(id),
                });
                event.flyer_image = image;
                next.replace(event);
                // The list cache never holds flyers.
                dirty = false;
            }
            Change::Delete(id) => {
                self.require(id)?;
                next.events.retain(|e| e.id != id);
                if next.selected == Some(id) {
                    next.selected = None;
                }
                effects.push(Effect::DeleteFlyer(id));
                effects.push(Effect::RemoteDelete(id));
            }
        }

        Ok(Transition {
            state: next,
            effects,
            dirty,
        })
    }

    fn require(&self, id: EventId) -> Result<&Event> {
        self.get(id)
            .with_context(|| format!("No event with id {}", id))
    }

    fn replace(&mut self, event: Event) {
        if let Some(slot) = self.events.iter_mut().find(|e| e.id == event.id) {
            *slot = event;
        }
    }

    fn fresh_id(&self, candidate: EventId) -> EventId {
        if self.get(candidate).is_none() {
            return candidate;
        }
        self.events.iter().map(|e| e.id).max().unwrap_or(candidate) + 1
    }
}

/// Owns the live state and runs the effects of every change.
pub struct EventStore {
    state: AppState,
    cache: Cache,
    journal: Journal,
}

impl EventStore {
    pub fn new(state: AppState, cache: Cache, journal: Journal) -> Self {
        Self {
            state,
            cache,
            journal,
        }
    }

    /// Runs the startup load and returns a store holding its result.
    pub async fn open(cache: Cache, remote: Arc<dyn RemoteStore>) -> (Self, LoadReport) {
        let journal = Journal::spawn(remote.clone());
        let report = sync::load(remote.as_ref(), &cache, &journal).await;
        let store = Self::new(AppState::new(report.events.clone()), cache, journal);
        (store, report)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, change: Change) -> Result<&AppState> {
        let Transition {
            state,
            effects,
            dirty,
        } = self.state.reduce(change)?;
        self.state = state;

        if dirty && let Err(e) = self.cache.save(self.state.events()) {
            log::warn!("Unable to write event cache: {:#}", e);
        }

        for effect in effects {
            match effect {
                Effect::SaveFlyer(id, image) => {
                    if let Err(e) = self.cache.save_flyer(id, &image) {
                        log::warn!("Unable to store flyer for event {}: {:#}", id, e);
                    }
                }
                Effect::DeleteFlyer(id) => {
                    if let Err(e) = self.cache.delete_flyer(id) {
                        log::warn!("Unable to remove flyer for event {}: {:#}", id, e);
                    }
                }
                Effect::Upsert(event) => self.journal.push(Action::Upsert(event)),
                Effect::RemoteDelete(id) => self.journal.push(Action::Delete(id)),
            }
        }
        Ok(&self.state)
    }

    /// Flushes pending remote writes.
    pub async fn close(self) {
        self.journal.close().await;
    }
}
