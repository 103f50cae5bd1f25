// File: ./src/model/item.rs
use crate::model::parser::{normalize_date, normalize_time};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Numeric identity assigned at creation time (milliseconds since the epoch).
pub type EventId = i64;

/// Marketing task id -> done.
pub type Checklist = BTreeMap<String, bool>;
/// Planning task id -> status and note.
pub type PlanningChecklist = BTreeMap<String, PlanningEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningEntry {
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub note: String,
}

/// One venue event. This is also the on-disk shape of the local event cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub date: String,
    #[serde(rename = "isTBD")]
    pub is_tbd: bool,
    pub time: String,

    // Kept as typed in; parsed at display time.
    pub target_attendance: String,
    #[serde(rename = "currentRSVPs")]
    pub current_rsvps: String,
    pub post_event_attendance: String,

    pub goals: String,
    pub outcomes: String,
    pub advertising: String,
    pub volunteers: String,
    pub total_spent: String,
    pub total_earned: String,
    pub notes: String,
    pub post_event_notes: String,
    pub planning_notes: String,

    /// Lives in the flyer cache only.
    #[serde(skip)]
    pub flyer_image: Option<String>,

    pub checklist: Checklist,
    pub planning_checklist: PlanningChecklist,
    pub created_at: String,
}

/// Values the creation form collects. `id` and `createdAt` are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub date: String,
    pub is_tbd: bool,
    pub time: String,
    pub target_attendance: String,
    pub current_rsvps: String,
    pub goals: String,
    pub notes: String,
    pub flyer_image: Option<String>,
}

/// A single field edit. Applying one always yields a whole new record.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Name(String),
    Date(String),
    Tbd(bool),
    Time(String),
    TargetAttendance(String),
    CurrentRsvps(String),
    PostEventAttendance(String),
    Goals(String),
    Outcomes(String),
    Advertising(String),
    Volunteers(String),
    TotalSpent(String),
    TotalEarned(String),
    Notes(String),
    PostEventNotes(String),
    PlanningNotes(String),
}

impl Event {
    pub fn from_draft(draft: NewEvent, id: EventId, created_at: String) -> Self {
        let mut event = Event {
            id,
            name: draft.name.trim().to_string(),
            time: normalize_time(&draft.time),
            target_attendance: draft.target_attendance,
            current_rsvps: draft.current_rsvps,
            goals: draft.goals,
            notes: draft.notes,
            flyer_image: draft.flyer_image,
            created_at,
            ..Event::default()
        };
        if draft.is_tbd {
            event.set_tbd(true);
        } else {
            event.set_date(&draft.date);
        }
        event
    }

    /// Exactly one of "has a date" / "is TBD" holds afterwards.
    pub fn set_date(&mut self, raw: &str) {
        self.date = normalize_date(raw);
        self.is_tbd = self.date.is_empty();
    }

    /// Unsetting TBD without a date on file keeps the event TBD.
    pub fn set_tbd(&mut self, tbd: bool) {
        if tbd {
            self.date.clear();
            self.is_tbd = true;
        } else {
            self.is_tbd = self.date.is_empty();
        }
    }

    pub fn with_field(&self, field: Field) -> Event {
        let mut next = self.clone();
        match field {
            Field::Name(v) => next.name = v,
            Field::Date(v) => next.set_date(&v),
            Field::Tbd(v) => next.set_tbd(v),
            Field::Time(v) => next.time = normalize_time(&v),
            Field::TargetAttendance(v) => next.target_attendance = v,
            Field::CurrentRsvps(v) => next.current_rsvps = v,
            Field::PostEventAttendance(v) => next.post_event_attendance = v,
            Field::Goals(v) => next.goals = v,
            Field::Outcomes(v) => next.outcomes = v,
            Field::Advertising(v) => next.advertising = v,
            Field::Volunteers(v) => next.volunteers = v,
            Field::TotalSpent(v) => next.total_spent = v,
            Field::TotalEarned(v) => next.total_earned = v,
            Field::Notes(v) => next.notes = v,
            Field::PostEventNotes(v) => next.post_event_notes = v,
            Field::PlanningNotes(v) => next.planning_notes = v,
        }
        next
    }

    pub fn is_marketing_done(&self, task_id: &str) -> bool {
        self.checklist.get(task_id).copied().unwrap_or(false)
    }

    pub fn planning_entry(&self, task_id: &str) -> Option<&PlanningEntry> {
        self.planning_checklist.get(task_id)
    }

    pub fn toggle_marketing(&mut self, task_id: &str) {
        let done = !self.is_marketing_done(task_id);
        self.checklist.insert(task_id.to_string(), done);
    }

    pub fn toggle_planning(&mut self, task_id: &str) {
        let entry = self.planning_checklist.entry(task_id.to_string()).or_default();
        entry.done = !entry.done;
    }

    pub fn set_planning_note(&mut self, task_id: &str, note: String) {
        self.planning_checklist
            .entry(task_id.to_string())
            .or_default()
            .note = note;
    }
}
