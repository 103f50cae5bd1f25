// File: ./src/model/adapter.rs
// Handles the remote sheet's wire format
//
// The sheet is flat: numbers may come back as numbers, booleans as "TRUE",
// and both checklists as JSON text. Everything is folded into one canonical
// `Event` here so nothing past this module sees the variance.
use crate::model::item::{Checklist, Event, EventId, PlanningChecklist, PlanningEntry};
use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `POST` body sent to the endpoint.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RemoteRequest {
    Upsert { event: Value },
    Delete { id: EventId },
}

#[derive(Debug, Default, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub events: Vec<Value>,
}

/// One row as the endpoint returns it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteRecord {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<EventId>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "isTBD", deserialize_with = "lenient_bool")]
    pub is_tbd: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(deserialize_with = "lenient_string")]
    pub target_attendance: String,
    #[serde(rename = "currentRSVPs", deserialize_with = "lenient_string")]
    pub current_rsvps: String,
    #[serde(deserialize_with = "lenient_string")]
    pub post_event_attendance: String,
    #[serde(deserialize_with = "lenient_string")]
    pub goals: String,
    #[serde(deserialize_with = "lenient_string")]
    pub outcomes: String,
    #[serde(deserialize_with = "lenient_string")]
    pub advertising: String,
    #[serde(deserialize_with = "lenient_string")]
    pub volunteers: String,
    #[serde(deserialize_with = "lenient_string")]
    pub total_spent: String,
    #[serde(deserialize_with = "lenient_string")]
    pub total_earned: String,
    #[serde(deserialize_with = "lenient_string")]
    pub notes: String,
    #[serde(deserialize_with = "lenient_string")]
    pub post_event_notes: String,
    #[serde(deserialize_with = "lenient_string")]
    pub planning_notes: String,
    pub checklist: Value,
    pub planning_checklist: Value,
    #[serde(deserialize_with = "lenient_string")]
    pub created_at: String,
}

impl RemoteRecord {
    /// Rows without a usable id are dropped.
    pub fn into_event(self) -> Option<Event> {
        let id = self.id?;
        Some(Event {
            id,
            name: self.name,
            date: self.date,
            is_tbd: self.is_tbd,
            time: self.time,
            target_attendance: self.target_attendance,
            current_rsvps: self.current_rsvps,
            post_event_attendance: self.post_event_attendance,
            goals: self.goals,
            outcomes: self.outcomes,
            advertising: self.advertising,
            volunteers: self.volunteers,
            total_spent: self.total_spent,
            total_earned: self.total_earned,
            notes: self.notes,
            post_event_notes: self.post_event_notes,
            planning_notes: self.planning_notes,
            flyer_image: None,
            checklist: decode_checklist(self.checklist),
            planning_checklist: decode_planning_checklist(self.planning_checklist),
            created_at: self.created_at,
        })
    }
}

/// Decodes every row of a `list` response, skipping (and logging) the unusable ones.
pub fn events_from_response(body: &[u8]) -> Result<Vec<Event>> {
    let response: ListResponse = serde_json::from_slice(body)?;
    let mut events = Vec::with_capacity(response.events.len());
    for row in response.events {
        match serde_json::from_value::<RemoteRecord>(row) {
            Ok(record) => match record.into_event() {
                Some(event) => events.push(event),
                None => log::warn!("Skipping remote row without an id"),
            },
            Err(e) => log::warn!("Skipping unreadable remote row: {}", e),
        }
    }
    Ok(events)
}

/// The event as the remote stores it: checklists as JSON text, no flyer.
pub fn to_remote_value(event: &Event) -> Result<Value> {
    let mut value = serde_json::to_value(event)?;
    if let Value::Object(map) = &mut value {
        map.remove("flyerImage");
        map.insert(
            "checklist".to_string(),
            Value::String(serde_json::to_string(&event.checklist)?),
        );
        map.insert(
            "planningChecklist".to_string(),
            Value::String(serde_json::to_string(&event.planning_checklist)?),
        );
    }
    Ok(value)
}

pub fn decode_checklist(value: Value) -> Checklist {
    expand_object(value)
        .map(|map| map.into_iter().map(|(k, v)| (k, truthy(&v))).collect())
        .unwrap_or_default()
}

pub fn decode_planning_checklist(value: Value) -> PlanningChecklist {
    expand_object(value)
        .map(|map| {
            map.into_iter()
                .map(|(k, v)| {
                    let entry = match v {
                        Value::Object(o) => PlanningEntry {
                            done: o.get("done").map(truthy).unwrap_or(false),
                            note: o.get("note").map(text_of).unwrap_or_default(),
                        },
                        other => PlanningEntry {
                            done: truthy(&other),
                            note: String::new(),
                        },
                    };
                    (k, entry)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn expand_object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => Some(map),
            _ => {
                log::warn!("Ignoring checklist that is not a JSON object: {:?}", s);
                None
            }
        },
        _ => None,
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1" | "x"
        ),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

fn text_of(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(text_of(&Value::deserialize(d)?))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(truthy(&Value::deserialize(d)?))
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<EventId>, D::Error> {
    let id = match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    };
    Ok(id)
}
