// File: ./src/model/mod.rs
// Aggregates the split model files
pub mod adapter;
pub mod catalog;
pub mod item;
pub mod parser;

// Re-export types so callers can use `crate::model::Event`
pub use catalog::{MARKETING_TASKS, MarketingTask, PLANNING_TASKS, PlanningTask};
pub use item::{Checklist, Event, EventId, Field, NewEvent, PlanningChecklist, PlanningEntry};
