use crate::store::{AppState, Change};
use crate::sync::LoadSource;

#[derive(Debug)]
pub enum Action {
    Apply(Change),
    Quit,
}

#[derive(Debug)]
pub enum AppEvent {
    Loaded(AppState, LoadSource),
    Updated(AppState),
    Error(String),
    Status(String),
}
