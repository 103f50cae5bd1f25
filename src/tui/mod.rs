pub mod action;
pub mod state;
pub mod view;

use crate::cache::{Cache, data_uri_from_path};
use crate::client::{RemoteClient, RemoteStore};
use crate::config::Config;
use crate::model::{Field, NewEvent};
use crate::storage::LocalStorage;
use crate::store::{Change, EventStore};
use crate::sync::LoadSource;
use action::{Action, AppEvent};
use anyhow::Result;
use chrono::{Local, Utc};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use state::{Focus, InputMode, UiState};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use std::{io, time::Duration};
use tokio::sync::mpsc;

const LOG_FILE: &str = "marquee.log";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Logs go to a file in the data directory; stderr would scribble over the UI.
fn init_logging(dir: &Path) {
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
    else {
        return;
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn remote_from_config(config: &Config) -> Arc<dyn RemoteStore> {
    match RemoteClient::from_config(config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::error!("Remote disabled: {:#}", e);
            Arc::new(RemoteClient::offline())
        }
    }
}

pub async fn run() -> Result<()> {
    let config = Config::load()?;
    let data_dir = config.data_dir()?;
    LocalStorage::ensure_dir(&data_dir)?;
    init_logging(&data_dir);

    let panic_log = data_dir.join("marquee_panic.log");
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        use std::io::Write;
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&panic_log) {
            let _ = writeln!(file, "PANIC: {:?}", info);
        }
        default_hook(info);
    }));

    let cache = Cache::from_config(&config)?;
    let remote = remote_from_config(&config);
    if config.is_offline() {
        log::info!("No endpoint configured, working from the local cache only");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut ui = UiState::new();
    let (action_tx, mut action_rx) = mpsc::channel::<Action>(32);
    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(32);

    // The store lives on this task; the UI only ever sees snapshots.
    let actor = tokio::spawn(async move {
        let (mut store, report) = EventStore::open(cache, remote).await;
        if !report.repaired.is_empty() {
            let _ = event_tx
                .send(AppEvent::Status(format!(
                    "Restored planning data for {} event(s)",
                    report.repaired.len()
                )))
                .await;
        }
        let _ = event_tx
            .send(AppEvent::Loaded(store.state().clone(), report.source))
            .await;

        while let Some(action) = action_rx.recv().await {
            match action {
                Action::Quit => break,
                Action::Apply(change) => match store.dispatch(change) {
                    Ok(snapshot) => {
                        let _ = event_tx.send(AppEvent::Updated(snapshot.clone())).await;
                    }
                    Err(e) => {
                        let _ = event_tx.send(AppEvent::Error(format!("{:#}", e))).await;
                    }
                },
            }
        }
        store.close().await;
    });

    loop {
        let now = Local::now().naive_local();
        terminal.draw(|f| view::draw(f, &mut ui, now))?;

        if let Ok(event) = event_rx.try_recv() {
            match event {
                AppEvent::Loaded(snapshot, source) => {
                    ui.set_snapshot(snapshot);
                    ui.loading = false;
                    ui.message = match source {
                        LoadSource::Remote => format!("Events: {}", ui.view_indices.len()),
                        LoadSource::Cache => {
                            format!("Offline: {} cached events", ui.view_indices.len())
                        }
                    };
                }
                AppEvent::Updated(snapshot) => ui.set_snapshot(snapshot),
                AppEvent::Error(msg) => ui.message = format!("Error: {}", msg),
                AppEvent::Status(msg) => ui.message = msg,
            }
        }

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            Event::Mouse(mouse_event) => match mouse_event.kind {
                MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                    if let Some(change) = handle_scroll(&mut ui, mouse_event.kind) {
                        let _ = action_tx.send(Action::Apply(change)).await;
                    }
                }
                _ => {}
            },
            Event::Key(key) if ui.mode != InputMode::Normal => match key.code {
                KeyCode::Enter => {
                    if let Some(change) = submit_input(&mut ui) {
                        let _ = action_tx.send(Action::Apply(change)).await;
                    }
                    ui.mode = InputMode::Normal;
                    ui.reset_input();
                }
                KeyCode::Esc => {
                    ui.mode = InputMode::Normal;
                    ui.reset_input();
                }
                KeyCode::Char(c) => ui.enter_char(c),
                KeyCode::Backspace => ui.delete_char(),
                KeyCode::Left => ui.move_cursor_left(),
                KeyCode::Right => ui.move_cursor_right(),
                _ => {}
            },
            Event::Key(key) => {
                if key.code == KeyCode::Char('q') {
                    let _ = action_tx.send(Action::Quit).await;
                    break;
                }
                if let Some(change) = handle_key(&mut ui, key.code) {
                    let _ = action_tx.send(Action::Apply(change)).await;
                }
            }
            _ => {}
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if tokio::time::timeout(SHUTDOWN_GRACE, actor).await.is_err() {
        log::warn!("Gave up waiting for pending remote writes");
    }
    Ok(())
}

/// Normal-mode keys. Returns the change to dispatch, if any.
fn handle_key(ui: &mut UiState, code: KeyCode) -> Option<Change> {
    match code {
        KeyCode::Tab => {
            ui.toggle_focus();
            return None;
        }
        KeyCode::Esc => {
            ui.active_focus = Focus::Events;
            return None;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            ui.next();
            return ui.selection_change();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            ui.previous();
            return ui.selection_change();
        }
        KeyCode::PageDown => {
            ui.jump_forward(10);
            return ui.selection_change();
        }
        KeyCode::PageUp => {
            ui.jump_backward(10);
            return ui.selection_change();
        }
        KeyCode::Char('a') => {
            ui.begin_input(InputMode::Creating, "");
            return None;
        }
        KeyCode::Char('L') => {
            ui.cycle_suggestion_level();
            return None;
        }
        KeyCode::Char('?') => {
            ui.show_field_help = !ui.show_field_help;
            return None;
        }
        _ => {}
    }

    let event = ui.highlighted()?.clone();
    let id = event.id;
    match (ui.active_focus, code) {
        (Focus::Marketing, KeyCode::Char(' ')) => {
            let task = ui.highlighted_marketing_task()?;
            Some(Change::ToggleMarketing(id, task.to_string()))
        }
        (Focus::Planning, KeyCode::Char(' ')) => {
            let task = ui.highlighted_planning_task()?;
            Some(Change::TogglePlanning(id, task.to_string()))
        }
        (Focus::Planning, KeyCode::Char('e')) => {
            let task = ui.highlighted_planning_task()?;
            let note = event.planning_entry(task).map(|e| e.note.clone()).unwrap_or_default();
            ui.begin_input(InputMode::PlanningNote, &note);
            None
        }
        (_, KeyCode::Char('F')) => Some(Change::SetFlyer(id, None)),
        // Clearing TBD needs a date, so ask for one instead of writing a no-op.
        (_, KeyCode::Char('u')) if event.is_tbd && event.date.trim().is_empty() => {
            ui.begin_input(InputMode::Date, "");
            ui.message = "Enter a date to clear TBD".to_string();
            None
        }
        (_, KeyCode::Char('u')) => Some(Change::Update(id, Field::Tbd(!event.is_tbd))),
        (Focus::Events, KeyCode::Char('x')) => Some(Change::Delete(id)),
        (_, KeyCode::Char(c)) => {
            let mode = InputMode::for_key(c)?;
            ui.begin_input(mode, mode.current(&event));
            None
        }
        _ => None,
    }
}

/// Mouse wheel moves the focused list the same way `j`/`k` do.
fn handle_scroll(ui: &mut UiState, kind: MouseEventKind) -> Option<Change> {
    match kind {
        MouseEventKind::ScrollDown => ui.next(),
        MouseEventKind::ScrollUp => ui.previous(),
        _ => return None,
    }
    ui.selection_change()
}

/// Turns the finished input line into a change for the highlighted event.
fn submit_input(ui: &mut UiState) -> Option<Change> {
    let value = ui.input_buffer.clone();
    if ui.mode == InputMode::Creating {
        if value.trim().is_empty() {
            ui.message = "An event needs a name".to_string();
            return None;
        }
        let draft = NewEvent {
            name: value,
            is_tbd: true,
            ..NewEvent::default()
        };
        return Some(Change::Create(draft, Utc::now()));
    }

    let id = ui.highlighted_id()?;
    match ui.mode {
        InputMode::PlanningNote => {
            let task = ui.highlighted_planning_task()?;
            Some(Change::SetPlanningNote(id, task.to_string(), value))
        }
        InputMode::FlyerPath => match data_uri_from_path(Path::new(value.trim())) {
            Ok(uri) => Some(Change::SetFlyer(id, Some(uri))),
            Err(e) => {
                ui.message = format!("Error: {:#}", e);
                None
            }
        },
        InputMode::Name if value.trim().is_empty() => {
            ui.message = "An event needs a name".to_string();
            None
        }
        mode => mode.field(value).map(|field| Change::Update(id, field)),
    }
}
