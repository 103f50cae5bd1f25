use crate::metrics::SuggestionLevel;
use crate::model::{Event, EventId, Field, MARKETING_TASKS, PLANNING_TASKS};
use crate::store::{self, Change};
use ratatui::widgets::ListState;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Focus {
    Events,
    Marketing,
    Planning,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum InputMode {
    Normal,
    Creating,
    Name,
    Date,
    Time,
    Rsvps,
    Target,
    Goals,
    Advertising,
    Volunteers,
    Notes,
    PlanningNotes,
    PostEventAttendance,
    Outcomes,
    TotalSpent,
    TotalEarned,
    PostEventNotes,
    PlanningNote,
    FlyerPath,
}

impl InputMode {
    pub fn prompt(&self) -> (&'static str, &'static str) {
        match self {
            InputMode::Creating => (" New Event ", "> "),
            InputMode::Name => (" Event Name ", "> "),
            InputMode::Date => (" Date (YYYY-MM-DD, MM/DD/YYYY, empty = TBD) ", "> "),
            InputMode::Time => (" Time (14:30 or 2:30 PM) ", "> "),
            InputMode::Rsvps => (" Current RSVPs ", "# "),
            InputMode::Target => (" Target Attendance ", "# "),
            InputMode::Goals => (" Goals ", "> "),
            InputMode::Advertising => (" Advertising ", "> "),
            InputMode::Volunteers => (" Volunteers ", "> "),
            InputMode::Notes => (" Notes ", "> "),
            InputMode::PlanningNotes => (" Planning Notes ", "> "),
            InputMode::PostEventAttendance => (" Actual Attendance ", "# "),
            InputMode::Outcomes => (" Outcomes ", "> "),
            InputMode::TotalSpent => (" Total Spent ", "$ "),
            InputMode::TotalEarned => (" Total Earned ", "$ "),
            InputMode::PostEventNotes => (" Reflection Notes ", "> "),
            InputMode::PlanningNote => (" Planning Note ", "> "),
            InputMode::FlyerPath => (" Flyer Image Path ", "> "),
            InputMode::Normal => ("", ""),
        }
    }

    /// Normal-mode key that opens a prompt for one event field.
    pub fn for_key(c: char) -> Option<Self> {
        Some(match c {
            'N' => InputMode::Name,
            'D' => InputMode::Date,
            'T' => InputMode::Time,
            'r' => InputMode::Rsvps,
            'g' => InputMode::Target,
            'G' => InputMode::Goals,
            'A' => InputMode::Advertising,
            'V' => InputMode::Volunteers,
            'n' => InputMode::Notes,
            'P' => InputMode::PlanningNotes,
            'p' => InputMode::PostEventAttendance,
            'O' => InputMode::Outcomes,
            '$' => InputMode::TotalSpent,
            'E' => InputMode::TotalEarned,
            'R' => InputMode::PostEventNotes,
            'f' => InputMode::FlyerPath,
            _ => return None,
        })
    }

    /// Value the prompt starts with.
    pub fn current<'a>(&self, event: &'a Event) -> &'a str {
        match self {
            InputMode::Name => &event.name,
            InputMode::Date => &event.date,
            InputMode::Time => &event.time,
            InputMode::Rsvps => &event.current_rsvps,
            InputMode::Target => &event.target_attendance,
            InputMode::Goals => &event.goals,
            InputMode::Advertising => &event.advertising,
            InputMode::Volunteers => &event.volunteers,
            InputMode::Notes => &event.notes,
            InputMode::PlanningNotes => &event.planning_notes,
            InputMode::PostEventAttendance => &event.post_event_attendance,
            InputMode::Outcomes => &event.outcomes,
            InputMode::TotalSpent => &event.total_spent,
            InputMode::TotalEarned => &event.total_earned,
            InputMode::PostEventNotes => &event.post_event_notes,
            InputMode::Normal
            | InputMode::Creating
            | InputMode::PlanningNote
            | InputMode::FlyerPath => "",
        }
    }

    /// The field edit a finished prompt stands for. `None` for prompts that
    /// do not map onto a single field.
    pub fn field(&self, value: String) -> Option<Field> {
        Some(match self {
            InputMode::Name => Field::Name(value.trim().to_string()),
            InputMode::Date => Field::Date(value),
            InputMode::Time => Field::Time(value),
            InputMode::Rsvps => Field::CurrentRsvps(value.trim().to_string()),
            InputMode::Target => Field::TargetAttendance(value.trim().to_string()),
            InputMode::Goals => Field::Goals(value),
            InputMode::Advertising => Field::Advertising(value),
            InputMode::Volunteers => Field::Volunteers(value),
            InputMode::Notes => Field::Notes(value),
            InputMode::PlanningNotes => Field::PlanningNotes(value),
            InputMode::PostEventAttendance => Field::PostEventAttendance(value.trim().to_string()),
            InputMode::Outcomes => Field::Outcomes(value),
            InputMode::TotalSpent => Field::TotalSpent(value.trim().to_string()),
            InputMode::TotalEarned => Field::TotalEarned(value.trim().to_string()),
            InputMode::PostEventNotes => Field::PostEventNotes(value),
            InputMode::Normal
            | InputMode::Creating
            | InputMode::PlanningNote
            | InputMode::FlyerPath => return None,
        })
    }
}

pub struct UiState {
    pub snapshot: store::AppState,
    /// Indices into `snapshot.events()`, dated events first.
    pub view_indices: Vec<usize>,
    pub list_state: ListState,
    pub marketing_state: ListState,
    pub planning_state: ListState,
    pub active_focus: Focus,
    pub message: String,
    pub loading: bool,
    pub mode: InputMode,
    pub input_buffer: String,
    pub cursor_position: usize,
    /// Suggestion tier shown under the nudge. `None` picks one from attendance.
    pub suggestion_level: Option<SuggestionLevel>,
    pub show_field_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    pub fn new() -> Self {
        let mut l_state = ListState::default();
        l_state.select(Some(0));
        let mut m_state = ListState::default();
        m_state.select(Some(0));
        let mut p_state = ListState::default();
        p_state.select(Some(0));
        Self {
            snapshot: store::AppState::default(),
            view_indices: vec![],
            list_state: l_state,
            marketing_state: m_state,
            planning_state: p_state,
            active_focus: Focus::Events,
            message: "Loading events...".to_string(),
            loading: true,
            mode: InputMode::Normal,
            input_buffer: String::new(),
            cursor_position: 0,
            suggestion_level: None,
            show_field_help: false,
        }
    }

    pub fn set_snapshot(&mut self, snapshot: store::AppState) {
        self.snapshot = snapshot;
        self.recalculate_view();
    }

    pub fn recalculate_view(&mut self) {
        let events = self.snapshot.events();
        let mut indices: Vec<usize> = (0..events.len()).collect();
        indices.sort_by(|&a, &b| {
            let (a, b) = (&events[a], &events[b]);
            (a.is_tbd, &a.date, &a.time, a.id).cmp(&(b.is_tbd, &b.date, &b.time, b.id))
        });
        self.view_indices = indices;

        // Keep the cursor on the selected event when the order changes.
        if let Some(id) = self.snapshot.selected_id()
            && let Some(pos) = self.position_of(id)
        {
            self.list_state.select(Some(pos));
            return;
        }
        let sel = self.list_state.selected().unwrap_or(0);
        if self.view_indices.is_empty() {
            self.list_state.select(Some(0));
        } else if sel >= self.view_indices.len() {
            self.list_state.select(Some(self.view_indices.len() - 1));
        }
    }

    fn position_of(&self, id: EventId) -> Option<usize> {
        let events = self.snapshot.events();
        self.view_indices.iter().position(|&i| events[i].id == id)
    }

    pub fn highlighted(&self) -> Option<&Event> {
        let view_idx = self.list_state.selected()?;
        let idx = *self.view_indices.get(view_idx)?;
        self.snapshot.events().get(idx)
    }

    pub fn highlighted_id(&self) -> Option<EventId> {
        self.highlighted().map(|e| e.id)
    }

    /// Moving the event cursor selects the event under it, so the next
    /// snapshot keeps the cursor where the user left it.
    pub fn selection_change(&self) -> Option<Change> {
        if self.active_focus != Focus::Events {
            return None;
        }
        self.highlighted_id().map(|id| Change::Select(Some(id)))
    }

    pub fn cycle_suggestion_level(&mut self) {
        self.suggestion_level = match self.suggestion_level {
            None => Some(SuggestionLevel::High),
            Some(SuggestionLevel::High) => Some(SuggestionLevel::Medium),
            Some(SuggestionLevel::Medium) => Some(SuggestionLevel::Optional),
            Some(SuggestionLevel::Optional) => None,
        };
    }

    pub fn highlighted_marketing_task(&self) -> Option<&'static str> {
        let i = self.marketing_state.selected()?;
        MARKETING_TASKS.get(i).map(|t| t.id)
    }

    pub fn highlighted_planning_task(&self) -> Option<&'static str> {
        let i = self.planning_state.selected()?;
        PLANNING_TASKS.get(i).map(|t| t.id)
    }

    pub fn move_cursor_left(&mut self) {
        let cursor_moved_left = self.cursor_position.saturating_sub(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_left);
    }
    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.cursor_position.saturating_add(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_right);
    }
    pub fn enter_char(&mut self, new_char: char) {
        let byte_idx = self
            .input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len());
        self.input_buffer.insert(byte_idx, new_char);
        self.move_cursor_right();
    }
    pub fn delete_char(&mut self) {
        if self.cursor_position != 0 {
            let current_index = self.cursor_position;
            let before = self.input_buffer.chars().take(current_index - 1);
            let after = self.input_buffer.chars().skip(current_index);
            self.input_buffer = before.chain(after).collect();
            self.move_cursor_left();
        }
    }
    pub fn reset_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }
    /// Opens an input prompt, pre-filled with the current value.
    pub fn begin_input(&mut self, mode: InputMode, current: &str) {
        self.mode = mode;
        self.input_buffer = current.to_string();
        self.cursor_position = self.input_buffer.chars().count();
    }
    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.input_buffer.chars().count())
    }

    fn focused_list(&mut self) -> (&mut ListState, usize) {
        match self.active_focus {
            Focus::Events => (&mut self.list_state, self.view_indices.len()),
            Focus::Marketing => (&mut self.marketing_state, MARKETING_TASKS.len()),
            Focus::Planning => (&mut self.planning_state, PLANNING_TASKS.len()),
        }
    }

    pub fn next(&mut self) {
        let (state, len) = self.focused_list();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(i));
    }
    pub fn previous(&mut self) {
        let (state, len) = self.focused_list();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }
    pub fn jump_forward(&mut self, step: usize) {
        let (state, len) = self.focused_list();
        if len == 0 {
            return;
        }
        let current = state.selected().unwrap_or(0);
        state.select(Some((current + step).min(len - 1)));
    }
    pub fn jump_backward(&mut self, step: usize) {
        let (state, len) = self.focused_list();
        if len == 0 {
            return;
        }
        let current = state.selected().unwrap_or(0);
        state.select(Some(current.saturating_sub(step)));
    }
    pub fn toggle_focus(&mut self) {
        self.active_focus = match self.active_focus {
            Focus::Events => Focus::Marketing,
            Focus::Marketing => Focus::Planning,
            Focus::Planning => Focus::Events,
        }
    }
}
