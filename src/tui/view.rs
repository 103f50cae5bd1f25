use crate::metrics::{self, EventSummary, Status, SuggestionLevel};
use crate::model::parser::{display_date, display_time};
use crate::model::{Event, MARKETING_TASKS, PLANNING_TASKS};
use crate::tui::state::{Focus, InputMode, UiState};
use chrono::NaiveDateTime;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
};

fn status_color(status: Status) -> Color {
    match status {
        Status::OnTrack => Color::Green,
        Status::SlightlyBehind => Color::Yellow,
        Status::NeedsAttention => Color::Red,
    }
}

fn focus_style(state: &UiState, focus: Focus) -> Style {
    if state.active_focus == focus {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

pub fn draw(f: &mut Frame, state: &mut UiState, now: NaiveDateTime) {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(v_chunks[0]);

    draw_event_list(f, state, h_chunks[0], now);

    let highlighted = state.highlighted().cloned();
    match highlighted {
        Some(event) => draw_detail(f, state, &event, h_chunks[1], now),
        None => {
            let empty = Paragraph::new("No events yet. Press 'a' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Details "));
            f.render_widget(empty, h_chunks[1]);
        }
    }

    draw_footer(f, state, v_chunks[1]);
}

fn draw_event_list(f: &mut Frame, state: &mut UiState, area: Rect, now: NaiveDateTime) {
    let events = state.snapshot.events();
    let items: Vec<ListItem> = state
        .view_indices
        .iter()
        .map(|&idx| {
            let e = &events[idx];
            let s = metrics::summarize(e, now);
            let when = match s.days_until {
                _ if e.is_tbd => "TBD".to_string(),
                Some(d) if d < 0 => "past".to_string(),
                Some(0) => "today".to_string(),
                Some(d) => format!("{}d", d),
                None => "TBD".to_string(),
            };
            let style = if s.is_past {
                Style::default().fg(Color::DarkGray)
            } else if s.target_attendance > 0 {
                Style::default().fg(status_color(s.status))
            } else {
                Style::default().fg(Color::White)
            };
            let line = format!(
                "{:<6} {} ({}) {}",
                when,
                e.name,
                display_date(&e.date, e.is_tbd, false),
                metrics::checklist_summary(&e.checklist)
            );
            ListItem::new(Line::from(vec![Span::styled(line, style)]))
        })
        .collect();

    let title = if state.loading {
        " Events (Loading...) ".to_string()
    } else {
        format!(" Events ({}) ", state.view_indices.len())
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(state, Focus::Events)),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        );
    f.render_stateful_widget(list, area, &mut state.list_state);
}

fn draw_detail(f: &mut Frame, state: &mut UiState, event: &Event, area: Rect, now: NaiveDateTime) {
    let summary = metrics::summarize(event, now);
    let nudge = metrics::promotion_nudge(event, now);

    let lines = header_lines(event, &summary, nudge.as_deref(), state.suggestion_level);
    let header_height = (lines.len() as u16 + 2).min(16);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let header = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Details "));
    f.render_widget(header, chunks[0]);

    let ratio = (summary.attendance_percent.min(100) as f64) / 100.0;
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            " RSVPs {} / {} - {} ",
            summary.current_rsvps,
            summary.target_attendance,
            summary.status.label()
        )))
        .gauge_style(Style::default().fg(status_color(summary.status)))
        .ratio(ratio)
        .label(format!("{}%", summary.attendance_percent));
    f.render_widget(gauge, chunks[1]);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    let marketing: Vec<ListItem> = MARKETING_TASKS
        .iter()
        .map(|t| {
            let checkbox = if event.is_marketing_done(t.id) { "[x]" } else { "[ ]" };
            let mut style = Style::default();
            if t.optional {
                style = style.fg(Color::DarkGray);
            }
            if t.special {
                style = style.add_modifier(Modifier::ITALIC);
            }
            ListItem::new(Line::from(Span::styled(
                format!("{} {}", checkbox, t.label),
                style,
            )))
        })
        .collect();
    let marketing_list = List::new(marketing)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Marketing {}% ", summary.marketing_percent))
                .border_style(focus_style(state, Focus::Marketing)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::Blue));
    f.render_stateful_widget(marketing_list, lists[0], &mut state.marketing_state);

    let planning: Vec<ListItem> = PLANNING_TASKS
        .iter()
        .map(|t| {
            let entry = event.planning_entry(t.id);
            let checkbox = if entry.is_some_and(|e| e.done) { "[x]" } else { "[ ]" };
            let note = match entry {
                Some(e) if !e.note.is_empty() => format!(" - {}", e.note),
                _ => String::new(),
            };
            ListItem::new(Line::from(format!("{} {}{}", checkbox, t.label, note)))
        })
        .collect();
    let planning_list = List::new(planning)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Planning {}% ", summary.planning_percent))
                .border_style(focus_style(state, Focus::Planning)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::Blue));
    f.render_stateful_widget(planning_list, lists[1], &mut state.planning_state);
}

fn header_lines<'a>(
    event: &'a Event,
    summary: &EventSummary,
    nudge: Option<&'a str>,
    level: Option<SuggestionLevel>,
) -> Vec<Line<'a>> {
    let mut when = display_date(&event.date, event.is_tbd, true);
    let time = display_time(&event.time);
    if !time.is_empty() {
        when = format!("{} at {}", when, time);
    }
    let countdown = match summary.days_until {
        Some(d) if d < 0 => "This event has passed".to_string(),
        Some(0) => "Today".to_string(),
        Some(1) => "Tomorrow".to_string(),
        Some(d) => format!("In {} days", d),
        None => "Date to be announced".to_string(),
    };
    let flyer = if event.flyer_image.is_some() { "flyer attached" } else { "no flyer" };

    let mut lines = vec![
        Line::from(Span::styled(
            event.name.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("{} | {} | {}", when, countdown, flyer)),
    ];
    for (label, value) in [
        ("Goals", &event.goals),
        ("Advertising", &event.advertising),
        ("Volunteers", &event.volunteers),
        ("Notes", &event.notes),
        ("Planning", &event.planning_notes),
    ] {
        if !value.is_empty() {
            lines.push(Line::from(format!("{}: {}", label, value)));
        }
    }

    if summary.is_past {
        lines.push(Line::from(Span::styled(
            format!(
                "Attended: {} | Spent: {} | Earned: {}",
                or_dash(&event.post_event_attendance),
                or_dash(&event.total_spent),
                or_dash(&event.total_earned)
            ),
            Style::default().fg(Color::Cyan),
        )));
        if !event.outcomes.is_empty() {
            lines.push(Line::from(format!("Outcomes: {}", event.outcomes)));
        }
        if !event.post_event_notes.is_empty() {
            lines.push(Line::from(format!("Reflection: {}", event.post_event_notes)));
        }
    }

    if let Some(text) = nudge {
        lines.push(Line::from(Span::styled(text, Style::default().fg(Color::Magenta))));
        let level = level.unwrap_or(if summary.attendance_percent < 50 {
            SuggestionLevel::High
        } else {
            SuggestionLevel::Medium
        });
        lines.push(Line::from(format!(
            "{}: {}",
            level.label(),
            level.suggestions().join("; ")
        )));
    }
    lines
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn draw_footer(f: &mut Frame, state: &UiState, footer_area: Rect) {
    if state.mode == InputMode::Normal {
        let f_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(footer_area);
        let status = Paragraph::new(state.message.clone())
            .style(Style::default().fg(Color::Cyan))
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                    .title(" Status "),
            );
        let help_text = match state.active_focus {
            _ if state.show_field_help => {
                "N:Name | G:Goals | A:Ads | V:Volunteers | P:Plan | p:Attended | O:Outcomes | $:Spent | E:Earned | R:Reflect | L:Tips | ?:Back"
            }
            Focus::Events => "Tab:Lists | a:Add | D:Date | T:Time | u:TBD | r:RSVP | g:Goal | n:Notes | f:Flyer | x:Del | ?:More",
            Focus::Marketing => "Tab:Lists | Space:Toggle | Esc:Events",
            Focus::Planning => "Tab:Lists | Space:Toggle | e:Note | Esc:Events",
        };
        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Right)
            .block(
                Block::default()
                    .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                    .title(" Actions "),
            );
        f.render_widget(status, f_chunks[0]);
        f.render_widget(help, f_chunks[1]);
        return;
    }

    let (title, prefix) = state.mode.prompt();
    let input = Paragraph::new(format!("{}{}", prefix, state.input_buffer))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, footer_area);
    let cursor_x =
        footer_area.x + 1 + prefix.chars().count() as u16 + state.cursor_position as u16;
    let cursor_y = footer_area.y + 1;
    f.set_cursor_position((cursor_x, cursor_y));
}
