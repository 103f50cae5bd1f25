// File: ./src/metrics.rs
// Values derived from an event for display, recomputed on every render
use crate::model::catalog::{PLANNING_TASKS, required_marketing_tasks};
use crate::model::parser::parse_count;
use crate::model::{Checklist, Event, PlanningChecklist};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub const ON_TRACK_PERCENT: u32 = 90;
pub const SLIGHTLY_BEHIND_PERCENT: u32 = 70;
/// How close an under-subscribed event has to be before promotion is suggested.
pub const NUDGE_WINDOW_DAYS: i64 = 30;

const DAY_MS: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    OnTrack,
    SlightlyBehind,
    NeedsAttention,
}

impl Status {
    pub fn from_percent(percent: u32) -> Self {
        if percent >= ON_TRACK_PERCENT {
            Status::OnTrack
        } else if percent >= SLIGHTLY_BEHIND_PERCENT {
            Status::SlightlyBehind
        } else {
            Status::NeedsAttention
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::OnTrack => "On track",
            Status::SlightlyBehind => "Slightly behind",
            Status::NeedsAttention => "Needs attention",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionLevel {
    High,
    Medium,
    Optional,
}

impl SuggestionLevel {
    pub fn label(&self) -> &'static str {
        match self {
            SuggestionLevel::High => "High-Impact",
            SuggestionLevel::Medium => "Medium-Impact",
            SuggestionLevel::Optional => "Optional Boost",
        }
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            SuggestionLevel::High => &[
                "Post a reminder with urgency framing (\"2 weeks away\")",
                "Share to Stories or reshare the flyer",
                "Send a reminder email or calendar post",
                "Personally invite 5-10 people or partners",
            ],
            SuggestionLevel::Medium => &[
                "Add a FAQ or clarification post",
                "Repost with a different headline or image",
                "Highlight what attendees will experience",
            ],
            SuggestionLevel::Optional => &[
                "Consider adding an incentive (free, bonus, reminder framing)",
                "Review: does the event need clearer positioning?",
            ],
        }
    }
}

/// Whole days from `now` to the event, rounded up. Negative means the event is over.
/// `None` when the event has no date.
pub fn days_until(date: &str, time: &str, now: NaiveDateTime) -> Option<i64> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let at = NaiveTime::parse_from_str(time.trim(), "%H:%M").unwrap_or(NaiveTime::MIN);
    let millis = (day.and_time(at) - now).num_milliseconds();
    Some((millis as f64 / DAY_MS).ceil() as i64)
}

pub fn event_days_until(event: &Event, now: NaiveDateTime) -> Option<i64> {
    if event.is_tbd {
        return None;
    }
    days_until(&event.date, &event.time, now)
}

pub fn is_past(days: Option<i64>) -> bool {
    days.is_some_and(|d| d < 0)
}

fn required_done(checklist: &Checklist) -> usize {
    required_marketing_tasks()
        .filter(|t| checklist.get(t.id).copied().unwrap_or(false))
        .count()
}

/// Percentage of required (non-optional) marketing tasks done, rounded down.
pub fn marketing_completion(checklist: &Checklist) -> u32 {
    let total = required_marketing_tasks().count();
    (required_done(checklist) * 100 / total) as u32
}

/// `done/required`, for list views.
pub fn checklist_summary(checklist: &Checklist) -> String {
    format!(
        "{}/{}",
        required_done(checklist),
        required_marketing_tasks().count()
    )
}

/// Percentage of planning tasks marked done, rounded down.
pub fn planning_completion(planning: &PlanningChecklist) -> u32 {
    let done = PLANNING_TASKS
        .iter()
        .filter(|t| planning.get(t.id).is_some_and(|e| e.done))
        .count();
    (done * 100 / PLANNING_TASKS.len()) as u32
}

/// RSVPs against target, rounded to the nearest percent. 0 without a target.
pub fn attendance_progress(current: i64, target: i64) -> u32 {
    if target <= 0 {
        return 0;
    }
    let percent = (current as f64 / target as f64 * 100.0).round();
    percent.max(0.0) as u32
}

/// Everything a list row or detail header needs.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub days_until: Option<i64>,
    pub is_past: bool,
    pub current_rsvps: i64,
    pub target_attendance: i64,
    pub attendance_percent: u32,
    pub status: Status,
    pub marketing_percent: u32,
    pub planning_percent: u32,
}

pub fn summarize(event: &Event, now: NaiveDateTime) -> EventSummary {
    let days = event_days_until(event, now);
    let current = parse_count(&event.current_rsvps);
    let target = parse_count(&event.target_attendance);
    let attendance_percent = attendance_progress(current, target);
    EventSummary {
        days_until: days,
        is_past: is_past(days),
        current_rsvps: current,
        target_attendance: target,
        attendance_percent,
        status: Status::from_percent(attendance_percent),
        marketing_percent: marketing_completion(&event.checklist),
        planning_percent: planning_completion(&event.planning_checklist),
    }
}

/// Prompt shown for an upcoming, under-subscribed event inside the nudge window.
pub fn promotion_nudge(event: &Event, now: NaiveDateTime) -> Option<String> {
    let s = summarize(event, now);
    let days = s.days_until?;
    if s.is_past
        || s.target_attendance <= 0
        || s.attendance_percent >= ON_TRACK_PERCENT
        || days > NUDGE_WINDOW_DAYS
    {
        return None;
    }
    let distance = if days > 14 {
        format!("{} days out", days)
    } else if days > 7 {
        "two weeks out".to_string()
    } else {
        "one week out".to_string()
    };
    Some(format!(
        "You're {} and currently at {} of {} attendees ({}%). Events with similar goals usually see stronger results with additional promotion.",
        distance, s.current_rsvps, s.target_attendance, s.attendance_percent
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlanningEntry;
    use crate::model::catalog::MARKETING_TASKS;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn days_until_around_today() {
        assert_eq!(days_until("2025-05-11", "", now()), Some(1));
        assert_eq!(days_until("2025-05-10", "", now()), Some(0));
        let yesterday = days_until("2025-05-09", "", now());
        assert_eq!(yesterday, Some(-1));
        assert!(is_past(yesterday));
        assert!(!is_past(Some(0)));
        assert_eq!(days_until("", "", now()), None);
    }

    #[test]
    fn tbd_has_no_countdown() {
        let e = Event {
            is_tbd: true,
            ..Event::default()
        };
        assert_eq!(event_days_until(&e, now()), None);
    }

    #[test]
    fn optional_tasks_do_not_count() {
        let mut checklist = Checklist::new();
        for task in MARKETING_TASKS.iter().filter(|t| !t.optional) {
            checklist.insert(task.id.to_string(), true);
        }
        assert_eq!(marketing_completion(&checklist), 100);
        assert_eq!(checklist_summary(&checklist), "15/15");

        for task in MARKETING_TASKS.iter().filter(|t| t.optional) {
            checklist.insert(task.id.to_string(), false);
        }
        assert_eq!(marketing_completion(&checklist), 100);

        let mut only_optional = Checklist::new();
        only_optional.insert("union-ad".into(), true);
        only_optional.insert("flyer".into(), true);
        only_optional.insert("not-a-task".into(), true);
        // 1 of 15, floored
        assert_eq!(marketing_completion(&only_optional), 6);
    }

    #[test]
    fn planning_percent_floors() {
        let mut planning = PlanningChecklist::new();
        planning.insert("av-needs".into(), PlanningEntry { done: true, note: String::new() });
        planning.insert("catering".into(), PlanningEntry { done: false, note: "quote".into() });
        // 1 of 13
        assert_eq!(planning_completion(&planning), 7);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(Status::from_percent(90).label(), "On track");
        assert_eq!(Status::from_percent(89).label(), "Slightly behind");
        assert_eq!(Status::from_percent(70), Status::SlightlyBehind);
        assert_eq!(Status::from_percent(69), Status::NeedsAttention);
    }

    #[test]
    fn attendance_rounds() {
        assert_eq!(attendance_progress(2, 3), 67);
        assert_eq!(attendance_progress(5, 0), 0);
        assert_eq!(attendance_progress(120, 100), 120);
    }

    #[test]
    fn nudge_inside_window() {
        let e = Event {
            date: "2025-05-20".into(),
            target_attendance: "100".into(),
            current_rsvps: "40".into(),
            ..Event::default()
        };
        let text = promotion_nudge(&e, now()).unwrap();
        assert!(text.starts_with("You're two weeks out and currently at 40 of 100 attendees (40%)"));

        let far = Event {
            date: "2025-08-01".into(),
            ..e.clone()
        };
        assert_eq!(promotion_nudge(&far, now()), None);

        let full = Event {
            current_rsvps: "95".into(),
            ..e
        };
        assert_eq!(promotion_nudge(&full, now()), None);
    }

    #[test]
    fn suggestion_tiers() {
        assert_eq!(SuggestionLevel::High.suggestions().len(), 4);
        assert_eq!(SuggestionLevel::Medium.suggestions().len(), 3);
        assert_eq!(SuggestionLevel::Optional.suggestions().len(), 2);
    }
}
