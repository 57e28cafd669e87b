use chrono::{DateTime, Duration, Utc};
use db::models::task::{Task, TaskPriority, TaskStatus};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderError;

/// External ids are prefixed so they can never collide with task ids.
const EXTERNAL_ID_PREFIX: &str = "external_";

const HIGH_PRIORITY_COLOR: &str = "#ef4444";
const MEDIUM_PRIORITY_COLOR: &str = "#f59e0b";
const LOW_PRIORITY_COLOR: &str = "#3b82f6";
const DEFAULT_MEETING_COLOR: &str = "#10b981";

/// An already-normalized event from an external calendar feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub calendar_id: Option<String>,
    pub background_color: Option<String>,
}

/// Source-tagged payload of a unified calendar event; matching is exhaustive
/// at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum EventResource {
    #[serde(rename = "nextStep")]
    Task {
        description: Option<String>,
        priority: TaskPriority,
        status: TaskStatus,
    },
    #[serde(rename = "external")]
    Meeting {
        description: Option<String>,
        location: Option<String>,
        calendar_id: Option<String>,
        background_color: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub resource: EventResource,
}

impl CalendarEvent {
    pub fn is_task(&self) -> bool {
        matches!(self.resource, EventResource::Task { .. })
    }

    /// Render color: tasks by priority, meetings by their calendar's
    /// configured color with a green fallback.
    pub fn display_color(&self) -> &str {
        match &self.resource {
            EventResource::Task { priority, .. } => match priority {
                TaskPriority::High => HIGH_PRIORITY_COLOR,
                TaskPriority::Medium => MEDIUM_PRIORITY_COLOR,
                TaskPriority::Low => LOW_PRIORITY_COLOR,
            },
            EventResource::Meeting { background_color, .. } => {
                background_color.as_deref().unwrap_or(DEFAULT_MEETING_COLOR)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceFilter {
    #[default]
    All,
    NextStep,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeFilter {
    #[default]
    All,
    Task,
    Meeting,
}

impl SourceFilter {
    fn matches(&self, event: &CalendarEvent) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::NextStep => event.is_task(),
            SourceFilter::External => !event.is_task(),
        }
    }
}

impl TypeFilter {
    fn matches(&self, event: &CalendarEvent) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Task => event.is_task(),
            TypeFilter::Meeting => !event.is_task(),
        }
    }
}

/// Maps a task onto the calendar. Undated tasks start "now"; the end is the
/// estimated duration when positive, otherwise one hour.
pub fn task_event(task: &Task, now: DateTime<Utc>) -> CalendarEvent {
    let start = task.due_date.unwrap_or(now);
    let minutes = match task.estimated_minutes {
        Some(m) if m > 0 => i64::from(m),
        _ => 60,
    };
    CalendarEvent {
        id: task.id.to_string(),
        title: task.title.clone(),
        start,
        end: start + Duration::minutes(minutes),
        resource: EventResource::Task {
            description: task.description.clone(),
            priority: task.priority,
            status: task.status,
        },
    }
}

pub fn external_event(event: &ExternalEvent) -> CalendarEvent {
    CalendarEvent {
        id: format!("{EXTERNAL_ID_PREFIX}{}", event.id),
        title: event.title.clone(),
        start: event.start,
        end: event.end,
        resource: EventResource::Meeting {
            description: event.description.clone(),
            location: event.location.clone(),
            calendar_id: event.calendar_id.clone(),
            background_color: event.background_color.clone(),
        },
    }
}

/// Tasks first, then external events. The order carries no meaning beyond
/// stable rendering.
pub fn merge_events(
    tasks: &[Task],
    external: &[ExternalEvent],
    now: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    tasks
        .iter()
        .map(|task| task_event(task, now))
        .chain(external.iter().map(external_event))
        .collect()
}

/// Both filters must match (logical AND); `All` passes everything on its axis.
pub fn filter_events(
    events: Vec<CalendarEvent>,
    source: SourceFilter,
    kind: TypeFilter,
) -> Vec<CalendarEvent> {
    events
        .into_iter()
        .filter(|event| source.matches(event) && kind.matches(event))
        .collect()
}

/// Merged feed plus an error indicator when the external fetch failed. Local
/// tasks always render; a failed external fetch degrades to a partial feed.
#[derive(Debug, Clone)]
pub struct CalendarFeed {
    pub events: Vec<CalendarEvent>,
    pub error: Option<String>,
}

pub fn build_feed(
    tasks: &[Task],
    external: Result<Vec<ExternalEvent>, ProviderError>,
    now: DateTime<Utc>,
) -> CalendarFeed {
    match external {
        Ok(external) => CalendarFeed {
            events: merge_events(tasks, &external, now),
            error: None,
        },
        Err(err) => {
            tracing::warn!("external event fetch failed, rendering tasks only: {err}");
            CalendarFeed {
                events: merge_events(tasks, &[], now),
                error: Some(err.to_string()),
            }
        }
    }
}
