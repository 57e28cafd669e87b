//! Client-side calendar logic: merging local tasks with externally-fetched
//! events into one filterable feed, computing fetch windows per view, and
//! persisting per-calendar preferences with a degraded local fallback.

pub mod events;
pub mod provider;
pub mod refresh;
pub mod settings;
pub mod window;

pub use events::{
    CalendarEvent, CalendarFeed, EventResource, ExternalEvent, SourceFilter, TypeFilter,
    build_feed, filter_events, merge_events,
};
pub use provider::{CalendarProvider, ExternalCalendar, ProviderError};
pub use refresh::{FetchPlan, FetchPlanner};
pub use settings::{CalendarConfig, LocalSettingsCache, SettingsBackend, SettingsError, SettingsStore};
pub use window::{CalendarView, view_window};
