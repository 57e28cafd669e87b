use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::ExternalEvent;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("not authorized with the external calendar")]
    Unauthorized,
    #[error("external calendar rate limit hit")]
    RateLimited,
    #[error("external calendar error: {0}")]
    Other(String),
}

/// A calendar as reported by the external provider's listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCalendar {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    #[serde(default)]
    pub primary: bool,
    pub background_color: Option<String>,
}

/// Read-only access to an external calendar account. Implementations own
/// OAuth, transport, and rate limiting; callers only see normalized shapes.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn list_calendars(&self) -> Result<Vec<ExternalCalendar>, ProviderError>;

    /// Events within `[start, end]` across the given calendars.
    async fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendar_ids: &[String],
    ) -> Result<Vec<ExternalEvent>, ProviderError>;
}
