use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use db::types::CalendarType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::ExternalCalendar;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings backend error: {0}")]
    Backend(String),
    #[error("settings cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings cache parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown calendar: {0}")]
    UnknownCalendar(String),
}

/// Per-calendar display preferences as the client sees them, keyed by the
/// external calendar id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarConfig {
    pub calendar_id: String,
    pub calendar_type: CalendarType,
    pub visible: bool,
    pub consider_in_conflicts: bool,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub background_color: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

impl CalendarConfig {
    /// Defaults for a calendar we have no saved preference for yet.
    pub fn from_listed(calendar: &ExternalCalendar) -> Self {
        Self {
            calendar_id: calendar.id.clone(),
            calendar_type: if calendar.primary {
                CalendarType::PersonalPrimary
            } else {
                CalendarType::NotDefined
            },
            visible: true,
            consider_in_conflicts: true,
            summary: Some(calendar.summary.clone()),
            description: calendar.description.clone(),
            background_color: calendar.background_color.clone(),
            primary: calendar.primary,
        }
    }

    /// Saved preferences win, but externally-reported fields the saved copy
    /// lacks (summary, color) are preserved from the fresh listing.
    fn overlaid_on(mut self, listed: &Self) -> Self {
        if self.summary.is_none() {
            self.summary = listed.summary.clone();
        }
        if self.background_color.is_none() {
            self.background_color = listed.background_color.clone();
        }
        self.primary = listed.primary;
        self
    }
}

/// Remote persistence for calendar preferences (the backend API). Kept as a
/// trait so the store works against HTTP, a database, or a test double.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn save(&self, config: &CalendarConfig) -> Result<(), SettingsError>;
    async fn load(&self) -> Result<Vec<CalendarConfig>, SettingsError>;
}

/// On-disk JSON map keyed by calendar id; the degraded fallback when the
/// backend is unreachable. A missing file reads as no saved settings.
pub struct LocalSettingsCache {
    path: PathBuf,
}

impl LocalSettingsCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    fn read_map(&self) -> Result<BTreeMap<String, CalendarConfig>, SettingsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn load(&self) -> Result<Vec<CalendarConfig>, SettingsError> {
        Ok(self.read_map()?.into_values().collect())
    }

    pub fn store(&self, config: &CalendarConfig) -> Result<(), SettingsError> {
        let mut map = self.read_map()?;
        map.insert(config.calendar_id.clone(), config.clone());
        std::fs::write(&self.path, serde_json::to_string_pretty(&map)?)?;
        Ok(())
    }
}

/// Write-through preference store with a degraded fallback: updates apply to
/// in-memory state immediately, are mirrored to the local cache, and are
/// pushed to the backend. When the backend is down the local copy is the only
/// one updated, so the preference is visible on this device only until the
/// backend is reachable again.
pub struct SettingsStore<B> {
    backend: B,
    cache: LocalSettingsCache,
    calendars: Vec<CalendarConfig>,
}

impl<B: SettingsBackend> SettingsStore<B> {
    pub fn new(backend: B, cache: LocalSettingsCache) -> Self {
        Self { backend, cache, calendars: Vec::new() }
    }

    pub fn calendars(&self) -> &[CalendarConfig] {
        &self.calendars
    }

    pub fn visible_calendar_ids(&self) -> Vec<String> {
        self.calendars
            .iter()
            .filter(|c| c.visible)
            .map(|c| c.calendar_id.clone())
            .collect()
    }

    /// Rebuilds the calendar list from a fresh provider listing, overlaying
    /// saved preferences. Backend first; if it fails or has nothing saved,
    /// the local cache is used.
    pub async fn load(&mut self, listed: &[ExternalCalendar]) -> Result<(), SettingsError> {
        let mut configs: Vec<CalendarConfig> =
            listed.iter().map(CalendarConfig::from_listed).collect();

        let saved = match self.backend.load().await {
            Ok(saved) if !saved.is_empty() => saved,
            Ok(_) => self.cache.load()?,
            Err(err) => {
                tracing::warn!("settings backend unavailable, using local cache: {err}");
                self.cache.load()?
            }
        };

        for saved_config in saved {
            if let Some(slot) = configs
                .iter_mut()
                .find(|c| c.calendar_id == saved_config.calendar_id)
            {
                *slot = saved_config.overlaid_on(slot);
            }
        }

        self.calendars = configs;
        Ok(())
    }

    /// Optimistic update: in-memory state changes first, then the write goes
    /// through to the backend with the local cache as backup. Fails only when
    /// both the backend and the cache reject the write.
    pub async fn apply(&mut self, config: CalendarConfig) -> Result<(), SettingsError> {
        match self
            .calendars
            .iter_mut()
            .find(|c| c.calendar_id == config.calendar_id)
        {
            Some(slot) => *slot = config.clone(),
            None => self.calendars.push(config.clone()),
        }

        let cache_result = self.cache.store(&config);
        match self.backend.save(&config).await {
            Ok(()) => {
                if let Err(err) = cache_result {
                    tracing::warn!("failed to mirror setting to local cache: {err}");
                }
                Ok(())
            }
            Err(backend_err) => {
                tracing::warn!(
                    calendar_id = %config.calendar_id,
                    "backend save failed, setting kept locally: {backend_err}"
                );
                cache_result.map_err(|_| backend_err)
            }
        }
    }

    pub async fn toggle_visibility(&mut self, calendar_id: &str) -> Result<(), SettingsError> {
        let mut config = self.config_for(calendar_id)?;
        config.visible = !config.visible;
        self.apply(config).await
    }

    pub async fn toggle_conflict_consideration(
        &mut self,
        calendar_id: &str,
    ) -> Result<(), SettingsError> {
        let mut config = self.config_for(calendar_id)?;
        config.consider_in_conflicts = !config.consider_in_conflicts;
        self.apply(config).await
    }

    pub async fn set_calendar_type(
        &mut self,
        calendar_id: &str,
        calendar_type: CalendarType,
    ) -> Result<(), SettingsError> {
        let mut config = self.config_for(calendar_id)?;
        config.calendar_type = calendar_type;
        self.apply(config).await
    }

    fn config_for(&self, calendar_id: &str) -> Result<CalendarConfig, SettingsError> {
        self.calendars
            .iter()
            .find(|c| c.calendar_id == calendar_id)
            .cloned()
            .ok_or_else(|| SettingsError::UnknownCalendar(calendar_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Backend double: records saves, serves a canned load, optionally fails.
    #[derive(Default)]
    struct FakeBackend {
        stored: Mutex<Vec<CalendarConfig>>,
        fail: bool,
    }

    #[async_trait]
    impl SettingsBackend for FakeBackend {
        async fn save(&self, config: &CalendarConfig) -> Result<(), SettingsError> {
            if self.fail {
                return Err(SettingsError::Backend("backend down".to_string()));
            }
            let mut stored = self.stored.lock().unwrap();
            stored.retain(|c| c.calendar_id != config.calendar_id);
            stored.push(config.clone());
            Ok(())
        }

        async fn load(&self) -> Result<Vec<CalendarConfig>, SettingsError> {
            if self.fail {
                return Err(SettingsError::Backend("backend down".to_string()));
            }
            Ok(self.stored.lock().unwrap().clone())
        }
    }

    fn listed(id: &str, primary: bool) -> ExternalCalendar {
        ExternalCalendar {
            id: id.to_string(),
            summary: format!("{id} calendar"),
            description: None,
            primary,
            background_color: Some("#abcdef".to_string()),
        }
    }

    fn cache_in(dir: &tempfile::TempDir) -> LocalSettingsCache {
        LocalSettingsCache::new(dir.path().join("calendar-settings.json"))
    }

    #[tokio::test]
    async fn fresh_load_defaults_every_listed_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::new(FakeBackend::default(), cache_in(&dir));

        store.load(&[listed("work", false), listed("home", true)]).await.unwrap();

        let home = store.calendars().iter().find(|c| c.calendar_id == "home").unwrap();
        assert!(home.visible && home.consider_in_conflicts);
        assert_eq!(home.calendar_type, CalendarType::PersonalPrimary);
        let work = store.calendars().iter().find(|c| c.calendar_id == "work").unwrap();
        assert_eq!(work.calendar_type, CalendarType::NotDefined);
    }

    #[tokio::test]
    async fn saved_settings_overlay_but_keep_listed_summary_and_color() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::default();
        backend.stored.lock().unwrap().push(CalendarConfig {
            calendar_id: "work".to_string(),
            calendar_type: CalendarType::Work,
            visible: false,
            consider_in_conflicts: true,
            summary: None,
            description: None,
            background_color: None,
            primary: false,
        });
        let mut store = SettingsStore::new(backend, cache_in(&dir));

        store.load(&[listed("work", false)]).await.unwrap();

        let work = &store.calendars()[0];
        assert_eq!(work.calendar_type, CalendarType::Work);
        assert!(!work.visible);
        assert_eq!(work.summary.as_deref(), Some("work calendar"));
        assert_eq!(work.background_color.as_deref(), Some("#abcdef"));
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_local_cache() {
        let dir = tempfile::tempdir().unwrap();

        // First session: backend down, toggle lands in the local cache only.
        let backend = FakeBackend { fail: true, ..Default::default() };
        let mut store = SettingsStore::new(backend, cache_in(&dir));
        store.load(&[listed("work", false)]).await.unwrap();
        store.toggle_visibility("work").await.unwrap();
        assert!(!store.calendars()[0].visible);

        // Reload (still offline): the preference survived on this device.
        let backend = FakeBackend { fail: true, ..Default::default() };
        let mut store = SettingsStore::new(backend, cache_in(&dir));
        store.load(&[listed("work", false)]).await.unwrap();
        assert!(!store.calendars()[0].visible);
    }

    #[tokio::test]
    async fn successful_save_reaches_backend_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::new(FakeBackend::default(), cache_in(&dir));
        store.load(&[listed("work", false)]).await.unwrap();

        store.set_calendar_type("work", CalendarType::OtherWork).await.unwrap();

        assert_eq!(store.backend.stored.lock().unwrap().len(), 1);
        assert_eq!(store.cache.load().unwrap().len(), 1);
        assert_eq!(store.calendars()[0].calendar_type, CalendarType::OtherWork);
    }

    #[tokio::test]
    async fn unknown_calendar_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::new(FakeBackend::default(), cache_in(&dir));
        let err = store.toggle_visibility("nope").await.unwrap_err();
        assert!(matches!(err, SettingsError::UnknownCalendar(_)));
    }

    #[tokio::test]
    async fn visible_ids_follow_visibility() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::new(FakeBackend::default(), cache_in(&dir));
        store.load(&[listed("a", false), listed("b", false)]).await.unwrap();
        store.toggle_visibility("a").await.unwrap();
        assert_eq!(store.visible_calendar_ids(), vec!["b".to_string()]);
    }
}
