use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

impl TaskPriority {
    /// Rank used for "priority descending" ordering: high > medium > low.
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::High => 2,
            TaskPriority::Medium => 1,
            TaskPriority::Low => 0,
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Classification for an external calendar. The first six values are what the
/// settings page offers; `PersonalPrimary` and `NotDefined` are extended
/// values a client may report for the primary / unclassified calendars.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CalendarType {
    #[sea_orm(string_value = "work")]
    Work,
    #[sea_orm(string_value = "personal")]
    Personal,
    #[sea_orm(string_value = "household")]
    Household,
    #[sea_orm(string_value = "birthdays")]
    Birthdays,
    #[default]
    #[sea_orm(string_value = "other_personal")]
    OtherPersonal,
    #[sea_orm(string_value = "other_work")]
    OtherWork,
    #[sea_orm(string_value = "personal_primary")]
    PersonalPrimary,
    #[sea_orm(string_value = "not_defined")]
    NotDefined,
}
