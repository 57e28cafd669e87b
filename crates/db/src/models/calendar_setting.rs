use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::types::CalendarType;
use crate::entities::calendar_setting;

/// Per-user preferences for one external calendar. At most one row per
/// (user, calendar id); writes go through `upsert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSetting {
    pub id: Uuid,
    pub user_id: Uuid,
    pub calendar_id: String,
    pub calendar_type: CalendarType,
    pub visible: bool,
    pub consider_in_conflicts: bool,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub background_color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCalendarSetting {
    pub calendar_id: String,
    #[serde(default)]
    pub calendar_type: CalendarType,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub consider_in_conflicts: bool,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub background_color: Option<String>,
}

fn default_true() -> bool {
    true
}

impl CalendarSetting {
    fn from_model(model: calendar_setting::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            calendar_id: model.calendar_id,
            calendar_type: model.calendar_type,
            visible: model.visible,
            consider_in_conflicts: model.consider_in_conflicts,
            summary: model.summary,
            description: model.description,
            background_color: model.background_color,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn find_all_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let models = calendar_setting::Entity::find()
            .filter(calendar_setting::Column::UserId.eq(user_id))
            .order_by_asc(calendar_setting::Column::CalendarId)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id_for_user<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        let record = calendar_setting::Entity::find()
            .filter(calendar_setting::Column::Id.eq(id))
            .filter(calendar_setting::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    /// Creates or updates the setting for (user, calendar id).
    pub async fn upsert<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        data: &UpsertCalendarSetting,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let existing = calendar_setting::Entity::find()
            .filter(calendar_setting::Column::UserId.eq(user_id))
            .filter(calendar_setting::Column::CalendarId.eq(data.calendar_id.clone()))
            .one(db)
            .await?;

        let model = match existing {
            Some(record) => {
                let mut active: calendar_setting::ActiveModel = record.into();
                active.calendar_type = Set(data.calendar_type);
                active.visible = Set(data.visible);
                active.consider_in_conflicts = Set(data.consider_in_conflicts);
                active.summary = Set(data.summary.clone());
                active.description = Set(data.description.clone());
                active.background_color = Set(data.background_color.clone());
                active.updated_at = Set(now);
                active.update(db).await?
            }
            None => {
                let active = calendar_setting::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    calendar_id: Set(data.calendar_id.clone()),
                    calendar_type: Set(data.calendar_type),
                    visible: Set(data.visible),
                    consider_in_conflicts: Set(data.consider_in_conflicts),
                    summary: Set(data.summary.clone()),
                    description: Set(data.description.clone()),
                    background_color: Set(data.background_color.clone()),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                active.insert(db).await?
            }
        };

        Ok(Self::from_model(model))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid, user_id: Uuid) -> Result<u64, DbErr> {
        let result = calendar_setting::Entity::delete_many()
            .filter(calendar_setting::Column::Id.eq(id))
            .filter(calendar_setting::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
