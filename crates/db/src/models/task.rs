use std::cmp::Reverse;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::types::{TaskPriority, TaskStatus};
use crate::entities::task;

/// API shape of a task. Tags are a comma-joined string at rest and an array
/// in transit; the conversion lives entirely in this module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub category: Option<String>,
    pub estimated_minutes: Option<i32>,
    pub actual_minutes: Option<i32>,
    pub is_recurring: bool,
    pub recurring_pattern: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub category: Option<String>,
    pub estimated_minutes: Option<i32>,
    pub actual_minutes: Option<i32>,
    pub is_recurring: Option<bool>,
    pub recurring_pattern: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Full-object update: omitted fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub category: Option<String>,
    pub estimated_minutes: Option<i32>,
    pub actual_minutes: Option<i32>,
    pub is_recurring: Option<bool>,
    pub recurring_pattern: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn join_tags(tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        None
    } else {
        Some(tags.join(","))
    }
}

fn split_tags(tags: Option<&str>) -> Vec<String> {
    match tags {
        Some(value) if !value.is_empty() => value.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

impl Task {
    fn from_model(model: task::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            due_date: model.due_date,
            priority: model.priority,
            status: model.status,
            category: model.category,
            estimated_minutes: model.estimated_minutes,
            actual_minutes: model.actual_minutes,
            is_recurring: model.is_recurring,
            recurring_pattern: model.recurring_pattern,
            tags: split_tags(model.tags.as_deref()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn find_all_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let models = task::Entity::find()
            .filter(task::Column::UserId.eq(user_id))
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id_for_user<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Id.eq(id))
            .filter(task::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = task::ActiveModel {
            id: Set(task_id),
            user_id: Set(user_id),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            due_date: Set(data.due_date),
            priority: Set(data.priority.unwrap_or_default()),
            status: Set(data.status.unwrap_or_default()),
            category: Set(data.category.clone()),
            estimated_minutes: Set(data.estimated_minutes),
            actual_minutes: Set(data.actual_minutes),
            is_recurring: Set(data.is_recurring.unwrap_or(false)),
            recurring_pattern: Set(data.recurring_pattern.clone()),
            tags: Set(data.tags.as_deref().and_then(join_tags)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
        data: &UpdateTask,
    ) -> Result<Self, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Id.eq(id))
            .filter(task::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Task not found".to_string()))?;

        let mut active: task::ActiveModel = record.into();
        if let Some(title) = data.title.clone() {
            active.title = Set(title);
        }
        match data.description.clone() {
            // Empty string clears the description; omitted keeps it.
            Some(s) if s.trim().is_empty() => active.description = Set(None),
            Some(s) => active.description = Set(Some(s)),
            None => {}
        }
        if let Some(due_date) = data.due_date {
            active.due_date = Set(Some(due_date));
        }
        if let Some(priority) = data.priority {
            active.priority = Set(priority);
        }
        if let Some(status) = data.status {
            active.status = Set(status);
        }
        if let Some(category) = data.category.clone() {
            active.category = Set(Some(category));
        }
        if let Some(estimated_minutes) = data.estimated_minutes {
            active.estimated_minutes = Set(Some(estimated_minutes));
        }
        if let Some(actual_minutes) = data.actual_minutes {
            active.actual_minutes = Set(Some(actual_minutes));
        }
        if let Some(is_recurring) = data.is_recurring {
            active.is_recurring = Set(is_recurring);
        }
        if let Some(recurring_pattern) = data.recurring_pattern.clone() {
            active.recurring_pattern = Set(Some(recurring_pattern));
        }
        if let Some(tags) = data.tags.as_deref() {
            active.tags = Set(join_tags(tags));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid, user_id: Uuid) -> Result<u64, DbErr> {
        let result = task::Entity::delete_many()
            .filter(task::Column::Id.eq(id))
            .filter(task::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Loads the user's non-completed tasks and applies the recommendation
    /// rule. `None` means no candidate, not an error.
    pub async fn find_next_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, DbErr> {
        let models = task::Entity::find()
            .filter(task::Column::UserId.eq(user_id))
            .filter(task::Column::Status.ne(TaskStatus::Completed))
            .all(db)
            .await?;
        let tasks: Vec<Self> = models.into_iter().map(Self::from_model).collect();
        Ok(Self::recommend_next(&tasks, now).cloned())
    }

    /// Tiered next-task rule over a set of non-completed tasks.
    ///
    /// Tiers, first non-empty wins:
    ///   1. high priority, due today          -> earliest due date
    ///   2. due today, any priority           -> priority desc, due asc
    ///   3. high priority, due tomorrow or on -> earliest due date
    ///   4. anything left                     -> priority desc, due asc
    ///
    /// The tie-break order is total (priority rank, due date, id) so the
    /// result is deterministic for a fixed input set. Completed tasks are
    /// ignored regardless of how the input was produced.
    pub fn recommend_next(tasks: &[Self], now: DateTime<Utc>) -> Option<&Self> {
        let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let tomorrow = today + Duration::days(1);
        let due_today =
            |t: &Self| t.due_date.is_some_and(|due| due >= today && due < tomorrow);

        let candidates: Vec<&Self> = tasks
            .iter()
            .filter(|t| t.status != TaskStatus::Completed)
            .collect();

        let by_due = |t: &&Self| (t.due_date, t.id);
        let by_priority_then_due =
            |t: &&Self| (Reverse(t.priority.rank()), t.due_date.is_none(), t.due_date, t.id);

        candidates
            .iter()
            .copied()
            .filter(|t| t.priority == TaskPriority::High && due_today(*t))
            .min_by_key(by_due)
            .or_else(|| {
                candidates
                    .iter()
                    .copied()
                    .filter(|t| due_today(*t))
                    .min_by_key(by_priority_then_due)
            })
            .or_else(|| {
                candidates
                    .iter()
                    .copied()
                    .filter(|t| {
                        t.priority == TaskPriority::High
                            && t.due_date.is_some_and(|due| due >= tomorrow)
                    })
                    .min_by_key(by_due)
            })
            .or_else(|| candidates.iter().copied().min_by_key(by_priority_then_due))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn task(
        title: &str,
        priority: TaskPriority,
        status: TaskStatus,
        due_date: Option<DateTime<Utc>>,
    ) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            due_date,
            priority,
            status,
            category: None,
            estimated_minutes: None,
            actual_minutes: None,
            is_recurring: false,
            recurring_pattern: None,
            tags: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn high_priority_due_today_wins_over_tomorrow() {
        let now = at(10, 9);
        let tasks = vec![
            task("tomorrow", TaskPriority::High, TaskStatus::Pending, Some(at(11, 10))),
            task("today", TaskPriority::High, TaskStatus::Pending, Some(at(10, 14))),
        ];
        let next = Task::recommend_next(&tasks, now).unwrap();
        assert_eq!(next.title, "today");
    }

    #[test]
    fn due_today_orders_by_priority_then_due_date() {
        let now = at(10, 8);
        let tasks = vec![
            task("low early", TaskPriority::Low, TaskStatus::Pending, Some(at(10, 9))),
            task("medium late", TaskPriority::Medium, TaskStatus::Pending, Some(at(10, 20))),
            task("medium early", TaskPriority::Medium, TaskStatus::Pending, Some(at(10, 11))),
        ];
        let next = Task::recommend_next(&tasks, now).unwrap();
        assert_eq!(next.title, "medium early");
    }

    #[test]
    fn falls_through_to_future_high_priority() {
        let now = at(10, 8);
        let tasks = vec![
            task("medium in 10d", TaskPriority::Medium, TaskStatus::Pending, Some(at(20, 9))),
            task("high in 3d", TaskPriority::High, TaskStatus::Pending, Some(at(13, 9))),
        ];
        let next = Task::recommend_next(&tasks, now).unwrap();
        assert_eq!(next.title, "high in 3d");
    }

    #[test]
    fn final_tier_prefers_priority_and_places_undated_last() {
        let now = at(10, 8);
        let tasks = vec![
            task("low dated", TaskPriority::Low, TaskStatus::Pending, Some(at(12, 9))),
            task("medium undated", TaskPriority::Medium, TaskStatus::Pending, None),
            task("medium dated", TaskPriority::Medium, TaskStatus::Pending, Some(at(15, 9))),
        ];
        let next = Task::recommend_next(&tasks, now).unwrap();
        assert_eq!(next.title, "medium dated");
    }

    #[test]
    fn completed_tasks_are_never_recommended() {
        let now = at(10, 8);
        let tasks = vec![
            task("done", TaskPriority::High, TaskStatus::Completed, Some(at(10, 9))),
            task("also done", TaskPriority::Low, TaskStatus::Completed, None),
        ];
        assert!(Task::recommend_next(&tasks, now).is_none());
    }

    #[test]
    fn earlier_due_date_wins_within_a_tier() {
        let now = at(10, 8);
        let a = task("later", TaskPriority::High, TaskStatus::Pending, Some(at(10, 16)));
        let b = task("earlier", TaskPriority::High, TaskStatus::Pending, Some(at(10, 9)));
        let tasks = [a, b];
        let next = Task::recommend_next(&tasks, now).unwrap();
        assert_eq!(next.title, "earlier");
    }

    #[test]
    fn due_before_midnight_is_not_today() {
        let now = at(10, 8);
        // 23:59 yesterday is outside [today, tomorrow); lands in tier 4.
        let yesterday = task(
            "yesterday",
            TaskPriority::Low,
            TaskStatus::Pending,
            Some(Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 0).unwrap()),
        );
        let future_high =
            task("future high", TaskPriority::High, TaskStatus::Pending, Some(at(12, 9)));
        let tasks = [yesterday, future_high];
        let next = Task::recommend_next(&tasks, now).unwrap();
        assert_eq!(next.title, "future high");
    }

    #[test]
    fn tags_round_trip_including_empty() {
        assert_eq!(join_tags(&[]), None);
        assert_eq!(split_tags(None), Vec::<String>::new());
        assert_eq!(split_tags(Some("")), Vec::<String>::new());

        let tags = vec!["home".to_string(), "urgent".to_string()];
        let joined = join_tags(&tags).unwrap();
        assert_eq!(joined, "home,urgent");
        assert_eq!(split_tags(Some(&joined)), tags);
    }
}
