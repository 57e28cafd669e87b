use sea_orm::entity::prelude::*;

use crate::types::CalendarType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "calendar_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub calendar_id: String,
    pub calendar_type: CalendarType,
    pub visible: bool,
    pub consider_in_conflicts: bool,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub background_color: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
