use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Users::Table)
                    .col(pk_uuid_col(Users::Id))
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(timestamp_col(Users::CreatedAt))
                    .col(timestamp_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Tasks::Table)
                    .col(pk_uuid_col(Tasks::Id))
                    .col(ColumnDef::new(Tasks::UserId).uuid().not_null())
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text())
                    .col(ColumnDef::new(Tasks::DueDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Tasks::Priority)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("medium")),
                    )
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("pending")),
                    )
                    .col(ColumnDef::new(Tasks::Category).string())
                    .col(ColumnDef::new(Tasks::EstimatedMinutes).integer())
                    .col(ColumnDef::new(Tasks::ActualMinutes).integer())
                    .col(
                        ColumnDef::new(Tasks::IsRecurring)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(ColumnDef::new(Tasks::RecurringPattern).string())
                    .col(ColumnDef::new(Tasks::Tags).text())
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(timestamp_col(Tasks::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_user_id")
                            .from(Tasks::Table, Tasks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_user_id_due_date")
                    .table(Tasks::Table)
                    .col(Tasks::UserId)
                    .col(Tasks::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_user_id_status")
                    .table(Tasks::Table)
                    .col(Tasks::UserId)
                    .col(Tasks::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(CalendarSettings::Table)
                    .col(pk_uuid_col(CalendarSettings::Id))
                    .col(ColumnDef::new(CalendarSettings::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(CalendarSettings::CalendarId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CalendarSettings::CalendarType)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("other_personal")),
                    )
                    .col(
                        ColumnDef::new(CalendarSettings::Visible)
                            .boolean()
                            .not_null()
                            .default(Expr::val(true)),
                    )
                    .col(
                        ColumnDef::new(CalendarSettings::ConsiderInConflicts)
                            .boolean()
                            .not_null()
                            .default(Expr::val(true)),
                    )
                    .col(ColumnDef::new(CalendarSettings::Summary).string())
                    .col(ColumnDef::new(CalendarSettings::Description).text())
                    .col(ColumnDef::new(CalendarSettings::BackgroundColor).string())
                    .col(timestamp_col(CalendarSettings::CreatedAt))
                    .col(timestamp_col(CalendarSettings::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_calendar_settings_user_id")
                            .from(CalendarSettings::Table, CalendarSettings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_calendar_settings_user_id_calendar_id")
                    .table(CalendarSettings::Table)
                    .col(CalendarSettings::UserId)
                    .col(CalendarSettings::CalendarId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CalendarSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    UserId,
    Title,
    Description,
    DueDate,
    Priority,
    Status,
    Category,
    EstimatedMinutes,
    ActualMinutes,
    IsRecurring,
    RecurringPattern,
    Tags,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CalendarSettings {
    Table,
    Id,
    UserId,
    CalendarId,
    CalendarType,
    Visible,
    ConsiderInConflicts,
    Summary,
    Description,
    BackgroundColor,
    CreatedAt,
    UpdatedAt,
}
