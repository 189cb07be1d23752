//! Initial schema.
//!
//! - `users`: HTTP Basic credentials
//! - `categories`: shared expense categories, keyed by a lowerCamel `uid`
//! - `expenses`: dated expenses owned by a user
//! - `recurrent_expenses`: templates copied into `expenses` every `period` months
//! - `tags` / `taggings`: per-user tags attached to expenses
//!
//! Every timestamp is unix seconds.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    Password,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    Uid,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    UserId,
    CategoryId,
    Description,
    Amount,
    Date,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RecurrentExpenses {
    Table,
    Id,
    UserId,
    CategoryId,
    Description,
    Amount,
    Period,
    LastCopyCreatedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    UserId,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Taggings {
    Table,
    Id,
    TagId,
    TaggableId,
    TaggableType,
    CreatedAt,
    UpdatedAt,
}

fn id_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .big_integer()
        .not_null()
        .default(Expr::cust("(strftime('%s', 'now'))"))
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id_col(Users::Id))
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(&mut timestamp_col(Users::CreatedAt))
                    .col(&mut timestamp_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(&mut id_col(Categories::Id))
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(
                        ColumnDef::new(Categories::Uid)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(&mut timestamp_col(Categories::CreatedAt))
                    .col(&mut timestamp_col(Categories::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(&mut id_col(Expenses::Id))
                    .col(ColumnDef::new(Expenses::UserId).integer().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Date).big_integer().not_null())
                    .col(&mut timestamp_col(Expenses::CreatedAt))
                    .col(&mut timestamp_col(Expenses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-user_id")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Recurrent expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(RecurrentExpenses::Table)
                    .if_not_exists()
                    .col(&mut id_col(RecurrentExpenses::Id))
                    .col(
                        ColumnDef::new(RecurrentExpenses::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrentExpenses::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrentExpenses::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrentExpenses::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrentExpenses::Period)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurrentExpenses::LastCopyCreatedAt).big_integer())
                    .col(&mut timestamp_col(RecurrentExpenses::CreatedAt))
                    .col(&mut timestamp_col(RecurrentExpenses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recurrent_expenses-user_id")
                            .from(RecurrentExpenses::Table, RecurrentExpenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recurrent_expenses-category_id")
                            .from(RecurrentExpenses::Table, RecurrentExpenses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(&mut id_col(Tags::Id))
                    .col(ColumnDef::new(Tags::UserId).integer().not_null())
                    .col(ColumnDef::new(Tags::Name).string_len(20).not_null())
                    .col(&mut timestamp_col(Tags::CreatedAt))
                    .col(&mut timestamp_col(Tags::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tags-user_id")
                            .from(Tags::Table, Tags::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tags-user_id-name")
                    .table(Tags::Table)
                    .col(Tags::UserId)
                    .col(Tags::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Taggings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Taggings::Table)
                    .if_not_exists()
                    .col(&mut id_col(Taggings::Id))
                    .col(ColumnDef::new(Taggings::TagId).integer().not_null())
                    .col(ColumnDef::new(Taggings::TaggableId).integer().not_null())
                    .col(ColumnDef::new(Taggings::TaggableType).string().not_null())
                    .col(&mut timestamp_col(Taggings::CreatedAt))
                    .col(&mut timestamp_col(Taggings::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-taggings-tag_id")
                            .from(Taggings::Table, Taggings::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-taggings-tag_id-taggable")
                    .table(Taggings::Table)
                    .col(Taggings::TagId)
                    .col(Taggings::TaggableId)
                    .col(Taggings::TaggableType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-taggings-taggable")
                    .table(Taggings::Table)
                    .col(Taggings::TaggableType)
                    .col(Taggings::TaggableId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Taggings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurrentExpenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
