//! Recurring expenses.
//!
//! A recurring expense is a template copied into a regular expense once every
//! `period` months. `last_copy_created_at` is `None` until the first copy.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, listing::Listable, util::from_unix};

/// Longest supported period, in months.
pub(crate) const MAX_PERIOD: i64 = 24;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrentExpense {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub description: String,
    pub amount: i64,
    /// Months between two copies.
    pub period: i64,
    pub last_copy_created_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrentExpenseParams {
    pub category_id: i64,
    pub description: String,
    pub amount: i64,
    pub period: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recurrent_expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub description: String,
    pub amount: i64,
    pub period: i64,
    pub last_copy_created_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Listable for Entity {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "user_id",
        "category_id",
        "description",
        "amount",
        "period",
        "last_copy_created_at",
        "created_at",
        "updated_at",
    ];
    const SELECT: &'static str = r#"SELECT * FROM "recurrent_expenses""#;
    const COUNT: &'static str = r#"SELECT COUNT(*) AS "count" FROM "recurrent_expenses""#;
}

/// Rows never copied, or whose whole months since the last copy reached
/// `period`. Binds the current unix time five times.
pub(crate) const SELECT_DUE: &str = r#"SELECT * FROM "recurrent_expenses"
WHERE "last_copy_created_at" IS NULL
   OR (
        CASE
          WHEN CAST(strftime('%d', datetime(?, 'unixepoch')) AS INTEGER) <
               CAST(strftime('%d', datetime("last_copy_created_at", 'unixepoch')) AS INTEGER)
          THEN (
            (CAST(strftime('%Y', datetime(?, 'unixepoch')) AS INTEGER) -
             CAST(strftime('%Y', datetime("last_copy_created_at", 'unixepoch')) AS INTEGER)) * 12 +
            (CAST(strftime('%m', datetime(?, 'unixepoch')) AS INTEGER) -
             CAST(strftime('%m', datetime("last_copy_created_at", 'unixepoch')) AS INTEGER)) - 1
          )
          ELSE (
            (CAST(strftime('%Y', datetime(?, 'unixepoch')) AS INTEGER) -
             CAST(strftime('%Y', datetime("last_copy_created_at", 'unixepoch')) AS INTEGER)) * 12 +
            (CAST(strftime('%m', datetime(?, 'unixepoch')) AS INTEGER) -
             CAST(strftime('%m', datetime("last_copy_created_at", 'unixepoch')) AS INTEGER))
          )
        END
      ) >= "period""#;

pub(crate) const SELECT_DUE_BINDS: usize = 5;

impl TryFrom<Model> for RecurrentExpense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            description: model.description,
            amount: model.amount,
            period: model.period,
            last_copy_created_at: model
                .last_copy_created_at
                .map(|secs| from_unix(secs, "last_copy_created_at"))
                .transpose()?,
            created_at: from_unix(model.created_at, "created_at")?,
            updated_at: from_unix(model.updated_at, "updated_at")?,
        })
    }
}
