//! Expense primitives.
//!
//! Amounts are integer minor units; `date` is stored as unix seconds.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, listing::Listable, util::from_unix};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub description: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or updating an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseParams {
    pub category_id: i64,
    pub description: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub description: String,
    pub amount: i64,
    pub date: i64,
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
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
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
        "date",
        "created_at",
        "updated_at",
    ];
    const SELECT: &'static str = r#"SELECT * FROM "expenses""#;
    const COUNT: &'static str = r#"SELECT COUNT(*) AS "count" FROM "expenses""#;
}

impl ActiveModel {
    /// Active model for a new expense stamped at `now` (unix seconds).
    pub(crate) fn new_expense(user_id: i64, params: &ExpenseParams, now: i64) -> Self {
        Self {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            category_id: ActiveValue::Set(params.category_id),
            description: ActiveValue::Set(params.description.clone()),
            amount: ActiveValue::Set(params.amount),
            date: ActiveValue::Set(params.date.timestamp()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            description: model.description,
            amount: model.amount,
            date: from_unix(model.date, "date")?,
            created_at: from_unix(model.created_at, "created_at")?,
            updated_at: from_unix(model.updated_at, "updated_at")?,
        })
    }
}
