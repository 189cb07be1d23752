//! Users table.
//!
//! The password column never leaves the engine: [`User`] carries only the
//! public profile and the column is missing from the list allow-list.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, listing::Listable, util::from_unix};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Listable for Entity {
    const FIELDS: &'static [&'static str] = &["id", "username", "email", "created_at", "updated_at"];
    const SELECT: &'static str = r#"SELECT * FROM "users""#;
    const COUNT: &'static str = r#"SELECT COUNT(*) AS "count" FROM "users""#;
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_at: from_unix(model.created_at, "created_at")?,
            updated_at: from_unix(model.updated_at, "updated_at")?,
        })
    }
}
