//! Per-user tags, attached to expenses through taggings.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    EngineError,
    listing::Listable,
    util::{from_unix, normalize_lower_trim},
};

/// Longest tag name, in characters.
pub(crate) const MAX_NAME_LEN: usize = 20;

/// Separator used when tags are typed as a single string.
const NAME_SEPARATOR: char = ';';

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
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
    #[sea_orm(has_many = "super::taggings::Entity")]
    Taggings,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::taggings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Taggings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Listable for Entity {
    const FIELDS: &'static [&'static str] = &["id", "user_id", "name", "created_at", "updated_at"];
    const SELECT: &'static str = r#"SELECT * FROM "tags""#;
    const COUNT: &'static str = r#"SELECT COUNT(*) AS "count" FROM "tags""#;
}

impl TryFrom<Model> for Tag {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            created_at: from_unix(model.created_at, "created_at")?,
            updated_at: from_unix(model.updated_at, "updated_at")?,
        })
    }
}

/// Splits `"Food; travel ;food"` into `["food", "travel"]`.
///
/// Names are trimmed and lower-cased; blanks and duplicates are dropped while
/// keeping the first occurrence order.
pub fn parse_tag_names(raw: &str) -> Vec<String> {
    normalize_tag_names(raw.split(NAME_SEPARATOR))
}

pub(crate) fn normalize_tag_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = normalize_lower_trim(name);
        if name.is_empty() || out.contains(&name) {
            continue;
        }
        out.push(name);
    }
    out
}
