use sea_orm::{ActiveValue, QueryFilter, prelude::*};

use crate::{
    Category, Engine, EngineError, ResultEngine, categories, listing,
    query::{Filters, Pagination, QueryOptions, Sorting},
    util::{normalize_text, now_unix, to_lower_camel},
};

use super::into_domain;

impl Engine {
    /// Add a category. The uid is the lowerCamel form of the name and must
    /// be unique.
    pub async fn create_category(&self, name: &str) -> ResultEngine<Category> {
        let name = normalize_text(name, "category name", 1, 50)?;
        let uid = to_lower_camel(&name);
        if uid.is_empty() {
            return Err(EngineError::InvalidInput(
                "category name must contain letters or digits".to_string(),
            ));
        }

        let existing = categories::Entity::find()
            .filter(categories::Column::Uid.eq(uid.clone()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(uid));
        }

        let now = now_unix();
        let model = categories::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            uid: ActiveValue::Set(uid),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.database)
        .await?;

        Category::try_from(model)
    }

    /// All categories ordered by name.
    pub async fn categories(&self) -> ResultEngine<Vec<Category>> {
        let opts = QueryOptions::new(
            Filters::default(),
            Sorting::new("name", "ASC"),
            Pagination::default(),
        );
        let models = listing::list::<categories::Entity, _>(&self.database, opts).await?;
        into_domain(models)
    }

    pub async fn category(&self, id: i64) -> ResultEngine<Category> {
        categories::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("category {id}")))
            .and_then(Category::try_from)
    }
}
