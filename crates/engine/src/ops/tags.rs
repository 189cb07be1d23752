use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    Engine, EngineError, ResultEngine, Tag, listing,
    query::{Filters, QueryOptions},
    taggings,
    tags::{self, MAX_NAME_LEN, normalize_tag_names},
    util::now_unix,
    with_tx,
};

use super::{expenses::require_expense, into_domain};

impl Engine {
    /// Add a tag for `user_id`. Names are lower-cased and trimmed, and unique
    /// per user.
    pub async fn create_tag(&self, user_id: i64, name: &str) -> ResultEngine<Tag> {
        let name = validate_tag_name(name)?;
        if find_tag(&self.database, user_id, &name).await?.is_some() {
            return Err(EngineError::ExistingKey(name));
        }
        let model = insert_tag(&self.database, user_id, name).await?;
        Tag::try_from(model)
    }

    /// Delete a tag and detach it from every expense.
    pub async fn delete_tag(&self, id: i64, user_id: i64) -> ResultEngine<Tag> {
        with_tx!(self, |db_tx| {
            let model = tags::Entity::find_by_id(id)
                .filter(tags::Column::UserId.eq(user_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("tag {id}")))?;

            taggings::Entity::delete_many()
                .filter(taggings::Column::TagId.eq(id))
                .exec(&db_tx)
                .await?;
            tags::Entity::delete_by_id(id).exec(&db_tx).await?;

            Tag::try_from(model)
        })
    }

    pub async fn list_tags(&self, opts: QueryOptions) -> ResultEngine<Vec<Tag>> {
        let models = listing::list::<tags::Entity, _>(&self.database, opts).await?;
        into_domain(models)
    }

    pub async fn count_tags(&self, filters: &Filters) -> ResultEngine<u64> {
        listing::count::<tags::Entity, _>(&self.database, filters).await
    }

    /// Replace the tags of an expense.
    ///
    /// Missing tags are created for the user. An empty `names` detaches every
    /// tag. Returns the resulting tags ordered by name.
    pub async fn set_expense_tags(
        &self,
        expense_id: i64,
        user_id: i64,
        names: &[String],
    ) -> ResultEngine<Vec<Tag>> {
        let names = normalize_tag_names(names.iter().map(String::as_str));
        for name in &names {
            validate_tag_name(name)?;
        }

        with_tx!(self, |db_tx| {
            require_expense(&db_tx, expense_id, user_id).await?;

            let mut tag_ids = Vec::with_capacity(names.len());
            for name in &names {
                let model = match find_tag(&db_tx, user_id, name).await? {
                    Some(model) => model,
                    None => insert_tag(&db_tx, user_id, name.clone()).await?,
                };
                tag_ids.push(model.id);
            }

            taggings::Entity::delete_many()
                .filter(taggings::Column::TaggableType.eq(taggings::TAGGABLE_EXPENSE))
                .filter(taggings::Column::TaggableId.eq(expense_id))
                .exec(&db_tx)
                .await?;

            let now = now_unix();
            for tag_id in tag_ids {
                taggings::ActiveModel {
                    id: ActiveValue::NotSet,
                    tag_id: ActiveValue::Set(tag_id),
                    taggable_id: ActiveValue::Set(expense_id),
                    taggable_type: ActiveValue::Set(taggings::TAGGABLE_EXPENSE.to_string()),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
            }

            tags_of_expense(&db_tx, expense_id).await
        })
    }

    /// Tags attached to an expense, ordered by name.
    pub async fn expense_tags(&self, expense_id: i64, user_id: i64) -> ResultEngine<Vec<Tag>> {
        require_expense(&self.database, expense_id, user_id).await?;
        tags_of_expense(&self.database, expense_id).await
    }

    /// `(expense_id, tag_name)` pairs for a page of expenses, ordered by
    /// expense then name. Expenses without tags produce no pair.
    pub async fn expense_tag_rows(
        &self,
        expense_ids: &[i64],
        user_id: i64,
    ) -> ResultEngine<Vec<(i64, String)>> {
        if expense_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(taggings::Entity::find()
            .select_only()
            .column(taggings::Column::TaggableId)
            .column(tags::Column::Name)
            .inner_join(tags::Entity)
            .filter(taggings::Column::TaggableType.eq(taggings::TAGGABLE_EXPENSE))
            .filter(taggings::Column::TaggableId.is_in(expense_ids.iter().copied()))
            .filter(tags::Column::UserId.eq(user_id))
            .order_by_asc(taggings::Column::TaggableId)
            .order_by_asc(tags::Column::Name)
            .into_tuple::<(i64, String)>()
            .all(&self.database)
            .await?)
    }
}

fn validate_tag_name(name: &str) -> ResultEngine<String> {
    let name = name.trim().to_lowercase();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(EngineError::InvalidInput(format!(
            "tag name must be between 1 and {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

async fn find_tag<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    name: &str,
) -> ResultEngine<Option<tags::Model>> {
    Ok(tags::Entity::find()
        .filter(tags::Column::UserId.eq(user_id))
        .filter(tags::Column::Name.eq(name))
        .one(conn)
        .await?)
}

async fn insert_tag<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    name: String,
) -> ResultEngine<tags::Model> {
    let now = now_unix();
    Ok(tags::ActiveModel {
        id: ActiveValue::NotSet,
        user_id: ActiveValue::Set(user_id),
        name: ActiveValue::Set(name),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    }
    .insert(conn)
    .await?)
}

async fn tags_of_expense<C: ConnectionTrait>(conn: &C, expense_id: i64) -> ResultEngine<Vec<Tag>> {
    let models = tags::Entity::find()
        .inner_join(taggings::Entity)
        .filter(taggings::Column::TaggableType.eq(taggings::TAGGABLE_EXPENSE))
        .filter(taggings::Column::TaggableId.eq(expense_id))
        .order_by_asc(tags::Column::Name)
        .all(conn)
        .await?;
    into_domain(models)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_are_bounded() {
        assert_eq!(validate_tag_name(" Food ").unwrap(), "food");
        assert!(validate_tag_name("   ").is_err());
        assert!(validate_tag_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_tag_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }
}
