use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    Engine, EngineError, Expense, ExpenseParams, ResultEngine, categories, expenses, listing,
    query::{Filters, QueryOptions},
    taggings,
    util::{normalize_text, now_unix, validate_amount},
    with_tx,
};

use super::into_domain;

impl Engine {
    pub async fn create_expense(
        &self,
        user_id: i64,
        params: ExpenseParams,
    ) -> ResultEngine<Expense> {
        let params = validate_expense_params(params)?;
        require_category(&self.database, params.category_id).await?;

        let model = expenses::ActiveModel::new_expense(user_id, &params, now_unix())
            .insert(&self.database)
            .await?;
        Expense::try_from(model)
    }

    /// Fetch an expense owned by `user_id`.
    pub async fn expense(&self, id: i64, user_id: i64) -> ResultEngine<Expense> {
        let model = require_expense(&self.database, id, user_id).await?;
        Expense::try_from(model)
    }

    pub async fn update_expense(
        &self,
        id: i64,
        user_id: i64,
        params: ExpenseParams,
    ) -> ResultEngine<Expense> {
        let params = validate_expense_params(params)?;
        let model = require_expense(&self.database, id, user_id).await?;
        require_category(&self.database, params.category_id).await?;

        let mut active: expenses::ActiveModel = model.into();
        active.category_id = ActiveValue::Set(params.category_id);
        active.description = ActiveValue::Set(params.description);
        active.amount = ActiveValue::Set(params.amount);
        active.date = ActiveValue::Set(params.date.timestamp());
        active.updated_at = ActiveValue::Set(now_unix());

        let model = active.update(&self.database).await?;
        Expense::try_from(model)
    }

    /// Delete an expense and its taggings, returning the deleted row.
    pub async fn delete_expense(&self, id: i64, user_id: i64) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = require_expense(&db_tx, id, user_id).await?;

            taggings::Entity::delete_many()
                .filter(taggings::Column::TaggableType.eq(taggings::TAGGABLE_EXPENSE))
                .filter(taggings::Column::TaggableId.eq(id))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(id).exec(&db_tx).await?;

            Expense::try_from(model)
        })
    }

    /// List expenses.
    ///
    /// Callers scope the listing to a user by adding a `user_id` filter.
    pub async fn list_expenses(&self, opts: QueryOptions) -> ResultEngine<Vec<Expense>> {
        let models = listing::list::<expenses::Entity, _>(&self.database, opts).await?;
        into_domain(models)
    }

    pub async fn count_expenses(&self, filters: &Filters) -> ResultEngine<u64> {
        listing::count::<expenses::Entity, _>(&self.database, filters).await
    }
}

fn validate_expense_params(params: ExpenseParams) -> ResultEngine<ExpenseParams> {
    validate_amount(params.amount)?;
    Ok(ExpenseParams {
        description: normalize_text(&params.description, "description", 3, 50)?,
        ..params
    })
}

pub(super) async fn require_expense<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    user_id: i64,
) -> ResultEngine<expenses::Model> {
    expenses::Entity::find_by_id(id)
        .filter(expenses::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("expense {id}")))
}

pub(super) async fn require_category<C: ConnectionTrait>(
    conn: &C,
    category_id: i64,
) -> ResultEngine<()> {
    categories::Entity::find_by_id(category_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| EngineError::InvalidInput(format!("unknown category {category_id}")))
}
