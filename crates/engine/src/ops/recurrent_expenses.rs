use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    Engine, EngineError, Expense, ExpenseParams, RecurrentExpense, RecurrentExpenseParams,
    ResultEngine, expenses,
    listing::{self, Listable},
    query::{FilterValue, Filters, Pagination, QueryOptions, Sorting},
    recurrent_expenses::{self, MAX_PERIOD, SELECT_DUE, SELECT_DUE_BINDS},
    util::{from_unix, months_between, normalize_text, now_unix, validate_amount},
    with_tx,
};

use super::{expenses::require_category, into_domain};

impl Engine {
    pub async fn create_recurrent_expense(
        &self,
        user_id: i64,
        params: RecurrentExpenseParams,
    ) -> ResultEngine<RecurrentExpense> {
        let params = validate_recurrent_params(params)?;
        require_category(&self.database, params.category_id).await?;

        let now = now_unix();
        let model = recurrent_expenses::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            category_id: ActiveValue::Set(params.category_id),
            description: ActiveValue::Set(params.description),
            amount: ActiveValue::Set(params.amount),
            period: ActiveValue::Set(params.period),
            last_copy_created_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.database)
        .await?;

        RecurrentExpense::try_from(model)
    }

    pub async fn recurrent_expense(&self, id: i64, user_id: i64) -> ResultEngine<RecurrentExpense> {
        let model = require_recurrent(&self.database, id, user_id).await?;
        RecurrentExpense::try_from(model)
    }

    /// Update the template. `last_copy_created_at` is left untouched.
    pub async fn update_recurrent_expense(
        &self,
        id: i64,
        user_id: i64,
        params: RecurrentExpenseParams,
    ) -> ResultEngine<RecurrentExpense> {
        let params = validate_recurrent_params(params)?;
        let model = require_recurrent(&self.database, id, user_id).await?;
        require_category(&self.database, params.category_id).await?;

        let mut active: recurrent_expenses::ActiveModel = model.into();
        active.category_id = ActiveValue::Set(params.category_id);
        active.description = ActiveValue::Set(params.description);
        active.amount = ActiveValue::Set(params.amount);
        active.period = ActiveValue::Set(params.period);
        active.updated_at = ActiveValue::Set(now_unix());

        let model = active.update(&self.database).await?;
        RecurrentExpense::try_from(model)
    }

    pub async fn delete_recurrent_expense(
        &self,
        id: i64,
        user_id: i64,
    ) -> ResultEngine<RecurrentExpense> {
        let model = require_recurrent(&self.database, id, user_id).await?;
        recurrent_expenses::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        RecurrentExpense::try_from(model)
    }

    pub async fn list_recurrent_expenses(
        &self,
        opts: QueryOptions,
    ) -> ResultEngine<Vec<RecurrentExpense>> {
        let models =
            listing::list::<recurrent_expenses::Entity, _>(&self.database, opts).await?;
        into_domain(models)
    }

    pub async fn count_recurrent_expenses(&self, filters: &Filters) -> ResultEngine<u64> {
        listing::count::<recurrent_expenses::Entity, _>(&self.database, filters).await
    }

    /// Recurring expenses of every user that are due at `now`.
    ///
    /// Only sorting and pagination apply; an empty sorting falls back to
    /// `"id" ASC`.
    pub async fn due_recurrent_expenses(
        &self,
        now: DateTime<Utc>,
        sorting: Sorting,
        pagination: Pagination,
    ) -> ResultEngine<Vec<RecurrentExpense>> {
        let sorting = if sorting.is_empty() {
            Sorting::new("id", "ASC")
        } else {
            sorting
        };
        let mut opts = QueryOptions::new(Filters::default(), sorting, pagination);
        let suffix = opts.build()?;
        opts.validate(recurrent_expenses::Entity::FIELDS)?;

        let values = vec![FilterValue::from(now); SELECT_DUE_BINDS];
        let stmt = listing::statement(
            self.database.get_database_backend(),
            SELECT_DUE,
            &suffix,
            values,
        );
        let models = recurrent_expenses::Entity::find()
            .from_raw_sql(stmt)
            .all(&self.database)
            .await?;
        into_domain(models)
    }

    /// Copy a recurring expense into an expense dated `now`.
    ///
    /// Fails with [`EngineError::ExistingKey`] when the current period already
    /// has a copy.
    pub async fn copy_recurrent_expense(
        &self,
        id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = require_recurrent(&db_tx, id, user_id).await?;
            if let Some(last) = model.last_copy_created_at {
                let last = from_unix(last, "last_copy_created_at")?;
                if months_between(last, now) < model.period {
                    return Err(EngineError::ExistingKey(format!(
                        "recurrent expense {id} already copied this period"
                    )));
                }
            }

            let params = ExpenseParams {
                category_id: model.category_id,
                description: model.description.clone(),
                amount: model.amount,
                date: now,
            };
            let expense = expenses::ActiveModel::new_expense(model.user_id, &params, now_unix())
                .insert(&db_tx)
                .await?;

            let mut active: recurrent_expenses::ActiveModel = model.into();
            active.last_copy_created_at = ActiveValue::Set(Some(now.timestamp()));
            active.updated_at = ActiveValue::Set(now_unix());
            active.update(&db_tx).await?;

            Expense::try_from(expense)
        })
    }

    /// Copy every due recurring expense. Returns how many expenses were
    /// created.
    pub async fn copy_due_recurrent_expenses(&self, now: DateTime<Utc>) -> ResultEngine<u64> {
        let due = self
            .due_recurrent_expenses(now, Sorting::default(), Pagination::default())
            .await?;

        let mut copied = 0;
        for recurrent in due {
            match self
                .copy_recurrent_expense(recurrent.id, recurrent.user_id, now)
                .await
            {
                Ok(_) => copied += 1,
                // Copied concurrently since the due query ran.
                Err(EngineError::ExistingKey(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(copied)
    }
}

fn validate_recurrent_params(
    params: RecurrentExpenseParams,
) -> ResultEngine<RecurrentExpenseParams> {
    validate_amount(params.amount)?;
    if !(1..=MAX_PERIOD).contains(&params.period) {
        return Err(EngineError::InvalidInput(format!(
            "period must be between 1 and {MAX_PERIOD} months"
        )));
    }
    Ok(RecurrentExpenseParams {
        description: normalize_text(&params.description, "description", 3, 50)?,
        ..params
    })
}

async fn require_recurrent<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    user_id: i64,
) -> ResultEngine<recurrent_expenses::Model> {
    recurrent_expenses::Entity::find_by_id(id)
        .filter(recurrent_expenses::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("recurrent expense {id}")))
}
