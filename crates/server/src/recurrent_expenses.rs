//! Recurring expenses API endpoints.

use api_types::{
    Envelope, Meta,
    expense::ExpenseView,
    query::ListParams,
    recurrent_expense::RecurrentExpenseNew,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{RecurrentExpense, RecurrentExpenseParams, User, query::Sorting};

use crate::{
    ServerError, expenses::map_expense, list_params::scoped_query_options, server::ServerState,
};

fn recurrent_params(payload: RecurrentExpenseNew) -> RecurrentExpenseParams {
    RecurrentExpenseParams {
        category_id: payload.category_id,
        description: payload.description,
        amount: payload.amount,
        period: payload.period,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<RecurrentExpense>>>, ServerError> {
    let opts = scoped_query_options(&params, user.id, Sorting::new("id", "ASC"), Utc::now())?;
    let pagination = opts.pagination;
    let filters = opts.filters.clone();

    let recurrent = state.engine.list_recurrent_expenses(opts).await?;
    let rows = state.engine.count_recurrent_expenses(&filters).await?;

    Ok(Json(Envelope::list(
        recurrent,
        Meta::new(pagination.per_page, pagination.page, rows),
    )))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<RecurrentExpenseNew>,
) -> Result<(StatusCode, Json<Envelope<RecurrentExpense>>), ServerError> {
    let recurrent = state
        .engine
        .create_recurrent_expense(user.id, recurrent_params(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(recurrent))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<RecurrentExpense>>, ServerError> {
    let recurrent = state.engine.recurrent_expense(id, user.id).await?;
    Ok(Json(Envelope::data(recurrent)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RecurrentExpenseNew>,
) -> Result<Json<Envelope<RecurrentExpense>>, ServerError> {
    let recurrent = state
        .engine
        .update_recurrent_expense(id, user.id, recurrent_params(payload))
        .await?;
    Ok(Json(Envelope::data(recurrent)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_recurrent_expense(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Copy the recurring expense into a regular expense dated now.
pub async fn copy(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<Envelope<ExpenseView>>), ServerError> {
    let expense = state
        .engine
        .copy_recurrent_expense(id, user.id, Utc::now())
        .await?;
    let view = map_expense(expense, Vec::new());
    Ok((StatusCode::CREATED, Json(Envelope::data(view))))
}
