//! Expenses API endpoints.

use std::collections::HashMap;

use api_types::{
    Envelope, Meta,
    expense::{ExpenseNew, ExpenseTagsSet, ExpenseView},
    query::ListParams,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Expense, ExpenseParams, Tag, User, parse_tag_names, query::Sorting};

use crate::{ServerError, list_params::scoped_query_options, server::ServerState};

pub(crate) fn map_expense(expense: Expense, tags: Vec<String>) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        category_id: expense.category_id,
        description: expense.description,
        amount: expense.amount,
        date: expense.date,
        tags,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

fn expense_params(payload: ExpenseNew) -> ExpenseParams {
    ExpenseParams {
        category_id: payload.category_id,
        description: payload.description,
        amount: payload.amount,
        date: payload.date.with_timezone(&Utc),
    }
}

fn tag_names(tags: Vec<Tag>) -> Vec<String> {
    tags.into_iter().map(|tag| tag.name).collect()
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<ExpenseView>>>, ServerError> {
    let opts = scoped_query_options(&params, user.id, Sorting::new("date", "DESC"), Utc::now())?;
    let pagination = opts.pagination;
    let filters = opts.filters.clone();

    let expenses = state.engine.list_expenses(opts).await?;
    let rows = state.engine.count_expenses(&filters).await?;

    let ids: Vec<i64> = expenses.iter().map(|expense| expense.id).collect();
    let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
    for (expense_id, name) in state.engine.expense_tag_rows(&ids, user.id).await? {
        tags.entry(expense_id).or_default().push(name);
    }

    let expenses = expenses
        .into_iter()
        .map(|expense| {
            let names = tags.remove(&expense.id).unwrap_or_default();
            map_expense(expense, names)
        })
        .collect();

    Ok(Json(Envelope::list(
        expenses,
        Meta::new(pagination.per_page, pagination.page, rows),
    )))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<Envelope<ExpenseView>>), ServerError> {
    let expense = state
        .engine
        .create_expense(user.id, expense_params(payload))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(map_expense(expense, Vec::new()))),
    ))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<ExpenseView>>, ServerError> {
    let expense = state.engine.expense(id, user.id).await?;
    let tags = state.engine.expense_tags(id, user.id).await?;
    Ok(Json(Envelope::data(map_expense(expense, tag_names(tags)))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<Envelope<ExpenseView>>, ServerError> {
    let expense = state
        .engine
        .update_expense(id, user.id, expense_params(payload))
        .await?;
    let tags = state.engine.expense_tags(id, user.id).await?;
    Ok(Json(Envelope::data(map_expense(expense, tag_names(tags)))))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_tags(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<Vec<Tag>>>, ServerError> {
    let tags = state.engine.expense_tags(id, user.id).await?;
    Ok(Json(Envelope::data(tags)))
}

/// Replace the tags of an expense with the `;` separated names in the body.
pub async fn set_tags(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ExpenseTagsSet>,
) -> Result<Json<Envelope<Vec<Tag>>>, ServerError> {
    let names = parse_tag_names(&payload.tags);
    let tags = state.engine.set_expense_tags(id, user.id, &names).await?;
    Ok(Json(Envelope::data(tags)))
}
