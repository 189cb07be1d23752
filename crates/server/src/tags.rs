//! Tags API endpoints.

use api_types::{Envelope, Meta, query::ListParams, tag::TagNew};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Tag, User, query::Sorting};

use crate::{ServerError, list_params::scoped_query_options, server::ServerState};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<Tag>>>, ServerError> {
    let opts = scoped_query_options(&params, user.id, Sorting::new("id", "ASC"), Utc::now())?;
    let pagination = opts.pagination;
    let filters = opts.filters.clone();

    let tags = state.engine.list_tags(opts).await?;
    let rows = state.engine.count_tags(&filters).await?;

    Ok(Json(Envelope::list(
        tags,
        Meta::new(pagination.per_page, pagination.page, rows),
    )))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TagNew>,
) -> Result<(StatusCode, Json<Envelope<Tag>>), ServerError> {
    let tag = state.engine.create_tag(user.id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(tag))))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_tag(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
