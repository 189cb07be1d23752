//! Categories API endpoints.

use api_types::Envelope;
use axum::{Extension, Json, extract::State};
use engine::{Category, User};

use crate::{ServerError, server::ServerState};

/// All categories, ordered by name. Categories are shared by every user.
pub async fn list(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<Category>>>, ServerError> {
    let categories = state.engine.categories().await?;
    Ok(Json(Envelope::data(categories)))
}
