use api_types::{Envelope, Status};
use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, categories, expenses, recurrent_expenses, tags};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the Basic credentials to an [`engine::User`] stored in the
/// request extensions.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(ServerError::Unauthorized);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(ServerError::Unauthorized);
    }

    let user = match state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
    {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => return Err(ServerError::Unauthorized),
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn status() -> Json<Envelope<Status>> {
    Json(Envelope::data(Status {
        status: "ok".to_string(),
    }))
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/categories", get(categories::list))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route(
            "/expenses/{id}/tags",
            get(expenses::get_tags).put(expenses::set_tags),
        )
        .route("/tags", get(tags::list).post(tags::create))
        .route("/tags/{id}", axum::routing::delete(tags::delete))
        .route(
            "/recurrent_expenses",
            get(recurrent_expenses::list).post(recurrent_expenses::create),
        )
        .route(
            "/recurrent_expenses/{id}",
            get(recurrent_expenses::get)
                .put(recurrent_expenses::update)
                .delete(recurrent_expenses::delete),
        )
        .route(
            "/recurrent_expenses/{id}/copy",
            post(recurrent_expenses::copy),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/status", get(status))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
