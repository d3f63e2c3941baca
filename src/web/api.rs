use super::{ApiContext, DayQuery};
use crate::{day::DayToken, hansik::Hansik, models::MenuResponse, signals::shutdown_signal};
use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer, trace::TraceLayer};
use tracing::{debug, info, trace};

pub async fn serve(hansik: Hansik, addr: &str) -> anyhow::Result<()> {
    trace!(addr, "Starting HTTP API server...");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!(addr, "Listening");
    axum::serve(listener, api_router(ApiContext { hansik }))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("failed to start HTTP API server")
}

// Lookups are bounded inside Hansik. A timeout layer would answer 408 with an empty body.
fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .merge(router())
        .layer((
            CompressionLayer::new(),
            TraceLayer::new_for_http().on_failure(()),
            CatchPanicLayer::new(),
        ))
        .with_state(ctx)
}

fn router() -> Router<ApiContext> {
    Router::new().route("/api/hansik", get(get_menu))
}

/// Always answers 200. Failures are reported in the `error` field, with placeholder menus.
async fn get_menu(
    ctx: State<ApiContext>,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> Json<MenuResponse> {
    let query = match query {
        Ok(Query(q)) => q,
        Err(err) => {
            debug!(%err, "Ignoring malformed query");
            DayQuery::default()
        }
    };
    let token = DayToken::parse(query.day.as_deref());

    let start = Instant::now();
    let res = ctx.hansik.menu(token).await;
    trace!(%token, degraded = res.error.is_some(), "Fetched menu in {:?}", start.elapsed());
    Json(res)
}
