/* -------------------------------------------------------------------------- *\
 *                |   █████╗ ██╗   ██╗██████╗  █████╗ ███████╗ |              *
 *                |  ██╔══██╗██║   ██║██╔══██╗██╔══██╗██╔════╝ |              *
 *                |  ███████║██║   ██║██████╔╝███████║█████╗   |              *
 *                |  ██╔══██║██║   ██║██╔══██╗██╔══██║██╔══╝   |              *
 *                |  ██║  ██║╚██████╔╝██║  ██║██║  ██║███████╗ |              *
 *                |  ╚═╝  ╚═╝ ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝╚══════╝ |              *
 *                +--------------------------------------------+              *
 *                                                                            *
 *                         Distributed Systems Runtime                        *
 * -------------------------------------------------------------------------- *
 * Copyright 2022 - 2024, the aurae contributors                              *
 * SPDX-License-Identifier: Apache-2.0                                        *
\* -------------------------------------------------------------------------- */

//! HTTP surface of the gateway.
//!
//! Every route runs behind the identity middleware, which stamps the
//! resolved [`Tenant`] onto the request. The handlers never see an
//! unauthenticated request.

pub use error::{GatewayError, Result};
pub use identity::{
    CookieResolver, IdentityResolver, IpResolver, RequestIdentity,
};
pub use reply::Reply;

mod error;
pub mod identity;
mod handlers;
mod reply;

use crate::zfs::dispatch::Dispatcher;
use crate::zfs::guard::PermissionGuard;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use reply::ErrorBody;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

/// The tenant name the identity middleware resolved for this request.
#[derive(Debug, Clone)]
pub struct Tenant(pub String);

#[derive(Clone)]
pub struct GatewayState {
    pub dispatcher: Arc<Dispatcher>,
    pub guard: Arc<PermissionGuard>,
    pub resolver: Arc<dyn IdentityResolver>,
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(handlers::usage))
        .route("/list", get(handlers::list))
        .route("/list/", get(handlers::list))
        .route("/create", post(handlers::create))
        .route("/create/", post(handlers::create))
        .route("/clone", post(handlers::clone_dataset))
        .route("/clone/", post(handlers::clone_dataset))
        .route("/set", post(handlers::set))
        .route("/set/", post(handlers::set))
        .route("/snap", post(handlers::snapshot))
        .route("/snap/", post(handlers::snapshot))
        .route("/snapshot", post(handlers::snapshot))
        .route("/snapshot/", post(handlers::snapshot))
        .route("/rename", post(handlers::rename))
        .route("/rename/", post(handlers::rename))
        .route("/mount", post(handlers::mount))
        .route("/mount/", post(handlers::mount))
        .route("/umount", post(handlers::umount))
        .route("/umount/", post(handlers::umount))
        .route("/unmount", post(handlers::umount))
        .route("/unmount/", post(handlers::umount))
        .route("/destroy", delete(handlers::destroy))
        .route("/destroy/", delete(handlers::destroy))
        .fallback(unknown_verb)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

async fn unknown_verb() -> Response {
    let body = ErrorBody { error: "unknown verb".into() };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

async fn authenticate(
    State(state): State<GatewayState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = RequestIdentity::new(peer.ip(), request.headers());
    match state.resolver.resolve(&identity).await {
        Ok(tenant) => {
            let _ = request.extensions_mut().insert(Tenant(tenant));
            next.run(request).await
        }
        Err(e) => {
            warn!(peer = %peer.ip(), "refused: {e}");
            GatewayError::from(e).into_response()
        }
    }
}
