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

use super::identity::IdentityError;
use super::reply::ErrorBody;
use crate::zfs::ZfsError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The caller could not be mapped to any tenant.
    #[error("access forbidden")]
    IdentityFailure,
    /// The caller is a known tenant but the target dataset is not theirs.
    #[error("access forbidden")]
    AuthorizationFailure,
    #[error("{0}")]
    BadInput(String),
    #[error(transparent)]
    Zfs(#[from] ZfsError),
}

impl From<IdentityError> for GatewayError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Unknown => GatewayError::IdentityFailure,
            IdentityError::Directory(e) => {
                GatewayError::Zfs(ZfsError::Directory(e))
            }
        }
    }
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::IdentityFailure
            | GatewayError::AuthorizationFailure
            | GatewayError::Zfs(ZfsError::ForbiddenOption { .. }) => {
                StatusCode::FORBIDDEN
            }
            GatewayError::BadInput(_)
            | GatewayError::Zfs(ZfsError::MissingArgument(_))
            | GatewayError::Zfs(ZfsError::UnexpectedArgument { .. }) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Zfs(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody { error: self.to_string() };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn forbidden_option_maps_to_403() {
        let error = GatewayError::Zfs(ZfsError::ForbiddenOption {
            option: "compression".into(),
        });
        assert_eq!(error.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn execution_failure_maps_to_502() {
        let error = GatewayError::Zfs(ZfsError::Execution {
            command: "/usr/bin/zfs list".into(),
            stderr: "permission denied".into(),
        });
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn identity_and_authorization_share_a_message() {
        assert_eq!(
            GatewayError::IdentityFailure.to_string(),
            GatewayError::AuthorizationFailure.to_string()
        );
    }
}
