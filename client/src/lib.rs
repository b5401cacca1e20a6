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

//! Configuration and a typed HTTP client for the zettagate gateway.
//!
//! The daemon consumes [`config::GateConfig`]; tooling and tests consume
//! [`GateClient`] to talk to a running gateway.

#![warn(future_incompatible, nonstandard_style, unused)]
#![warn(clippy::unwrap_used)]

use thiserror::Error;

pub mod config;
pub mod token;

pub use config::{
    AuthStrategy, DirectoryConfig, ExecutorConfig, GateConfig, GatewayConfig,
};

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    ConnectionError(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// HTTP client for the gateway API.
///
/// Every dataset verb maps to one request; arguments are passed as ordered
/// query pairs with the positional target in `last`.
#[derive(Debug, Clone)]
pub struct GateClient {
    base_url: String,
    cookie: Option<String>,
    http: reqwest::Client,
}

impl GateClient {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            cookie: None,
            http: reqwest::Client::new(),
        }
    }

    /// Authenticate as `tenant` using the signed-cookie strategy.
    pub fn with_signed_cookie(mut self, tenant: &str, salt: &str) -> Self {
        self.cookie =
            Some(format!("{tenant}={}", token::signed_token(tenant, salt)));
        self
    }

    pub async fn get(
        &self,
        verb: &str,
        args: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        self.request(reqwest::Method::GET, verb, args).await
    }

    pub async fn post(
        &self,
        verb: &str,
        args: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        self.request(reqwest::Method::POST, verb, args).await
    }

    pub async fn delete(
        &self,
        verb: &str,
        args: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        self.request(reqwest::Method::DELETE, verb, args).await
    }

    async fn request(
        &self,
        method: reqwest::Method,
        verb: &str,
        args: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        let url = format!("{}/{verb}", self.base_url.trim_end_matches('/'));
        let mut request = self.http.request(method, url).query(args);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        let response = request.send().await?;
        Ok(response.json().await?)
    }
}
