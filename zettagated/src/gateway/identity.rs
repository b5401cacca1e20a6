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

//! Caller-to-tenant resolution.
//!
//! Two strategies exist in production deployments: matching the peer
//! address against the directory report, and validating a per-tenant signed
//! cookie. Both live behind [`IdentityResolver`] and the deployment config
//! picks exactly one at startup.

use crate::directory::{DirectoryClient, DirectoryError};
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use client::{AuthStrategy, GatewayConfig};
use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("access forbidden")]
    Unknown,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// What a request brings along to identify itself.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub peer: IpAddr,
    pub cookies: Vec<(String, String)>,
}

impl RequestIdentity {
    pub fn new(peer: IpAddr, headers: &HeaderMap) -> Self {
        let cookies = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Self { peer, cookies }
    }
}

#[async_trait]
pub trait IdentityResolver: std::fmt::Debug + Send + Sync {
    /// Map a request identity to a tenant name, or refuse.
    async fn resolve(
        &self,
        identity: &RequestIdentity,
    ) -> Result<String, IdentityError>;
}

/// Match the caller's peer address against the container addresses the
/// directory report records.
#[derive(Debug)]
pub struct IpResolver {
    directory: Arc<DirectoryClient>,
}

impl IpResolver {
    pub fn new(directory: Arc<DirectoryClient>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl IdentityResolver for IpResolver {
    async fn resolve(
        &self,
        identity: &RequestIdentity,
    ) -> Result<String, IdentityError> {
        match self.directory.tenant_for_ip(identity.peer).await {
            Ok(tenant) => Ok(tenant),
            Err(DirectoryError::UnknownIp { .. }) => {
                Err(IdentityError::Unknown)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A cookie `name=value` authenticates `name` as the tenant when `value`
/// equals the salted token for that name.
#[derive(Debug)]
pub struct CookieResolver {
    salt: String,
}

impl CookieResolver {
    pub fn new<S: Into<String>>(salt: S) -> Self {
        Self { salt: salt.into() }
    }
}

#[async_trait]
impl IdentityResolver for CookieResolver {
    async fn resolve(
        &self,
        identity: &RequestIdentity,
    ) -> Result<String, IdentityError> {
        for (name, value) in &identity.cookies {
            if &client::token::signed_token(name, &self.salt) == value {
                return Ok(name.clone());
            }
        }
        Err(IdentityError::Unknown)
    }
}

/// Build the resolver the deployment asked for.
pub fn from_config(
    config: &GatewayConfig,
    directory: Arc<DirectoryClient>,
) -> anyhow::Result<Arc<dyn IdentityResolver>> {
    match config.auth {
        AuthStrategy::Ip => Ok(Arc::new(IpResolver::new(directory))),
        AuthStrategy::Cookie => {
            let salt = config.salt.as_ref().ok_or_else(|| {
                anyhow::anyhow!("cookie auth requires gateway.salt")
            })?;
            Ok(Arc::new(CookieResolver::new(salt.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(
            header::COOKIE,
            HeaderValue::from_str(cookie).expect("header"),
        );
        headers
    }

    #[tokio::test]
    async fn valid_signed_cookie_resolves_tenant() {
        let token = client::token::signed_token("alpha", "s3cr3t");
        let headers = headers_with_cookie(&format!("alpha={token}"));
        let identity =
            RequestIdentity::new("10.1.0.5".parse().expect("ip"), &headers);

        let resolver = CookieResolver::new("s3cr3t");
        let tenant =
            resolver.resolve(&identity).await.expect("resolved");
        assert_eq!(tenant, "alpha");
    }

    #[tokio::test]
    async fn forged_cookie_is_refused() {
        let token = client::token::signed_token("alpha", "wrong-salt");
        let headers = headers_with_cookie(&format!("alpha={token}"));
        let identity =
            RequestIdentity::new("10.1.0.5".parse().expect("ip"), &headers);

        let resolver = CookieResolver::new("s3cr3t");
        let result = resolver.resolve(&identity).await;
        assert!(matches!(result, Err(IdentityError::Unknown)));
    }

    #[tokio::test]
    async fn cookie_naming_another_tenant_is_refused() {
        // token signed for alpha presented under beta's name
        let token = client::token::signed_token("alpha", "s3cr3t");
        let headers = headers_with_cookie(&format!("beta={token}"));
        let identity =
            RequestIdentity::new("10.1.0.5".parse().expect("ip"), &headers);

        let resolver = CookieResolver::new("s3cr3t");
        let result = resolver.resolve(&identity).await;
        assert!(matches!(result, Err(IdentityError::Unknown)));
    }

    #[test]
    fn parses_multiple_cookie_pairs() {
        let headers = headers_with_cookie("a=1; b=2");
        let identity =
            RequestIdentity::new("10.1.0.5".parse().expect("ip"), &headers);
        assert_eq!(
            identity.cookies,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }
}
