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

use serde::Deserialize;

/// How the gateway serves and authenticates callers.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address, e.g. `0.0.0.0:8085`.
    pub bind_addr: String,
    /// Which identity strategy authenticates requests.
    #[serde(default)]
    pub auth: AuthStrategy,
    /// Deployment secret for the signed-cookie strategy.
    pub salt: Option<String>,
}

/// Identity strategies seen in production deployments; the deployment picks
/// exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrategy {
    /// Match the caller's peer address against the directory report.
    #[default]
    Ip,
    /// Validate a per-tenant signed cookie.
    Cookie,
}
