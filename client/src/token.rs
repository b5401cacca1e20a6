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

//! Per-tenant signed cookie tokens.
//!
//! A token authenticates a tenant name without the gateway having to keep
//! per-tenant secrets: `hex(sha256(name) ^ sha256(salt))`. Both the gateway
//! (verification) and clients (presentation) derive it the same way.

use sha2::{Digest, Sha256};

/// Derive the signed cookie value for `tenant` under the deployment `salt`.
pub fn signed_token(tenant: &str, salt: &str) -> String {
    let name_digest = Sha256::digest(tenant.as_bytes());
    let salt_digest = Sha256::digest(salt.as_bytes());
    let xored: Vec<u8> = name_digest
        .iter()
        .zip(salt_digest.iter())
        .map(|(a, b)| a ^ b)
        .collect();
    hex::encode(xored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_stable_and_salted() {
        let token = signed_token("alpha", "s3cr3t");
        assert_eq!(token, signed_token("alpha", "s3cr3t"));
        assert_ne!(token, signed_token("alpha", "other"));
        assert_ne!(token, signed_token("beta", "s3cr3t"));
        // 32 xored bytes, hex encoded
        assert_eq!(token.len(), 64);
    }
}
