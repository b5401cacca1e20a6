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

//! Structured command lines for the remote transport.
//!
//! Commands are built from a program and a token list and only serialized at
//! the transport boundary. Every token is quoted unless it is provably
//! inert, so tenant-influenced substrings (dataset names, mount paths)
//! cannot smuggle shell syntax into the remote side.

use std::fmt::{Display, Formatter};

pub const ZFS_BIN: &str = "/usr/bin/zfs";
pub const LXC_ATTACH_BIN: &str = "lxc-attach";

/// A command line under construction: one program, zero or more tokens.
#[derive(Debug, Clone)]
pub struct CommandLine {
    program: String,
    tokens: Vec<String>,
}

impl CommandLine {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self { program: program.into(), tokens: vec![] }
    }

    /// A `zfs <verb>` invocation. An empty verb is the bare usage call.
    pub fn zfs(verb: &str) -> Self {
        let mut line = Self { program: ZFS_BIN.to_string(), tokens: vec![] };
        if !verb.is_empty() {
            line.tokens.push(verb.to_string());
        }
        line
    }

    /// An `lxc-attach -e -n <tenant> -- <program>` invocation, executing
    /// inside the tenant's mount namespace.
    pub fn lxc_attach(tenant: &str, program: &str) -> Self {
        Self {
            program: LXC_ATTACH_BIN.to_string(),
            tokens: vec![
                "-e".to_string(),
                "-n".to_string(),
                tenant.to_string(),
                "--".to_string(),
                program.to_string(),
            ],
        }
    }

    pub fn arg<S: Into<String>>(mut self, token: S) -> Self {
        self.tokens.push(token.into());
        self
    }

    pub fn args<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Serialize to the transport's command syntax with per-token quoting.
    pub fn render(&self) -> String {
        let mut rendered = self.program.clone();
        for token in &self.tokens {
            rendered.push(' ');
            rendered.push_str(&quote(token));
        }
        rendered
    }
}

impl Display for CommandLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

fn is_inert(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '@' | '_' | '-' | '.' | '/' | '=' | ',' | ':')
        })
}

/// Single-quote a token unless every character is inert.
fn quote(token: &str) -> String {
    if is_inert(token) {
        return token.to_string();
    }
    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('\'');
    for c in token.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_tokens_render_unquoted() {
        let line = CommandLine::zfs("list").args(["-t", "all"]);
        assert_eq!(line.render(), "/usr/bin/zfs list -t all");
    }

    #[test]
    fn bare_usage_renders_program_only() {
        assert_eq!(CommandLine::zfs("").render(), "/usr/bin/zfs");
    }

    #[test]
    fn hostile_tokens_are_quoted() {
        let line = CommandLine::zfs("destroy").arg("tank/a; rm -rf /");
        assert_eq!(
            line.render(),
            "/usr/bin/zfs destroy 'tank/a; rm -rf /'"
        );
    }

    #[test]
    fn embedded_single_quote_cannot_escape() {
        let line = CommandLine::zfs("destroy").arg("a'b");
        assert_eq!(line.render(), "/usr/bin/zfs destroy 'a'\\''b'");
    }

    #[test]
    fn lxc_attach_runs_inside_tenant() {
        let line = CommandLine::lxc_attach("alpha", "/bin/mount")
            .args(["-t", "zfs", "tank/alpha/vol", "/vol"]);
        assert_eq!(
            line.render(),
            "lxc-attach -e -n alpha -- /bin/mount -t zfs tank/alpha/vol /vol"
        );
    }
}
