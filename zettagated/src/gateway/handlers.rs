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

//! One handler per verb. Each handler turns the raw query string into an
//! argument vector, runs the guard where the verb names a dataset, and
//! shapes the dispatcher's answer into a [`Reply`].

use super::error::{GatewayError, Result};
use super::reply::Reply;
use super::{GatewayState, Tenant};
use axum::extract::{RawQuery, State};
use axum::Extension;
use tracing::info;

/// Flatten a query string into positional arguments.
///
/// Pairs arrive in wire order. A pair with a non-empty value contributes
/// both its key and its value, a pair with an empty value contributes only
/// its key. The `last` pair is held back and appended at the end, which is
/// where every zfs verb expects the dataset name.
pub(crate) fn query_args(raw: Option<&str>) -> Vec<String> {
    let mut args = Vec::new();
    let mut last = None;
    for (key, value) in
        url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
    {
        if key == "last" {
            last = Some(value.into_owned());
            continue;
        }
        args.push(key.into_owned());
        if !value.is_empty() {
            args.push(value.into_owned());
        }
    }
    if let Some(last) = last {
        args.push(last);
    }
    args
}

/// Check the tenant may touch the dataset a verb targets.
///
/// Most verbs name their dataset as the final argument. `clone` names it
/// second to last (the final argument is the clone destination), so it
/// passes `penultimate`.
async fn authorize(
    state: &GatewayState,
    tenant: &str,
    args: &[String],
    penultimate: bool,
) -> Result<()> {
    let index = if penultimate {
        args.len().checked_sub(2)
    } else {
        args.len().checked_sub(1)
    };
    let target = index
        .and_then(|i| args.get(i))
        .ok_or_else(|| GatewayError::BadInput("missing dataset".into()))?;
    if state.guard.is_authorized(tenant, target).await? {
        Ok(())
    } else {
        Err(GatewayError::AuthorizationFailure)
    }
}

pub(crate) async fn usage(
    State(state): State<GatewayState>,
    Extension(Tenant(tenant)): Extension<Tenant>,
) -> Result<Reply> {
    info!("usage tenant={tenant}");
    let output = state.dispatcher.usage(&tenant).await?;
    Ok(Reply::plain(&output))
}

pub(crate) async fn list(
    State(state): State<GatewayState>,
    Extension(Tenant(tenant)): Extension<Tenant>,
    RawQuery(raw): RawQuery,
) -> Result<Reply> {
    let args = query_args(raw.as_deref());
    info!("list tenant={tenant} args={args:?}");
    let listing = state.dispatcher.list(&tenant, &args).await?;
    Ok(Reply::table(listing))
}

pub(crate) async fn create(
    State(state): State<GatewayState>,
    Extension(Tenant(tenant)): Extension<Tenant>,
    RawQuery(raw): RawQuery,
) -> Result<Reply> {
    let args = query_args(raw.as_deref());
    info!("create tenant={tenant} args={args:?}");
    let output = state.dispatcher.create(&tenant, "create", &args).await?;
    Ok(Reply::plain(&output))
}

pub(crate) async fn clone_dataset(
    State(state): State<GatewayState>,
    Extension(Tenant(tenant)): Extension<Tenant>,
    RawQuery(raw): RawQuery,
) -> Result<Reply> {
    let args = query_args(raw.as_deref());
    info!("clone tenant={tenant} args={args:?}");
    authorize(&state, &tenant, &args, true).await?;
    let output = state.dispatcher.create(&tenant, "clone", &args).await?;
    Ok(Reply::plain(&output))
}

pub(crate) async fn set(
    State(state): State<GatewayState>,
    Extension(Tenant(tenant)): Extension<Tenant>,
    RawQuery(raw): RawQuery,
) -> Result<Reply> {
    let args = query_args(raw.as_deref());
    info!("set tenant={tenant} args={args:?}");
    authorize(&state, &tenant, &args, false).await?;
    let output = state.dispatcher.set(&tenant, &args).await?;
    Ok(Reply::plain(&output))
}

macro_rules! relay_handler {
    ($name:ident, $verb:literal) => {
        pub(crate) async fn $name(
            State(state): State<GatewayState>,
            Extension(Tenant(tenant)): Extension<Tenant>,
            RawQuery(raw): RawQuery,
        ) -> Result<Reply> {
            let args = query_args(raw.as_deref());
            info!("{} tenant={tenant} args={args:?}", $verb);
            authorize(&state, &tenant, &args, false).await?;
            let output =
                state.dispatcher.relay(&tenant, $verb, &args).await?;
            Ok(Reply::plain(&output))
        }
    };
}

relay_handler!(destroy, "destroy");
relay_handler!(rename, "rename");
relay_handler!(snapshot, "snapshot");
relay_handler!(mount, "mount");
relay_handler!(umount, "umount");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::DirectoryClient;
    use crate::exec::fake::FakeExecutor;
    use crate::gateway::CookieResolver;
    use crate::zfs::dispatch::Dispatcher;
    use crate::zfs::guard::PermissionGuard;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const DATASETS: &str = "\
NAME        USED  AVAIL  REFER  MOUNTPOINT
tank/alpha  512M  10.0G   512M  /srv/lxc/alpha/rootfs/data
tank/beta   512M  10.0G   512M  /srv/lxc/beta/rootfs/data
";

    const EVERYTHING: &str = "\
NAME                USED  AVAIL  REFER  MOUNTPOINT
tank/alpha          512M  10.0G   512M  /srv/lxc/alpha/rootfs/data
tank/beta           512M  10.0G   512M  /srv/lxc/beta/rootfs/data
";

    async fn alpha_state() -> (GatewayState, Arc<FakeExecutor>) {
        let executor = Arc::new(FakeExecutor::new());
        executor.respond("/usr/bin/zfs list", DATASETS);
        executor.respond("/usr/bin/zfs list -t all", EVERYTHING);
        let directory = Arc::new(DirectoryClient::new(
            "http://unused.invalid",
            executor.clone(),
        ));
        directory.cache_host("alpha", "storage01").await;
        directory.cache_root("alpha", "/srv/lxc/alpha/rootfs").await;
        let state = GatewayState {
            dispatcher: Arc::new(Dispatcher::new(
                directory.clone(),
                executor.clone(),
            )),
            guard: Arc::new(PermissionGuard::new(
                directory,
                executor.clone(),
            )),
            resolver: Arc::new(CookieResolver::new("unused")),
        };
        (state, executor)
    }

    fn alpha() -> Extension<Tenant> {
        Extension(Tenant("alpha".to_string()))
    }

    #[tokio::test]
    async fn forbidden_destroy_is_403_and_never_dispatched() {
        let (state, executor) = alpha_state().await;

        let result = destroy(
            State(state),
            alpha(),
            RawQuery(Some("last=tank/beta".to_string())),
        )
        .await;

        let error = result.expect_err("denied");
        assert_eq!(
            error.into_response().status(),
            StatusCode::FORBIDDEN
        );
        // only the guard's listings reached the executor
        assert!(executor
            .calls()
            .iter()
            .all(|(_, command)| !command.contains("destroy")));
    }

    #[tokio::test]
    async fn forbidden_set_is_403_and_never_dispatched() {
        let (state, executor) = alpha_state().await;

        let result = set(
            State(state),
            alpha(),
            RawQuery(Some("mountpoint%3D%2Fx=&last=tank/beta".to_string())),
        )
        .await;

        let error = result.expect_err("denied");
        assert_eq!(
            error.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert!(executor
            .calls()
            .iter()
            .all(|(_, command)| !command.contains("zfs set")));
    }

    #[tokio::test]
    async fn set_with_stray_dataset_token_mutates_nothing() {
        // three tokens: the authorized final token differs from the middle
        // one, so the request must die without touching either dataset
        let (state, executor) = alpha_state().await;

        let result = set(
            State(state),
            alpha(),
            RawQuery(Some(
                "mountpoint%3D%2Fx=&tank%2Fbeta=&last=tank/alpha"
                    .to_string(),
            )),
        )
        .await;

        let error = result.expect_err("rejected");
        assert_eq!(
            error.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert!(executor.calls().iter().all(|(_, command)| {
            !command.contains("zfs set") && !command.contains("lxc-attach")
        }));
    }

    #[test]
    fn query_args_keeps_wire_order_and_appends_last() {
        let args =
            query_args(Some("-o=mountpoint%3D%2Fdata&last=tank%2Fhome"));
        assert_eq!(args, vec!["-o", "mountpoint=/data", "tank/home"]);
    }

    #[test]
    fn bare_flags_contribute_only_their_key() {
        let args = query_args(Some("-r=&-t=all&last=tank"));
        assert_eq!(args, vec!["-r", "-t", "all", "tank"]);
    }

    #[test]
    fn last_is_appended_even_when_sent_first() {
        let args = query_args(Some("last=tank%2Fa&-p="));
        assert_eq!(args, vec!["-p", "tank/a"]);
    }

    #[test]
    fn empty_query_yields_no_args() {
        assert_eq!(query_args(None), Vec::<String>::new());
        assert_eq!(query_args(Some("")), Vec::<String>::new());
    }
}
