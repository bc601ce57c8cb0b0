//! Startup reachability probe.

use std::time::Duration;

use crate::collector::CollectorError;
use crate::device::proto::Request;
use crate::device::{Dialer, Role, Target, call};

/// Connect timeout for the startup probe (1 second).
pub const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Dial `target` once and ask for its status.
///
/// Returns the device id on success. Unlike the periodic collectors there is
/// no retry: the caller decides whether a failure is fatal.
pub async fn probe(
    dialer: &dyn Dialer,
    target: &Target,
    connect_timeout: Duration,
    rpc_timeout: Duration,
) -> Result<String, CollectorError> {
    let mut client = dialer.dial(target, Some(connect_timeout)).await?;
    let response = call(client.as_mut(), Request::get_status(), rpc_timeout).await?;

    let info = match target.role() {
        Role::Dish => response.into_dish_get_status().map(|s| s.device_info),
        Role::Wifi => response.into_wifi_get_status().map(|s| s.device_info),
    }
    .ok_or(CollectorError::UnexpectedResponse {
        method: "GetStatus",
    })?;

    Ok(info.unwrap_or_default().id)
}

/// Which collectors may start, decided by the startup probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupPlan {
    /// Id reported by the dish.
    pub dish_id: String,
    /// Id reported by the router, `None` when it did not answer.
    pub wifi_id: Option<String>,
}

impl StartupPlan {
    /// Whether the router status collector should run.
    ///
    /// The ping collector runs either way and retries until the router
    /// shows up.
    pub fn wifi_status_enabled(&self) -> bool {
        self.wifi_id.is_some()
    }
}

/// Probe the router, then the dish.
///
/// An unreachable router only disables its status collector. An unreachable
/// dish is fatal.
///
/// # Errors
/// Returns the dish probe failure.
pub async fn startup(
    dialer: &dyn Dialer,
    dish: &Target,
    wifi: &Target,
    connect_timeout: Duration,
    rpc_timeout: Duration,
) -> Result<StartupPlan, CollectorError> {
    let wifi_id = match probe(dialer, wifi, connect_timeout, rpc_timeout).await {
        Ok(id) => {
            tracing::info!(target = %wifi, id = %id, "Wifi router reachable");
            Some(id)
        }
        Err(e) => {
            tracing::warn!(
                target = %wifi,
                error = %e,
                "Wifi router unreachable, disabling wifi status checks"
            );
            None
        }
    };

    let dish_id = probe(dialer, dish, connect_timeout, rpc_timeout)
        .await
        .inspect_err(|e| {
            tracing::error!(target = %dish, error = %e, "Dish unreachable, giving up");
        })?;
    tracing::info!(target = %dish, id = %dish_id, "Dish reachable");

    Ok(StartupPlan { dish_id, wifi_id })
}
