//! Device endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::config::ConfigError;

/// Logical role of a polled device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// The satellite dish. Mandatory: the exporter refuses to start without it.
    Dish,
    /// The wifi router. Optional.
    Wifi,
}

/// An RPC endpoint plus the role of the device behind it.
///
/// Immutable once built from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    role: Role,
    address: String,
}

impl Target {
    /// Create a target, validating that `address` is `host:port`.
    pub fn new(role: Role, address: impl Into<String>) -> Result<Self, ConfigError> {
        let address = address.into();
        validate_address(&address).map_err(|reason| {
            ConfigError::ValidationError(format!("invalid {role} address '{address}': {reason}"))
        })?;
        Ok(Self { role, address })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// URI used to open a plaintext HTTP/2 channel.
    pub fn uri(&self) -> String {
        format!("http://{}", self.address)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.role, self.address)
    }
}

fn validate_address(address: &str) -> Result<(), &'static str> {
    let (host, port) = address.rsplit_once(':').ok_or("missing port")?;
    if host.is_empty() {
        return Err("missing host");
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err("port must be in 1-65535"),
        Ok(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_accepts_host_port() {
        let target = Target::new(Role::Dish, "192.168.100.1:9200").unwrap();
        assert_eq!(target.role(), Role::Dish);
        assert_eq!(target.address(), "192.168.100.1:9200");
        assert_eq!(target.uri(), "http://192.168.100.1:9200");
        assert_eq!(target.to_string(), "dish@192.168.100.1:9200");
    }

    #[test]
    fn test_target_accepts_hostname() {
        assert!(Target::new(Role::Wifi, "router.lan:9000").is_ok());
    }

    #[test]
    fn test_target_rejects_bad_addresses() {
        for bad in ["192.168.1.1", ":9000", "router:0", "router:http", "router:70000"] {
            let err = Target::new(Role::Wifi, bad).unwrap_err();
            assert!(err.to_string().contains("invalid wifi address"), "{bad}: {err}");
        }
    }

    #[test]
    fn test_role_string_forms() {
        assert_eq!(Role::Dish.as_ref(), "dish");
        assert_eq!("wifi".parse::<Role>().unwrap(), Role::Wifi);
    }
}
