//! Device Layer
//!
//! Everything needed to talk to a Starlink device over its gRPC `Handle` RPC:
//!
//! - [`Target`] / [`Role`]: a configured device endpoint
//! - [`proto`]: the subset of the device message schema this exporter reads
//! - [`Dialer`] / [`DeviceClient`]: connection seam, with [`GrpcDialer`] as the
//!   tonic-backed implementation
//! - [`call`]: issue one request under a deadline

mod client;
pub mod proto;
mod target;

pub use client::{DeviceClient, Dialer, GrpcDeviceClient, GrpcDialer, call};
pub use target::{Role, Target};
