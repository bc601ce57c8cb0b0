//! Connection seam between collectors and devices.
//!
//! A [`Dialer`] opens one connection per collection cycle; the connection is
//! dropped when the cycle ends. There is no retry here: callers decide what
//! to do with a failed dial.

use std::time::Duration;

use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};

use crate::collector::CollectorError;
use crate::device::Target;
use crate::device::proto::{self, HANDLE_PATH, SERVICE};

/// A connected device that answers `Handle` requests.
#[async_trait::async_trait]
pub trait DeviceClient: Send {
    /// Issue one request and wait for the response.
    async fn handle(&mut self, request: proto::Request) -> Result<proto::Response, tonic::Status>;
}

/// Opens connections to targets.
#[async_trait::async_trait]
pub trait Dialer: Send + Sync + 'static {
    /// Connect to `target`.
    ///
    /// With `connect_timeout` set, the dial gives up after that long;
    /// otherwise it waits for the transport's own failure.
    ///
    /// # Errors
    /// Returns `CollectorError::Connection` when the target cannot be reached.
    async fn dial(
        &self,
        target: &Target,
        connect_timeout: Option<Duration>,
    ) -> Result<Box<dyn DeviceClient>, CollectorError>;
}

/// Plaintext gRPC dialer backed by a tonic channel.
#[derive(Debug, Clone, Default)]
pub struct GrpcDialer;

impl GrpcDialer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Dialer for GrpcDialer {
    async fn dial(
        &self,
        target: &Target,
        connect_timeout: Option<Duration>,
    ) -> Result<Box<dyn DeviceClient>, CollectorError> {
        let connection_error = |e: tonic::transport::Error| CollectorError::Connection {
            target: target.to_string(),
            reason: describe(&e),
        };

        let mut endpoint = Endpoint::from_shared(target.uri()).map_err(connection_error)?;
        if let Some(limit) = connect_timeout {
            endpoint = endpoint.connect_timeout(limit);
        }

        let channel = endpoint.connect().await.map_err(connection_error)?;
        tracing::debug!(target = %target, "Connected");
        Ok(Box::new(GrpcDeviceClient::new(channel)))
    }
}

/// [`DeviceClient`] over an established tonic channel.
#[derive(Debug, Clone)]
pub struct GrpcDeviceClient {
    inner: Grpc<Channel>,
}

impl GrpcDeviceClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }
}

#[async_trait::async_trait]
impl DeviceClient for GrpcDeviceClient {
    async fn handle(&mut self, request: proto::Request) -> Result<proto::Response, tonic::Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unavailable(format!("{SERVICE} not ready: {e}")))?;

        let codec: ProstCodec<proto::Request, proto::Response> = ProstCodec::default();
        let path = PathAndQuery::from_static(HANDLE_PATH);
        let response = self
            .inner
            .unary(tonic::Request::new(request), path, codec)
            .await?;
        Ok(response.into_inner())
    }
}

/// Issue `request` and fail with `CollectorError::Timeout` past `deadline`.
///
/// Expired deadlines and RPC errors are both reported as errors; callers
/// treat them the same as a failed dial.
pub async fn call(
    client: &mut dyn DeviceClient,
    request: proto::Request,
    deadline: Duration,
) -> Result<proto::Response, CollectorError> {
    let method = request.method();
    match tokio::time::timeout(deadline, client.handle(request)).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(status)) => Err(CollectorError::Rpc { method, status }),
        Err(_) => Err(CollectorError::Timeout {
            method,
            after: deadline,
        }),
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Role;
    use crate::device::proto::{GetPingResponse, Response};

    struct StalledClient;

    #[async_trait::async_trait]
    impl DeviceClient for StalledClient {
        async fn handle(&mut self, _: proto::Request) -> Result<Response, tonic::Status> {
            std::future::pending().await
        }
    }

    struct EchoClient;

    #[async_trait::async_trait]
    impl DeviceClient for EchoClient {
        async fn handle(&mut self, request: proto::Request) -> Result<Response, tonic::Status> {
            match request.method() {
                "GetPing" => Ok(Response::get_ping(GetPingResponse::default())),
                other => Err(tonic::Status::unimplemented(other)),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_times_out() {
        let err = call(
            &mut StalledClient,
            proto::Request::get_history(),
            Duration::from_secs(30),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            CollectorError::Timeout { method: "GetHistory", after } if after == Duration::from_secs(30)
        ));
    }

    #[tokio::test]
    async fn test_call_maps_status_errors() {
        let err = call(&mut EchoClient, proto::Request::get_status(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CollectorError::Rpc { method: "GetStatus", .. }));

        let ok = call(&mut EchoClient, proto::Request::get_ping(), Duration::from_secs(5)).await;
        assert!(ok.unwrap().into_get_ping().is_some());
    }

    #[tokio::test]
    async fn test_grpc_dial_refused() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = Target::new(Role::Dish, addr.to_string()).unwrap();
        let result = GrpcDialer::new()
            .dial(&target, Some(Duration::from_secs(1)))
            .await;

        match result {
            Err(CollectorError::Connection { target, .. }) => {
                assert_eq!(target, format!("dish@{addr}"));
            }
            Err(other) => panic!("expected connection error, got {other}"),
            Ok(_) => panic!("expected connection error, got a client"),
        }
    }
}
