//! Scripted device doubles for collector tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::collector::CollectorError;
use crate::device::proto::{Request, Response};
use crate::device::{DeviceClient, Dialer, Role, Target};

type Responder = dyn Fn(Role, &Request) -> Result<Response, tonic::Status> + Send + Sync;

/// Dialer whose connections answer through a closure.
pub struct FakeDialer {
    responder: Arc<Responder>,
    refused: Vec<Role>,
    failures_left: AtomicUsize,
    dials: AtomicUsize,
}

impl FakeDialer {
    pub fn new(
        responder: impl Fn(&Request) -> Result<Response, tonic::Status> + Send + Sync + 'static,
    ) -> Self {
        Self::by_role(move |_, request| responder(request))
    }

    /// Answer depending on the role of the dialed target.
    pub fn by_role(
        responder: impl Fn(Role, &Request) -> Result<Response, tonic::Status> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            refused: Vec::new(),
            failures_left: AtomicUsize::new(0),
            dials: AtomicUsize::new(0),
        }
    }

    /// Refuse every dial to targets with `role`.
    pub fn refusing(mut self, role: Role) -> Self {
        self.refused.push(role);
        self
    }

    /// Refuse the first `n` dials.
    pub fn failing_first(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    /// Number of dial attempts so far.
    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Dialer for FakeDialer {
    async fn dial(
        &self,
        target: &Target,
        _connect_timeout: Option<Duration>,
    ) -> Result<Box<dyn DeviceClient>, CollectorError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
            || self.refused.contains(&target.role());
        if refused {
            return Err(CollectorError::Connection {
                target: target.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(Box::new(FakeClient {
            role: target.role(),
            responder: Arc::clone(&self.responder),
        }))
    }
}

struct FakeClient {
    role: Role,
    responder: Arc<Responder>,
}

#[async_trait::async_trait]
impl DeviceClient for FakeClient {
    async fn handle(&mut self, request: Request) -> Result<Response, tonic::Status> {
        (self.responder)(self.role, &request)
    }
}
