//! End-to-end tests for the exporter.
//!
//! A scripted device stands in for the dish; collectors, sink and HTTP
//! server are the real ones, bound to a random local port.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use starlink_exporter::collector::status::DishStatusCollector;
use starlink_exporter::device::proto::{
    DeviceInfo, DishGetStatusResponse, DishObstructionStats, Request, Response,
};
use starlink_exporter::device::DeviceClient;
use starlink_exporter::server::{AppState, create_router};
use starlink_exporter::{
    CollectorError, CollectorRegistry, Dialer, PrometheusSink, Role, Schedule, Target,
};
use tokio::net::TcpListener;

// =============================================================================
// Test Helpers
// =============================================================================

/// Dialer for a dish that is either healthy or refuses every connection.
struct ScriptedDish {
    reachable: bool,
    dials: AtomicUsize,
}

impl ScriptedDish {
    fn new(reachable: bool) -> Arc<Self> {
        Arc::new(Self {
            reachable,
            dials: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl Dialer for ScriptedDish {
    async fn dial(
        &self,
        target: &Target,
        _connect_timeout: Option<Duration>,
    ) -> Result<Box<dyn DeviceClient>, CollectorError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        if !self.reachable {
            return Err(CollectorError::Connection {
                target: target.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(Box::new(ScriptedClient))
    }
}

struct ScriptedClient;

#[async_trait::async_trait]
impl DeviceClient for ScriptedClient {
    async fn handle(&mut self, request: Request) -> Result<Response, tonic::Status> {
        match request.method() {
            "GetStatus" => Ok(Response::dish_get_status(DishGetStatusResponse {
                device_info: Some(DeviceInfo {
                    id: "ut01000000-00000000-00abcdef".to_string(),
                    hardware_version: "rev3_proto2".to_string(),
                    software_version: "2024.01.01.mr1".to_string(),
                    country_code: "CA".to_string(),
                }),
                obstruction_stats: Some(DishObstructionStats {
                    fraction_obstructed: 0.25,
                    wedge_fraction_obstructed: vec![0.0, 0.5],
                    wedge_abs_fraction_obstructed: vec![0.0, 0.125],
                    valid_s: 3600.0,
                    currently_obstructed: true,
                    last_24h_obstructed_s: 42.0,
                }),
            })),
            other => Err(tonic::Status::unimplemented(other)),
        }
    }
}

/// Start the exporter against `dialer` and return the base URL.
async fn start_exporter(dialer: Arc<ScriptedDish>) -> (String, CollectorRegistry) {
    let sink = Arc::new(PrometheusSink::new().expect("Failed to build sink"));
    let registry = CollectorRegistry::new(dialer, sink.clone())
        .with_retry_interval(Duration::from_millis(50));

    let dish = Target::new(Role::Dish, "192.168.100.1:9200").unwrap();
    registry
        .spawn(DishStatusCollector::new(
            dish,
            Schedule::interval(Duration::from_secs(240)),
            sink.clone(),
        ))
        .await
        .expect("Failed to spawn collector");

    let router = create_router(AppState { sink });
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), registry)
}

/// Scrape `/metrics` until `needle` shows up or two seconds pass.
async fn scrape_until(base_url: &str, needle: &str) -> String {
    let client = reqwest::Client::new();
    let mut body = String::new();
    for _ in 0..100 {
        body = client
            .get(format!("{}/metrics", base_url))
            .send()
            .await
            .expect("Failed to scrape")
            .text()
            .await
            .expect("Failed to read body");
        if body.contains(needle) {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("'{}' never appeared in scrape:\n{}", needle, body);
}

// =============================================================================
// Scrape Tests
// =============================================================================

#[tokio::test]
async fn test_scrape_exposes_dish_status() {
    let (base_url, registry) = start_exporter(ScriptedDish::new(true)).await;

    let body = scrape_until(&base_url, "starlink_exporter_collector_up{collector=\"dish_status\"} 1").await;

    assert!(body.contains("# TYPE dish_device_info gauge"));
    assert!(body.contains(
        "dish_device_info{country_code=\"CA\",hardware_version=\"rev3_proto2\",id=\"ut01000000-00000000-00abcdef\",software_version=\"2024.01.01.mr1\"} 1"
    ));
    assert!(body.contains("dish_currently_obstructed 1"));
    assert!(body.contains("dish_fraction_obstructed 0.25"));
    assert!(body.contains("dish_last_24h_obstructed_s 42"));
    assert!(body.contains("dish_wedge_fraction_obstructed{degrees=\"30\"} 0.5"));
    assert!(body.contains("dish_wedge_abs_fraction_obstructed{degrees=\"30\"} 0.125"));

    registry.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_dish_reports_collector_down() {
    let dialer = ScriptedDish::new(false);
    let (base_url, registry) = start_exporter(dialer.clone()).await;

    let body = scrape_until(&base_url, "starlink_exporter_collector_up{collector=\"dish_status\"} 0").await;
    assert!(!body.contains("dish_device_info{"));

    // Retried in place after the short retry interval.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(dialer.dials.load(Ordering::SeqCst) >= 2);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_healthz() {
    let (base_url, registry) = start_exporter(ScriptedDish::new(true)).await;

    let resp = reqwest::get(format!("{}/healthz", base_url))
        .await
        .expect("Failed to send healthz request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to parse healthz response");
    assert_eq!(body["status"], "ok");

    registry.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_polling() {
    let dialer = ScriptedDish::new(false);
    let (_base_url, registry) = start_exporter(dialer.clone()).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    registry.shutdown().await;
    let after_shutdown = dialer.dials.load(Ordering::SeqCst);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(dialer.dials.load(Ordering::SeqCst), after_shutdown);
}
