//! Integration tests for the lookup arbiter.
//!
//! These tests drive the public API end to end with a scripted HTTP client:
//! - Eligibility and Wi-Fi before Cell fallback
//! - Single flight while a dispatch is running
//! - Minimum interval between dispatches (paused tokio clock)
//! - Configuration reloads through the session registry
//!
//! Run with: `cargo test --test arbiter_integration`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, Notify};

use netlocate::arbiter::{Arbiter, ArbiterConfig, Phase, SourceSettings, TriggerOutcome};
use netlocate::lookup::{decode_payload, payload_from_url, AsyncHttpClient, HttpResponse, LookupError};
use netlocate::report::{ChannelReporter, LocationEstimate};
use netlocate::session::{Reloadable, SessionRegistry};
use netlocate::signal::{CellObservation, RadioType, WifiObservation};

// ============================================================================
// Test Helpers
// ============================================================================

const WIFI_HIT: &str = r#"{"result":200,"data":{"lat":1.0,"lon":2.0,"accuracy":10.0}}"#;
const CELL_HIT: &str = r#"{"result":200,"data":{"lat":3.0,"lon":4.0,"accuracy":50.0}}"#;
const MISS: &str = r#"{"result":404}"#;

#[derive(Clone, Copy)]
enum Reply {
    Body(&'static str),
    Status(u16),
    Fail,
    Panic,
}

struct Script {
    wifi: Reply,
    cell: Reply,
    hold: Option<Arc<Notify>>,
    requests: Mutex<Vec<String>>,
}

/// HTTP client answering Wi-Fi and Cell requests from a fixed script.
#[derive(Clone)]
struct ScriptedClient {
    script: Arc<Script>,
}

impl ScriptedClient {
    fn new(wifi: Reply, cell: Reply) -> Self {
        Self::build(wifi, cell, None)
    }

    fn held(wifi: Reply, cell: Reply, hold: Arc<Notify>) -> Self {
        Self::build(wifi, cell, Some(hold))
    }

    fn build(wifi: Reply, cell: Reply, hold: Option<Arc<Notify>>) -> Self {
        Self {
            script: Arc::new(Script {
                wifi,
                cell,
                hold,
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.script.requests.lock().unwrap().clone()
    }

    fn wifi_fetches(&self) -> usize {
        self.requests().iter().filter(|u| u.contains("/wifi")).count()
    }

    fn cell_fetches(&self) -> usize {
        self.requests().iter().filter(|u| u.contains("/cell")).count()
    }

    fn total_fetches(&self) -> usize {
        self.requests().len()
    }
}

impl AsyncHttpClient for ScriptedClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, LookupError> {
        self.script.requests.lock().unwrap().push(url.to_string());

        if let Some(hold) = &self.script.hold {
            hold.notified().await;
        }

        let reply = if url.contains("/wifi") {
            self.script.wifi
        } else {
            self.script.cell
        };

        match reply {
            Reply::Body(body) => Ok(HttpResponse::ok(body)),
            Reply::Status(status) => Ok(HttpResponse::new(status, "error")),
            Reply::Fail => Err(LookupError::Transport("connection refused".to_string())),
            Reply::Panic => panic!("scripted transport panic"),
        }
    }
}

type TestArbiter = Arbiter<ScriptedClient, ChannelReporter>;

/// Create a started arbiter with default configuration.
fn start_arbiter(
    client: &ScriptedClient,
) -> (TestArbiter, broadcast::Receiver<LocationEstimate>) {
    start_arbiter_with(client, ArbiterConfig::default())
}

fn start_arbiter_with(
    client: &ScriptedClient,
    config: ArbiterConfig,
) -> (TestArbiter, broadcast::Receiver<LocationEstimate>) {
    let reporter = ChannelReporter::new();
    let estimates = reporter.subscribe();
    let arbiter = Arbiter::new(client.clone(), reporter, config).unwrap();
    arbiter.start().unwrap();
    (arbiter, estimates)
}

fn wifi_pair() -> Vec<WifiObservation> {
    vec![
        WifiObservation::new("AA:BB:CC:DD:EE:FF", -50),
        WifiObservation::new("11:22:33:44:55:66", -60),
    ]
}

fn single_wifi() -> Vec<WifiObservation> {
    vec![WifiObservation::new("AA:BB:CC:DD:EE:FF", -50)]
}

fn lte_cell() -> Vec<CellObservation> {
    vec![CellObservation::new(RadioType::Lte, 310, 260, 100, 200, -85)]
}

// ============================================================================
// Eligibility and fallback
// ============================================================================

#[tokio::test]
async fn test_single_wifi_issues_no_fetch() {
    let client = ScriptedClient::new(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT));
    let (arbiter, mut estimates) = start_arbiter(&client);

    assert_eq!(arbiter.update_wifi(single_wifi()), TriggerOutcome::Ineligible);
    assert_eq!(arbiter.update_cells(Vec::new()), TriggerOutcome::Ineligible);
    arbiter.wait_idle().await;

    assert_eq!(client.total_fetches(), 0);
    assert!(estimates.try_recv().is_err());
    assert!(arbiter.last_dispatch().is_none());
}

#[tokio::test]
async fn test_wifi_success_skips_cell() {
    let client = ScriptedClient::new(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT));
    let (arbiter, mut estimates) = start_arbiter(&client);

    assert_eq!(arbiter.update_wifi(wifi_pair()), TriggerOutcome::Dispatched);
    arbiter.wait_idle().await;

    let estimate = estimates.recv().await.unwrap();
    assert_eq!(estimate.provider, "mylnikov-geo");
    assert_eq!(estimate.latitude, 1.0);
    assert_eq!(estimate.longitude, 2.0);
    assert_eq!(estimate.accuracy, 10.0);
    assert!(estimates.try_recv().is_err());
    assert_eq!(client.wifi_fetches(), 1);
    assert_eq!(client.cell_fetches(), 0);
}

#[tokio::test]
async fn test_wifi_hit_with_cells_present_never_fetches_cell() {
    let client = ScriptedClient::new(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT));
    let reporter = ChannelReporter::new();
    let mut estimates = reporter.subscribe();
    let arbiter = Arbiter::new(client.clone(), reporter, ArbiterConfig::default()).unwrap();

    // Load both halves before starting so the first dispatch sees both.
    arbiter.update_cells(lte_cell());
    arbiter.update_wifi(wifi_pair());
    arbiter.start().unwrap();

    assert_eq!(arbiter.trigger(), TriggerOutcome::Dispatched);
    arbiter.wait_idle().await;

    assert_eq!(estimates.recv().await.unwrap().latitude, 1.0);
    assert_eq!(client.wifi_fetches(), 1);
    assert_eq!(client.cell_fetches(), 0);
}

#[tokio::test]
async fn test_wifi_miss_falls_back_to_cell() {
    let client = ScriptedClient::new(Reply::Body(MISS), Reply::Body(CELL_HIT));
    let reporter = ChannelReporter::new();
    let mut estimates = reporter.subscribe();
    let arbiter = Arbiter::new(client.clone(), reporter, ArbiterConfig::default()).unwrap();

    arbiter.update_wifi(wifi_pair());
    arbiter.update_cells(lte_cell());
    arbiter.start().unwrap();

    assert_eq!(arbiter.trigger(), TriggerOutcome::Dispatched);
    arbiter.wait_idle().await;

    let estimate = estimates.recv().await.unwrap();
    assert_eq!(
        (estimate.latitude, estimate.longitude, estimate.accuracy),
        (3.0, 4.0, 50.0)
    );
    assert_eq!(estimate.provider, "mylnikov-geo");
    assert!(estimates.try_recv().is_err());
    assert_eq!(client.wifi_fetches(), 1);
    assert_eq!(client.cell_fetches(), 1);
}

#[tokio::test]
async fn test_wifi_failures_each_fall_back_exactly_once() {
    for wifi in [Reply::Fail, Reply::Status(503), Reply::Body("{not json")] {
        let client = ScriptedClient::new(wifi, Reply::Body(CELL_HIT));
        let reporter = ChannelReporter::new();
        let mut estimates = reporter.subscribe();
        let arbiter = Arbiter::new(client.clone(), reporter, ArbiterConfig::default()).unwrap();

        arbiter.update_wifi(wifi_pair());
        arbiter.update_cells(lte_cell());
        arbiter.start().unwrap();
        arbiter.trigger();
        arbiter.wait_idle().await;

        assert_eq!(client.wifi_fetches(), 1);
        assert_eq!(client.cell_fetches(), 1);
        assert_eq!(estimates.recv().await.unwrap().latitude, 3.0);
    }
}

#[tokio::test]
async fn test_cells_only_issue_one_cell_fetch() {
    let client = ScriptedClient::new(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT));
    let (arbiter, mut estimates) = start_arbiter(&client);

    arbiter.update_wifi(single_wifi());
    assert_eq!(arbiter.update_cells(lte_cell()), TriggerOutcome::Dispatched);
    arbiter.wait_idle().await;

    assert_eq!(client.wifi_fetches(), 0);
    assert_eq!(client.cell_fetches(), 1);
    assert_eq!(estimates.recv().await.unwrap().longitude, 4.0);
}

#[tokio::test]
async fn test_nothing_resolved_reports_nothing_and_returns_to_idle() {
    let client = ScriptedClient::new(Reply::Body(MISS), Reply::Fail);
    let reporter = ChannelReporter::new();
    let mut estimates = reporter.subscribe();
    let arbiter = Arbiter::new(client.clone(), reporter, ArbiterConfig::default()).unwrap();

    arbiter.update_wifi(wifi_pair());
    arbiter.update_cells(lte_cell());
    arbiter.start().unwrap();
    arbiter.trigger();
    arbiter.wait_idle().await;

    assert_eq!(client.total_fetches(), 2);
    assert!(estimates.try_recv().is_err());
    assert_eq!(arbiter.phase(), Phase::Idle);
    assert!(arbiter.last_dispatch().is_some());
}

#[tokio::test]
async fn test_request_payload_carries_observations() {
    let client = ScriptedClient::new(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT));
    let (arbiter, _estimates) = start_arbiter(&client);

    arbiter.update_wifi(wifi_pair());
    arbiter.wait_idle().await;

    let url = &client.requests()[0];
    let payload = payload_from_url(url).unwrap();
    let mut records = decode_payload(&payload);
    records.sort();
    assert_eq!(
        records,
        vec![
            vec!["11:22:33:44:55:66".to_string(), "-60".to_string()],
            vec!["aa:bb:cc:dd:ee:ff".to_string(), "-50".to_string()],
        ]
    );
}

// ============================================================================
// Single flight
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_trigger_during_dispatch_is_dropped() {
    let hold = Arc::new(Notify::new());
    let client = ScriptedClient::held(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT), hold.clone());
    let (arbiter, mut estimates) = start_arbiter(&client);

    assert_eq!(arbiter.update_wifi(wifi_pair()), TriggerOutcome::Dispatched);
    assert_eq!(arbiter.phase(), Phase::Dispatching);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(client.total_fetches(), 1);

    assert_eq!(arbiter.update_wifi(wifi_pair()), TriggerOutcome::InFlight);
    assert_eq!(arbiter.update_cells(lte_cell()), TriggerOutcome::InFlight);
    assert!(arbiter.last_dispatch().is_none());

    hold.notify_one();
    arbiter.wait_idle().await;

    assert_eq!(client.total_fetches(), 1);
    assert_eq!(estimates.recv().await.unwrap().latitude, 1.0);
    assert!(estimates.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_uses_snapshot_captured_at_trigger() {
    let hold = Arc::new(Notify::new());
    let client = ScriptedClient::held(Reply::Body(MISS), Reply::Body(CELL_HIT), hold.clone());
    let (arbiter, _estimates) = start_arbiter(&client);

    arbiter.update_wifi(wifi_pair());
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Arrives mid-flight: stored, but not part of this attempt.
    arbiter.update_cells(lte_cell());
    assert_eq!(arbiter.snapshot().cell_count(), 1);

    hold.notify_one();
    arbiter.wait_idle().await;

    assert_eq!(client.wifi_fetches(), 1);
    assert_eq!(client.cell_fetches(), 0);
}

#[tokio::test]
async fn test_panicking_transport_releases_guard() {
    let client = ScriptedClient::new(Reply::Panic, Reply::Body(CELL_HIT));
    let (arbiter, _estimates) = start_arbiter(&client);

    assert_eq!(arbiter.update_wifi(wifi_pair()), TriggerOutcome::Dispatched);
    arbiter.wait_idle().await;

    assert_eq!(arbiter.phase(), Phase::Idle);
    assert!(arbiter.last_dispatch().is_some());
    assert!(arbiter.is_running());
}

// ============================================================================
// Minimum interval
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_trigger_inside_minimum_interval_is_rejected() {
    let client = ScriptedClient::new(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT));
    let (arbiter, _estimates) = start_arbiter(&client);

    assert_eq!(arbiter.update_wifi(wifi_pair()), TriggerOutcome::Dispatched);
    arbiter.wait_idle().await;
    let completed = arbiter.last_dispatch().unwrap();
    assert_eq!(client.total_fetches(), 1);

    tokio::time::advance(Duration::from_millis(3000)).await;
    assert_eq!(arbiter.trigger(), TriggerOutcome::RateLimited);
    assert_eq!(client.total_fetches(), 1);
    assert_eq!(arbiter.last_dispatch(), Some(completed));

    tokio::time::advance(Duration::from_millis(2001)).await;
    assert_eq!(arbiter.trigger(), TriggerOutcome::Dispatched);
    arbiter.wait_idle().await;
    assert_eq!(client.total_fetches(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_interval_counts_from_completion() {
    let hold = Arc::new(Notify::new());
    let client = ScriptedClient::held(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT), hold.clone());
    let config = ArbiterConfig {
        min_interval: Duration::from_millis(1000),
        ..Default::default()
    };
    let (arbiter, _estimates) = start_arbiter_with(&client, config);

    arbiter.update_wifi(wifi_pair());
    // Slow lookup: 4s in flight.
    tokio::time::sleep(Duration::from_millis(4000)).await;
    hold.notify_one();
    arbiter.wait_idle().await;

    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(arbiter.trigger(), TriggerOutcome::RateLimited);

    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(arbiter.trigger(), TriggerOutcome::Dispatched);
    hold.notify_one();
    arbiter.wait_idle().await;
    assert_eq!(client.total_fetches(), 2);
}

// ============================================================================
// Lifecycle and configuration
// ============================================================================

#[tokio::test]
async fn test_stopped_arbiter_issues_no_fetch() {
    let client = ScriptedClient::new(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT));
    let (arbiter, _estimates) = start_arbiter(&client);

    arbiter.stop().unwrap().await.unwrap();

    assert_eq!(arbiter.update_wifi(wifi_pair()), TriggerOutcome::NotRunning);
    assert_eq!(client.total_fetches(), 0);
}

#[tokio::test]
async fn test_reload_through_registry_disables_wifi() {
    let client = ScriptedClient::new(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT));
    let reporter = ChannelReporter::new();
    let mut estimates = reporter.subscribe();
    let arbiter = Arc::new(Arbiter::new(client.clone(), reporter, ArbiterConfig::default()).unwrap());

    let registry = SessionRegistry::new();
    let session: Arc<dyn Reloadable> = arbiter.clone();
    registry.register(Arc::clone(&session));

    arbiter.update_wifi(wifi_pair());
    assert!(registry.reload_configuration(SourceSettings::new(false, true)));
    arbiter.start().unwrap();

    assert_eq!(arbiter.update_wifi(wifi_pair()), TriggerOutcome::SourceDisabled);
    assert_eq!(arbiter.update_cells(lte_cell()), TriggerOutcome::Dispatched);
    arbiter.wait_idle().await;

    assert_eq!(client.wifi_fetches(), 0);
    assert_eq!(client.cell_fetches(), 1);
    assert_eq!(estimates.recv().await.unwrap().latitude, 3.0);

    assert!(registry.unregister(&session));
    assert!(!registry.reload_configuration(SourceSettings::default()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_dispatch_once() {
    let hold = Arc::new(Notify::new());
    let client = ScriptedClient::held(Reply::Body(WIFI_HIT), Reply::Body(CELL_HIT), hold.clone());
    let (arbiter, _estimates) = start_arbiter(&client);
    let arbiter = Arc::new(arbiter);

    let producers: Vec<_> = (0..8)
        .map(|i| {
            let arbiter = Arc::clone(&arbiter);
            tokio::spawn(async move {
                if i % 2 == 0 {
                    arbiter.update_wifi(wifi_pair())
                } else {
                    arbiter.update_cells(lte_cell())
                }
            })
        })
        .collect();

    let mut dispatched = 0;
    for producer in producers {
        if producer.await.unwrap() == TriggerOutcome::Dispatched {
            dispatched += 1;
        }
    }
    assert_eq!(dispatched, 1);

    hold.notify_one();
    arbiter.wait_idle().await;
    assert_eq!(client.total_fetches(), 1);
}
