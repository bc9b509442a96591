//! Server tests against a real listener on an ephemeral port.
//!
//! - `routes.rs`     - Status codes, error envelopes, and authentication
//! - `end_to_end.rs` - Devices driving the server through the HTTP client and mirror


use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use group_lifecycle::{Coordinator, RecordingSink};
use group_record_store::SqliteGroupStore;
use tokio::net::TcpListener;

use crate::app::{router, AppState};

pub(crate) struct TestServer {
    pub base: String,
    pub coordinator: Arc<Coordinator<RecordingSink>>,
}

pub(crate) async fn spawn_server() -> TestServer {
    let store = Arc::new(SqliteGroupStore::in_memory().unwrap());
    let coordinator = Arc::new(Coordinator::new(store, RecordingSink::new()));
    let app = router(AppState {
        coordinator: coordinator.clone(),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://{addr}"),
        coordinator,
    }
}

pub(crate) fn tomorrow_at_seven() -> DateTime<Utc> {
    let tomorrow = (Utc::now() + Duration::days(1)).date_naive();
    tomorrow.and_hms_opt(7, 0, 0).unwrap().and_utc()
}

pub(crate) fn run_request(
    kind: &str,
    pace: f64,
    distance: f64,
    start: DateTime<Utc>,
) -> serde_json::Value {
    serde_json::json!({
        "kind": kind,
        "distance_km": distance,
        "pace_min_per_km": pace,
        "start_time": start.to_rfc3339(),
        "location": { "lat": 51.5079, "lng": -0.1657, "place_name": "Hyde Park" },
        "meeting_point": "Speakers' Corner"
    })
}
