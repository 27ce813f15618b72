//! Outcome counter completeness: every request terminates in exactly one
//! outcome, and the counter accounts for all of them.
//!
//! Kept to a single test because the Prometheus recorder is process-wide.

use logd::server::build_router;
use logd::state::AppState;
use logd::telemetry;
use logstore::MemStore;
use std::sync::Arc;

fn outcome_counts(rendered: &str) -> Vec<(String, u64)> {
    rendered
        .lines()
        .filter(|line| line.starts_with("add_chain_outcome_total{"))
        .map(|line| {
            let (series, value) = line.rsplit_once(' ').expect("malformed series line");
            (series.to_string(), value.parse().expect("malformed count"))
        })
        .collect()
}

#[tokio::test]
async fn test_every_request_is_counted() {
    let handle = telemetry::install_recorder().unwrap();

    let state = Arc::new(AppState::new(MemStore::new()));
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let url = format!("http://{addr}/ct/v1/add-chain");

    let bodies = [
        r#"{"chain":["AAEC"]}"#,  // success
        r#"{"chain":["AwQF"]}"#,  // success
        r#"{"chain":[]}"#,        // empty-chain
        r#"not json"#,            // json-parse-err
        r#"{"chain":["!!!"]}"#,   // base64-decode-err
    ];
    for body in bodies {
        client.post(&url).body(body).send().await.unwrap();
    }

    let rendered = handle.render();
    let counts = outcome_counts(&rendered);

    let total: u64 = counts.iter().map(|(_, n)| n).sum();
    assert_eq!(total, bodies.len() as u64, "rendered:\n{rendered}");

    let count_for = |label: &str| {
        counts
            .iter()
            .find(|(series, _)| series.contains(&format!("outcome=\"{label}\"")))
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };
    assert_eq!(count_for("success"), 2);
    assert_eq!(count_for("empty-chain"), 1);
    assert_eq!(count_for("json-parse-err"), 1);
    assert_eq!(count_for("base64-decode-err"), 1);

    // The duration histograms observed every request as well.
    assert!(rendered.contains("log_handler_time_seconds"), "rendered:\n{rendered}");
    assert!(rendered.contains("transaction_time_seconds"), "rendered:\n{rendered}");
    assert!(rendered.contains("update_time_seconds"), "rendered:\n{rendered}");
}
