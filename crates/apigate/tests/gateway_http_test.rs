//! HTTP-level integration tests for the gateway client, backed by wiremock.
//!
//! Each test spins up a private mock backend; `expect(..)` assertions are
//! verified when the server drops, so "exactly N network calls" properties
//! are checked by the mock server itself.

use std::time::{Duration, Instant};

use apigate::{CachePolicy, GatewayClient, GatewayConfig, GatewayError, HttpMethod};
use serde_json::{Map, Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Best-effort subscriber so `RUST_LOG=debug cargo test` shows attempts.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn base_config(server: &MockServer) -> GatewayConfig {
    init_logging();
    GatewayConfig::new(server.uri())
        .with_timeout_ms(2_000)
        .with_retry_delay_ms(10)
}

fn args(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

// ── Dispatch ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn last_write_wins_routes_to_latest_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v2/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(base_config(&server)).unwrap();
    client.register_function("sendOrder", "/v1/order", HttpMethod::Post);
    client.register_function("sendOrder", "/v2/order", HttpMethod::Put);

    let result = client.invoke("sendOrder", &Map::new()).await.unwrap();
    assert_eq!(result, json!({"version": 2}));
}

#[tokio::test]
async fn unknown_function_performs_zero_network_calls() {
    let server = MockServer::start().await;
    let client = GatewayClient::new(base_config(&server)).unwrap();

    let err = client.invoke("ghost", &Map::new()).await.unwrap_err();
    assert!(matches!(err, GatewayError::UnknownFunction(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_path_parameter_performs_zero_network_calls() {
    let server = MockServer::start().await;
    let client = GatewayClient::new(base_config(&server)).unwrap();
    client.register_function("getUser", "/users/{id}", HttpMethod::Get);

    let err = client.invoke("getUser", &Map::new()).await.unwrap_err();
    assert!(matches!(err, GatewayError::MissingPathParameter { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_leftovers_become_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42/posts"))
        .and(query_param("limit", "10"))
        .and(query_param("verbose", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(base_config(&server)).unwrap();
    client.register_function("listPosts", "/users/{id}/posts", HttpMethod::Get);

    let result = client
        .invoke(
            "listPosts",
            &args(&[
                ("id", json!(42)),
                ("limit", json!(10)),
                ("verbose", json!(true)),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(result, json!([]));
}

#[tokio::test]
async fn write_leftovers_become_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_json(json!({"sku": "A-1", "qty": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(base_config(&server)).unwrap();
    client.register_function("createOrder", "/orders", HttpMethod::Post);

    let result = client
        .invoke("createOrder", &args(&[("sku", json!("A-1")), ("qty", json!(2))]))
        .await
        .unwrap();
    assert_eq!(result, json!({"id": 7}));
}

// ── Retry / backoff ─────────────────────────────────────────────────────────

#[tokio::test]
async fn transient_503s_recover_within_the_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    init_logging();
    let config = GatewayConfig::new(server.uri())
        .with_max_retries(2)
        .with_retry_delay_ms(100)
        .with_cache(CachePolicy::disabled());
    let client = GatewayClient::new(config).unwrap();
    client.register_function("flaky", "/flaky", HttpMethod::Get);

    let started = Instant::now();
    let result = client.invoke("flaky", &Map::new()).await.unwrap();
    assert_eq!(result, json!({"ok": true}));
    // Linear backoff: 100ms before attempt 2 plus 200ms before attempt 3.
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn exhausted_retries_surface_unavailable_with_attempt_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let config = base_config(&server).with_max_retries(2);
    let client = GatewayClient::new(config).unwrap();
    client.register_function("down", "/down", HttpMethod::Get);

    let err = client.invoke("down", &Map::new()).await.unwrap_err();
    match err {
        GatewayError::Unavailable { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_404_is_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    // A generous retry budget must not matter for a 4xx.
    let config = base_config(&server).with_max_retries(5);
    let client = GatewayClient::new(config).unwrap();
    client.register_function("nope", "/nope", HttpMethod::Get);

    let err = client.invoke("nope", &Map::new()).await.unwrap_err();
    match err {
        GatewayError::RequestRejected { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "not found");
        }
        other => panic!("expected RequestRejected, got {other:?}"),
    }
}

// ── Caching ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cached_get_hits_the_network_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "open"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = base_config(&server).with_cache(CachePolicy::enabled(1_000));
    let client = GatewayClient::new(config).unwrap();
    client.register_function("getStatus", "/status", HttpMethod::Get);

    let first = client.invoke("getStatus", &Map::new()).await.unwrap();
    let second = client.invoke("getStatus", &Map::new()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn cache_expiry_triggers_a_new_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "open"})))
        .expect(2)
        .mount(&server)
        .await;

    let config = base_config(&server).with_cache(CachePolicy::enabled(150));
    let client = GatewayClient::new(config).unwrap();
    client.register_function("getStatus", "/status", HttpMethod::Get);

    client.invoke("getStatus", &Map::new()).await.unwrap();
    client.invoke("getStatus", &Map::new()).await.unwrap(); // served from cache
    tokio::time::sleep(Duration::from_millis(250)).await;
    client.invoke("getStatus", &Map::new()).await.unwrap(); // expired, refetches
}

#[tokio::test]
async fn different_arguments_are_cached_separately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let config = base_config(&server).with_cache(CachePolicy::enabled(5_000));
    let client = GatewayClient::new(config).unwrap();
    client.register_function("getUser", "/users/{id}", HttpMethod::Get);

    assert_eq!(
        client.invoke("getUser", &args(&[("id", json!(1))])).await.unwrap(),
        json!({"id": 1})
    );
    assert_eq!(
        client.invoke("getUser", &args(&[("id", json!(2))])).await.unwrap(),
        json!({"id": 2})
    );
    // Repeats stay within the expect(1) budgets above.
    client.invoke("getUser", &args(&[("id", json!(1))])).await.unwrap();
    client.invoke("getUser", &args(&[("id", json!(2))])).await.unwrap();
}

#[tokio::test]
async fn disabled_cache_always_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "open"})))
        .expect(3)
        .mount(&server)
        .await;

    let config = base_config(&server).with_cache(CachePolicy::disabled());
    let client = GatewayClient::new(config).unwrap();
    client.register_function("getStatus", "/status", HttpMethod::Get);

    for _ in 0..3 {
        client.invoke("getStatus", &Map::new()).await.unwrap();
    }
}

#[tokio::test]
async fn write_methods_bypass_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(2)
        .mount(&server)
        .await;

    let config = base_config(&server).with_cache(CachePolicy::enabled(60_000));
    let client = GatewayClient::new(config).unwrap();
    client.register_function("createOrder", "/orders", HttpMethod::Post);

    let payload = args(&[("sku", json!("A-1"))]);
    client.invoke("createOrder", &payload).await.unwrap();
    client.invoke("createOrder", &payload).await.unwrap();
}

#[tokio::test]
async fn remapping_to_a_write_method_stops_serving_cached_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/thing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"from": "get"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/thing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"from": "post"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = base_config(&server).with_cache(CachePolicy::enabled(60_000));
    let client = GatewayClient::new(config).unwrap();

    // The GET incarnation populates the cache within the ttl.
    client.register_function("doThing", "/thing", HttpMethod::Get);
    assert_eq!(
        client.invoke("doThing", &Map::new()).await.unwrap(),
        json!({"from": "get"})
    );

    // Hot-remapped to a write method: the cached GET response must not be
    // served; the POST has to reach the backend.
    client.register_function("doThing", "/thing", HttpMethod::Post);
    assert_eq!(
        client.invoke("doThing", &Map::new()).await.unwrap(),
        json!({"from": "post"})
    );
}

// ── Reconfiguration ─────────────────────────────────────────────────────────

#[tokio::test]
async fn reconfigure_clears_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "open"})))
        .expect(2)
        .mount(&server)
        .await;

    let config = base_config(&server).with_cache(CachePolicy::enabled(60_000));
    let client = GatewayClient::new(config.clone()).unwrap();
    client.register_function("getStatus", "/status", HttpMethod::Get);

    client.invoke("getStatus", &Map::new()).await.unwrap();
    client.reconfigure(config).unwrap();
    // Mappings survive a reconfigure; the cached response does not.
    client.invoke("getStatus", &Map::new()).await.unwrap();
}
