#![allow(clippy::unwrap_used)]
// Integration tests for `PanelClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fwdctl_api::{Endpoint, Error, NodeRecord, PanelClient, RuleRecord};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, PanelClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = PanelClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn node(name: &str, host: &str) -> NodeRecord {
    NodeRecord {
        name: name.into(),
        host: host.into(),
        port: 8080,
        password: "secret".into(),
        https: false,
    }
}

// ── Rule tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_rules() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_rules"))
        .and(query_param("page", "1"))
        .and(query_param("size", "10"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rules": [
                { "listen": "0.0.0.0:8080", "remote": "1.2.3.4:443" },
                { "Listen": "0.0.0.0:9000", "Remote": "[::1]:22" }
            ],
            "total": 12
        })))
        .mount(&server)
        .await;

    let endpoint = Endpoint::get("/get_rules")
        .with_query("page", 1)
        .with_query("size", 10);
    let page = client.list_rules(&endpoint).await.unwrap();

    assert_eq!(page.total, 12);
    assert_eq!(page.rules.len(), 2);
    assert_eq!(page.rules[1].remote, "[::1]:22");
}

#[tokio::test]
async fn test_list_rules_invalid_shape() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_rules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rules": "nope" })))
        .mount(&server)
        .await;

    let result = client.list_rules(&Endpoint::get("/get_rules")).await;
    assert!(
        matches!(result, Err(Error::InvalidResponse { .. })),
        "expected InvalidResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn test_add_rule_posts_json_body() {
    let (server, client) = setup().await;
    let rule = RuleRecord {
        listen: "0.0.0.0:8080".into(),
        remote: "example.com:80".into(),
    };

    Mock::given(method("POST"))
        .and(path("/api/nodes/0/rules"))
        .and(body_json(json!({ "listen": "0.0.0.0:8080", "remote": "example.com:80" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .add_rule(&Endpoint::post("/api/nodes/0/rules"), &rule)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_add_rule_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/add_rule"))
        .respond_with(ResponseTemplate::new(409).set_body_string("port already in use"))
        .mount(&server)
        .await;

    let rule = RuleRecord {
        listen: "0.0.0.0:8080".into(),
        remote: "a:1".into(),
    };
    let result = client.add_rule(&Endpoint::post("/add_rule"), &rule).await;

    match result {
        Err(Error::Rejected { status, ref message }) => {
            assert_eq!(status, 409);
            assert!(message.contains("already in use"), "got: {message}");
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_rule_sends_listen_query() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/delete_rule"))
        .and(query_param("listen", "0.0.0.0:8080"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = Endpoint::delete("/delete_rule").with_query("listen", "0.0.0.0:8080");
    client.delete_rule(&endpoint).await.unwrap();
}

// ── Service tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_service_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/check_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "运行中" })))
        .mount(&server)
        .await;

    let status = client
        .service_status(&Endpoint::get("/check_status"))
        .await
        .unwrap();
    assert_eq!(status, "运行中");
}

#[tokio::test]
async fn test_service_control_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/restart_service"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client
        .service_control(&Endpoint::post("/restart_service"))
        .await;
    assert!(matches!(result, Err(Error::Rejected { status: 500, .. })));
}

#[tokio::test]
async fn test_connection_refused_is_transport() {
    let client = PanelClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:1").unwrap(),
    );
    let err = client
        .service_status(&Endpoint::get("/check_status"))
        .await
        .unwrap_err();
    assert!(err.is_transport(), "expected transport error, got: {err:?}");
}

// ── Node registry tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_list_nodes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [
                { "name": "edge", "host": "10.0.0.2", "port": 8080, "password": "x", "https": true },
                { "name": "", "host": "10.0.0.3", "port": 9090 }
            ]
        })))
        .mount(&server)
        .await;

    let nodes = client.list_nodes().await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert!(nodes[0].https);
    assert_eq!(nodes[1].port, 9090);
    assert!(!nodes[1].https);
}

#[tokio::test]
async fn test_add_node_refetches_when_reply_has_no_list() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [{ "name": "edge", "host": "10.0.0.2", "port": 8080 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let nodes = client.add_node(&node("edge", "10.0.0.2")).await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "edge");
}

#[tokio::test]
async fn test_remove_node_uses_reply_list() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/nodes/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [{ "name": "a", "host": "10.0.0.2", "port": 8080 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let nodes = client.remove_node(1).await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "a");
}
