mod common;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = common::create_test_app(vec![]);

    let response = app.server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["engagement_queue"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_queue_closed() {
    let common::TestApp {
        server,
        engagement_rx,
        ..
    } = common::create_test_app(vec![]);
    drop(engagement_rx);

    let response = server.get("/health").await;

    response.assert_status_service_unavailable();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["engagement_queue"]["status"], "error");
}
