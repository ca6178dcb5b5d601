use std::net::TcpListener;
use std::time::Duration;
use tokio::time::sleep;

/// Test that healthcheck succeeds when the server is running.
#[tokio::test]
async fn test_healthcheck_succeeds_when_server_running() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mock_server = tokio::spawn(async move {
        let app = axum::Router::new().route("/health", axum::routing::get(|| async { "OK" }));
        let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}"))
            .await
            .unwrap();
        axum::serve(listener, app).await.unwrap();
    });

    sleep(Duration::from_millis(100)).await;

    let result = logsentry::healthcheck_with_port(port).await;
    assert!(
        result.is_ok(),
        "healthcheck should succeed when the server is running"
    );

    mock_server.abort();
}

/// Test that healthcheck fails when nothing is listening.
#[tokio::test]
async fn test_healthcheck_fails_when_server_not_running() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = logsentry::healthcheck_with_port(port).await;
    assert!(
        result.is_err(),
        "healthcheck should fail when the server is not running"
    );
}

/// Test that healthcheck fails when the endpoint returns a non-2xx status.
#[tokio::test]
async fn test_healthcheck_fails_on_non_success_status() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mock_server = tokio::spawn(async move {
        let app = axum::Router::new().route(
            "/health",
            axum::routing::get(|| async {
                (axum::http::StatusCode::SERVICE_UNAVAILABLE, "Unhealthy")
            }),
        );
        let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}"))
            .await
            .unwrap();
        axum::serve(listener, app).await.unwrap();
    });

    sleep(Duration::from_millis(100)).await;

    let result = logsentry::healthcheck_with_port(port).await;
    assert!(result.is_err(), "healthcheck should fail on non-2xx status");

    mock_server.abort();
}
