use axum::{extract::State, http::StatusCode};
use storefront_api::{config::AppConfig, routes::health, state::AppState};

#[tokio::test]
async fn health_check_returns_ok_envelope() {
    let response = health::health_check().await;
    let body = serde_json::to_value(&response.0).expect("serialize envelope");

    assert_eq!(body["message"], "Health check");
    assert_eq!(body["data"]["status"], "ok");
    assert!(body["meta"]["page"].is_null());
}

#[tokio::test]
async fn readiness_reports_reachable_database() -> anyhow::Result<()> {
    let Ok(database_url) =
        std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
    else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to check readiness.");
        return Ok(());
    };

    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "DB_MAX_CONNECTIONS" => Some("1".into()),
        _ => None,
    })?;
    let state = AppState::connect(&config).await?;

    let (status, body) = health::readiness(State(state)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.0.data.expect("readiness data").status, "ok");

    Ok(())
}
