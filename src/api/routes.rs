use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use crate::api::handlers::{
    admin::rebuild_league,
    leagues::list_leagues,
    matches::{get_ladder, get_matches, report_match},
    players::{get_player_detail, register_player, set_nickname},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/leagues", get(list_leagues))
        .route("/api/:league/ladder", get(get_ladder))
        .route("/api/:league/matches", get(get_matches))
        .route("/api/:league/players", post(register_player))
        .route("/api/:league/player/:id", get(get_player_detail))
        .route("/api/:league/player/:id/nickname", put(set_nickname))
        .route("/api/:league/report", post(report_match))
        .route("/api/:league/rebuild", post(rebuild_league))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::config::settings::AppConfig;
    use crate::services::LadderService;
    use crate::store::MemoryStore;

    fn app_with(config: AppConfig) -> Router {
        let service = LadderService::new(Arc::new(MemoryStore::new()), &config);
        create_router(Arc::new(AppState::new(service, config)))
    }

    fn app() -> Router {
        app_with(AppConfig::new())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(app: &Router, league: &str, id: &str) {
        let (status, _) = send(
            app,
            "POST",
            &format!("/api/{league}/players"),
            Some(json!({ "playerId": id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_report_and_read_ladder() {
        let app = app();
        register(&app, "fifadev", "ann").await;
        register(&app, "fifadev", "bob").await;

        let (status, applied) = send(
            &app,
            "POST",
            "/api/fifadev/report",
            Some(json!({
                "reporter": "bob",
                "opponent": "ann",
                "outcome": "loss",
                "reporterScore": "0",
                "opponentScore": 3
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(applied["winner"]["playerId"], "ann");
        assert_eq!(applied["winner"]["rating"], 1543);
        assert_eq!(applied["match"]["winnerScore"], 3);

        let (status, ladder) = send(&app, "GET", "/api/fifadev/ladder", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ladder["players"][0]["playerId"], "ann");
        assert_eq!(ladder["players"][0]["rank"], 1);
        assert_eq!(ladder["players"][1]["ratingChange"], -25);
        assert_eq!(ladder["recentMatches"].as_array().unwrap().len(), 1);

        let (_, leagues) = send(&app, "GET", "/api/leagues", None).await;
        assert_eq!(leagues["items"][0]["name"], "fifadev");
    }

    #[tokio::test]
    async fn test_invalid_report_is_bad_request() {
        let app = app();
        register(&app, "fifadev", "ann").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/fifadev/report",
            Some(json!({
                "reporter": "ann",
                "opponent": "ann",
                "outcome": "win",
                "reporterScore": 1,
                "opponentScore": 0
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid match"));
    }

    #[tokio::test]
    async fn test_fractional_score_is_bad_request() {
        let app = app();
        register(&app, "fifadev", "ann").await;
        register(&app, "fifadev", "bob").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/fifadev/report",
            Some(json!({
                "reporter": "ann",
                "opponent": "bob",
                "outcome": "win",
                "reporterScore": 2.5,
                "opponentScore": 0
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("reporter score"));
    }

    #[tokio::test]
    async fn test_missing_player_and_league_are_not_found() {
        let app = app();
        register(&app, "fifadev", "ann").await;

        let (status, _) = send(&app, "GET", "/api/fifadev/player/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/api/nowhere/ladder", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_nickname_shows_in_player_detail() {
        let app = app();
        register(&app, "fifadev", "ann").await;

        let (status, _) = send(
            &app,
            "PUT",
            "/api/fifadev/player/ann/nickname",
            Some(json!({ "nickname": "Annie" })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, detail) = send(&app, "GET", "/api/fifadev/player/ann", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["displayName"], "Annie (ann)");
        assert_eq!(detail["confidenceLevel"], "provisional");
        assert_eq!(detail["rating"], 0);
    }

    #[tokio::test]
    async fn test_rebuild_requires_token_when_configured() {
        let mut config = AppConfig::new();
        config.server.admin_token = Some("secret".to_string());
        let app = app_with(config);
        register(&app, "fifadev", "ann").await;

        let (status, _) = send(&app, "POST", "/api/fifadev/rebuild", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .method("POST")
            .uri("/api/fifadev/rebuild")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let summary: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(summary["playersReset"], 1);
        assert_eq!(summary["matchesReplayed"], 0);
    }
}
