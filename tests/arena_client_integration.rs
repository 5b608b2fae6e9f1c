//! Integration tests for the arena HTTP client against a mock server
//!
//! Covers every endpoint of the battle contract plus the error-detail
//! extraction path.

use serde_json::json;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use arenachat::arena::{ArenaClient, BattleBackend, BattleRequest, HistoryMessage};
use arenachat::config::ServerConfig;
use arenachat::error::ArenaError;

fn client_for(server: &MockServer) -> ArenaClient {
    ArenaClient::new(&ServerConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
    })
    .expect("client builds")
}

#[tokio::test]
async fn test_run_battle_posts_prompt_and_decodes_record() {
    let server = MockServer::start().await;

    let body = json!({
        "id": 42,
        "prompt": "why is the sky blue",
        "created_at": "2026-08-01T12:00:00Z",
        "responses": [
            {
                "model": "alpha",
                "model_display": "Alpha 2",
                "text": "Rayleigh scattering.",
                "average_score": 9.2,
                "is_winner": true,
                "ratings": {
                    "beta": 9.0,
                    "gamma": {"score": 9.4, "reasoning": "clear and correct"}
                }
            },
            {
                "model": "beta",
                "text": "Because of physics.",
                "average_score": 6.1,
                "is_winner": false,
                "ratings": {}
            }
        ],
        "winner": "alpha",
        "tiebreaker_info": {"tie_occurred": false, "method": null}
    });

    Mock::given(method("POST"))
        .and(path("/api/battle"))
        .and(body_partial_json(json!({"prompt": "why is the sky blue"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client
        .run_battle(&BattleRequest::new("why is the sky blue"))
        .await
        .expect("battle succeeds");

    assert_eq!(record.id, 42);
    assert_eq!(record.winning_text(), Some("Rayleigh scattering."));
    assert_eq!(record.responses[0].ratings["beta"].score(), 9.0);
    assert_eq!(
        record.responses[0].ratings["gamma"].reasoning(),
        Some("clear and correct")
    );
}

#[tokio::test]
async fn test_run_battle_sends_history_and_image() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/battle"))
        .and(body_partial_json(json!({
            "conversation_history": [
                {"role": "user", "content": "earlier question"},
                {"role": "assistant", "content": "earlier answer"}
            ],
            "image_data": "data:image/png;base64,AAAA"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "prompt": "p",
            "responses": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = BattleRequest {
        prompt: "p".to_string(),
        conversation_history: Some(vec![
            HistoryMessage {
                role: "user".to_string(),
                content: "earlier question".to_string(),
            },
            HistoryMessage {
                role: "assistant".to_string(),
                content: "earlier answer".to_string(),
            },
        ]),
        image_data: Some("data:image/png;base64,AAAA".to_string()),
    };

    client.run_battle(&request).await.expect("battle succeeds");
}

#[tokio::test]
async fn test_run_battle_surfaces_server_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/battle"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"detail": "Battle failed: judges timed out"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .run_battle(&BattleRequest::new("p"))
        .await
        .expect_err("battle fails");

    assert!(err.to_string().contains("judges timed out"));
}

#[tokio::test]
async fn test_error_without_detail_falls_back_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/battle"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .run_battle(&BattleRequest::new("p"))
        .await
        .expect_err("battle fails");

    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn test_list_battles_most_recent_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/battles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "prompt": "newest", "created_at": "2026-08-03T00:00:00Z"},
            {"id": 2, "prompt": "older", "created_at": "2026-08-02T00:00:00Z"},
            {"id": 1, "prompt": "oldest", "created_at": "2026-08-01T00:00:00Z"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let battles = client.list_battles().await.expect("list succeeds");

    assert_eq!(battles.len(), 3);
    assert_eq!(battles[0].id, 3);
    assert_eq!(battles[0].prompt, "newest");
}

#[tokio::test]
async fn test_get_battle_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/battle/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "prompt": "the prompt",
            "responses": [
                {"model": "alpha", "text": "the answer", "average_score": 8.0, "is_winner": true}
            ],
            "winner": "alpha"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client.get_battle(7).await.expect("get succeeds");

    assert_eq!(record.id, 7);
    assert_eq!(record.winning_text(), Some("the answer"));
}

#[tokio::test]
async fn test_get_missing_battle_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/battle/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Battle not found"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_battle(99).await.expect_err("get fails");

    let arena_err = err.downcast_ref::<ArenaError>().expect("typed error");
    assert!(matches!(arena_err, ArenaError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_battle() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/battle/5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Battle 5 deleted successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.delete_battle(5).await.expect("delete succeeds");
}

#[tokio::test]
async fn test_stats_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "leaderboard": [
                {"model": "alpha", "wins": 12, "average_score": 8.4, "win_rate": 60.0},
                {"model": "beta", "wins": 8, "average_score": 7.9, "win_rate": 40.0}
            ],
            "total_battles": 20
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let stats = client.stats().await.expect("stats succeed");

    assert_eq!(stats.total_battles, 20);
    assert_eq!(stats.leaderboard[0].model, "alpha");
    assert_eq!(stats.leaderboard[1].wins, 8);
}

#[tokio::test]
async fn test_clear_stats() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "All stats cleared successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.clear_stats().await.expect("clear succeeds");
}
