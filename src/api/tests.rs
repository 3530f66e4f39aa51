use super::interpret::{interpret_prompt, InterpretRequest};
use super::session::{get_board, recent_boards, save_board, RecentQuery};
use super::*;
use crate::config::ModelConfig;
use crate::interpret::LlmClient;
use crate::store::MemoryStore;
use axum::body::{to_bytes, Body};
use axum::extract::{FromRequest, Path, Query, State};
use axum::http::{Request, StatusCode, Uri};
use axum::response::IntoResponse;

fn state() -> AppState {
    let llm = LlmClient::from_config(&ModelConfig::default()).unwrap();
    AppState {
        interpreter: Arc::new(Interpreter::new(llm)),
        store: Arc::new(MemoryStore::new()),
        max_prompt_length: 64,
    }
}

async fn json_rejection(body: &'static str) -> axum::extract::rejection::JsonRejection {
    let request = Request::builder()
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    match Json::<InterpretRequest>::from_request(request, &()).await {
        Err(rejection) => rejection,
        Ok(_) => panic!("expected {} to be rejected", body),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn interpret_without_model_uses_keywords() {
    let Json(response) = interpret_prompt(
        State(state()),
        Ok(Json(InterpretRequest {
            prompt: "draw a rectangle and a circle".to_string(),
        })),
    )
    .await
    .unwrap();

    let shapes = serde_json::to_value(&response).unwrap()["shapes"].clone();
    assert_eq!(shapes[0]["type"], json!("rectangle"));
    assert_eq!(shapes[1]["type"], json!("circle"));
    assert_eq!(shapes.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn interpret_rejects_malformed_bodies() {
    for body in ["{}", r#"{"prompt": 7}"#, "not json"] {
        let rejection = json_rejection(body).await;
        let err = interpret_prompt(State(state()), Err(rejection))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY, "body: {}", body);
    }
}

#[tokio::test]
async fn interpret_rejects_oversized_prompt() {
    let err = interpret_prompt(
        State(state()),
        Ok(Json(InterpretRequest {
            prompt: "circle ".repeat(20),
        })),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::RequestValidation(_)));
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("too long"));
}

#[tokio::test]
async fn save_then_fetch_round_trip() {
    let state = state();
    let board = json!({"_id": "abc", "shapes": [{"type": "circle", "x": 1, "y": 2, "radius": 3}]});

    let Json(ack) = save_board(State(state.clone()), Ok(Json(board.clone())))
        .await
        .unwrap();
    assert_eq!(ack, json!({"status": "ok"}));

    let Json(fetched) = get_board(State(state), Path("abc".to_string()))
        .await
        .unwrap();
    assert_eq!(fetched["_id"], json!("abc"));
    assert_eq!(fetched["shapes"], board["shapes"]);
    assert!(fetched["created_at"].is_string());
}

#[tokio::test]
async fn save_requires_an_id() {
    let err = save_board(State(state()), Ok(Json(json!({"shapes": []}))))
        .await
        .unwrap_err();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"detail": "_id (session id) is required"})
    );

    let err = save_board(State(state()), Ok(Json(json!(["not", "an", "object"]))))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let err = get_board(State(state()), Path("nope".to_string()))
        .await
        .unwrap_err();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"detail": "Session not found"}));
}

#[tokio::test]
async fn recent_lists_saved_boards() {
    let state = state();
    for id in ["first", "second", "third"] {
        let Json(ack) = save_board(State(state.clone()), Ok(Json(json!({ "_id": id }))))
            .await
            .unwrap();
        assert_eq!(ack["status"], json!("ok"));
    }

    let Json(all) = recent_boards(State(state.clone()), Ok(Query(RecentQuery::default())))
        .await
        .unwrap();
    assert_eq!(all.sessions.len(), 3);

    let Json(limited) = recent_boards(State(state), Ok(Query(RecentQuery { limit: Some(2) })))
        .await
        .unwrap();
    assert_eq!(limited.sessions.len(), 2);
}

#[tokio::test]
async fn recent_rejects_bad_limit_as_detail() {
    let uri: Uri = "/api/sessions?limit=abc".parse().unwrap();
    let rejection = match Query::<RecentQuery>::try_from_uri(&uri) {
        Err(rejection) => rejection,
        Ok(_) => panic!("limit=abc should not parse"),
    };

    let err = recent_boards(State(state()), Err(rejection))
        .await
        .unwrap_err();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn save_accepts_free_form_ids() {
    let state = state();
    for id in ["My Board", "board.2024", "sess:1"] {
        let Json(ack) = save_board(State(state.clone()), Ok(Json(json!({ "_id": id }))))
            .await
            .unwrap();
        assert_eq!(ack, json!({"status": "ok"}));

        let Json(fetched) = get_board(State(state.clone()), Path(id.to_string()))
            .await
            .unwrap();
        assert_eq!(fetched["_id"], json!(id));
    }

    let err = save_board(State(state), Ok(Json(json!({ "_id": "" }))))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn router_builds() {
    let _ = router(state());
}
