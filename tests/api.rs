use std::collections::HashSet;
use std::str::FromStr;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tower::ServiceExt;
use trivia_api::db::run_migrations;
use trivia_api::server::app::{build_router, AppState};
use trivia_api::server::pagination::PageSize;

const SEEDED_QUESTIONS: i64 = 19;

async fn app() -> Router {
    app_with_pool().await.0
}

async fn app_with_pool() -> (Router, SqlitePool) {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    let app = build_router(AppState::new(pool.clone(), PageSize(10)));
    (app, pool)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

fn ids(questions: &Value) -> Vec<i64> {
    questions
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn get_paginated_questions() {
    let app = app().await;
    let (status, data) = get(&app, "/questions").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["success"], true);
    assert_eq!(data["total_questions"], SEEDED_QUESTIONS);
    assert_eq!(data["questions"].as_array().unwrap().len(), 10);
    assert_eq!(data["categories"]["1"], "Science");
    assert_eq!(data["categories"].as_object().unwrap().len(), 6);
    assert!(data["current_category"].is_null());

    let question = &data["questions"][0];
    assert_eq!(question["id"], 2);
    assert_eq!(question["answer"], "Apollo 13");
    assert_eq!(question["category"], 5);
    assert_eq!(question["difficulty"], 4);
}

#[tokio::test]
async fn last_page_is_partial() {
    let app = app().await;
    let (status, data) = get(&app, "/questions?page=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["questions"].as_array().unwrap().len(), 9);
    assert_eq!(data["total_questions"], SEEDED_QUESTIONS);

    let (_, first) = get(&app, "/questions?page=1").await;
    let first_ids: HashSet<i64> = ids(&first["questions"]).into_iter().collect();
    let second_ids: HashSet<i64> = ids(&data["questions"]).into_iter().collect();
    assert!(first_ids.is_disjoint(&second_ids));
    assert_eq!(
        first_ids.union(&second_ids).count() as i64,
        SEEDED_QUESTIONS
    );
}

#[tokio::test]
async fn sent_404_requesting_invalid_page() {
    let app = app().await;
    let (status, data) = get(&app, "/questions?page=999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(data["success"], false);
    assert_eq!(data["message"], "resource not found");
}

#[tokio::test]
async fn malformed_page_is_400() {
    let app = app().await;
    let (status, data) = get(&app, "/questions?page=two").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(data["success"], false);
}

#[tokio::test]
async fn delete_question() {
    let app = app().await;
    let (status, data) = delete(&app, "/questions/5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["success"], true);
    assert_eq!(data["deleted"], 5);
    assert_eq!(data["total_questions"], SEEDED_QUESTIONS - 1);

    let (_, first) = get(&app, "/questions?page=1").await;
    let (_, second) = get(&app, "/questions?page=2").await;
    assert!(!ids(&first["questions"]).contains(&5));
    assert!(!ids(&second["questions"]).contains(&5));

    let (status, data) = delete(&app, "/questions/5").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(data["message"], "unprocessable");
}

#[tokio::test]
async fn sent_422_delete_invalid_question() {
    let app = app().await;
    let (status, data) = delete(&app, "/questions/999").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(data["success"], false);
    assert_eq!(data["message"], "unprocessable");
}

#[tokio::test]
async fn delete_storage_failure_is_422() {
    let (app, pool) = app_with_pool().await;
    pool.close().await;

    let (status, data) = delete(&app, "/questions/5").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(data["success"], false);
    assert_eq!(data["message"], "unprocessable");
}

#[tokio::test]
async fn create_question() {
    let app = app().await;
    let (status, data) = post(
        &app,
        "/questions",
        json!({
            "question": "What is known as the powerhouse of the cell?",
            "answer": "MITOCHONDRIA",
            "difficulty": 2,
            "category": 1,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["success"], true);
    assert_eq!(data["total_questions"], SEEDED_QUESTIONS + 1);
    let created = data["created"].as_i64().unwrap();
    assert!(created > 23);

    let (_, page) = get(&app, "/questions?page=2").await;
    assert!(ids(&page["questions"]).contains(&created));
}

#[tokio::test]
async fn create_accepts_numeric_strings() {
    let app = app().await;
    let (status, data) = post(
        &app,
        "/questions",
        json!({
            "question": "Which planet is closest to the sun?",
            "answer": "Mercury",
            "difficulty": "1",
            "category": "1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["success"], true);
}

#[tokio::test]
async fn sent_422_create_invalid_question() {
    let app = app().await;
    let invalid = [
        json!({"question": "Missing answer?", "difficulty": 1, "category": 1}),
        json!({"question": "  ", "answer": "blank", "difficulty": 1, "category": 1}),
        json!({"question": "Too hard?", "answer": "yes", "difficulty": 9, "category": 1}),
        json!({"question": "No category?", "answer": "no", "difficulty": 1, "category": 999}),
        json!({"question": "Words?", "answer": "no", "difficulty": "hard", "category": 1}),
    ];
    for body in invalid {
        let (status, data) = post(&app, "/questions", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(data["message"], "unprocessable");
    }

    let (_, data) = get(&app, "/questions").await;
    assert_eq!(data["total_questions"], SEEDED_QUESTIONS);
}

#[tokio::test]
async fn non_json_body_is_422() {
    let app = app().await;
    let (status, data) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/questions")
            .header("content-type", "text/plain")
            .body(Body::from("question=What"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(data["success"], false);
}

#[tokio::test]
async fn search_questions() {
    let app = app().await;
    let (status, data) = post(&app, "/questions/search", json!({"searchTerm": "What"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["success"], true);
    let questions = data["questions"].as_array().unwrap();
    assert!(!questions.is_empty());
    assert_eq!(data["total_questions"], questions.len());
    assert!(questions.iter().all(|q| q["question"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("what")));

    let (_, lower) = post(&app, "/questions/search", json!({"searchTerm": "what"})).await;
    assert_eq!(lower["questions"], data["questions"]);
}

#[tokio::test]
async fn search_without_matches() {
    let app = app().await;
    let (status, data) = post(&app, "/questions/search", json!({"searchTerm": "title"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["success"], true);
    assert_eq!(data["questions"], json!([]));
    assert_eq!(data["total_questions"], 0);
}

#[tokio::test]
async fn search_term_keeps_surrounding_spaces() {
    let app = app().await;
    let (_, exact) = post(&app, "/questions/search", json!({"searchTerm": "Africa"})).await;
    assert_eq!(ids(&exact["questions"]), [13]);

    let (status, padded) = post(&app, "/questions/search", json!({"searchTerm": "Africa "})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(padded["total_questions"], 0);

    let (_, inner) = post(&app, "/questions/search", json!({"searchTerm": " lake "})).await;
    assert_eq!(ids(&inner["questions"]), [13]);
}

#[tokio::test]
async fn empty_search_term_is_rejected() {
    let app = app().await;
    for body in [json!({"searchTerm": ""}), json!({"searchTerm": "   "}), json!({})] {
        let (status, data) = post(&app, "/questions/search", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(data["message"], "unprocessable");
    }
}

#[tokio::test]
async fn get_categories() {
    let app = app().await;
    let (status, data) = get(&app, "/categories").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["success"], true);
    assert_eq!(
        data["categories"],
        json!({
            "1": "Science",
            "2": "Art",
            "3": "Geography",
            "4": "History",
            "5": "Entertainment",
            "6": "Sports",
        })
    );
}

#[tokio::test]
async fn category_questions() {
    let app = app().await;
    let (status, data) = get(&app, "/categories/4/questions").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["success"], true);
    assert_eq!(data["total_questions"], 4);
    assert_eq!(ids(&data["questions"]), [5, 9, 12, 23]);
    assert_eq!(data["current_category"], "History");
}

#[tokio::test]
async fn sent_404_for_unknown_category() {
    let app = app().await;
    let (status, data) = get(&app, "/categories/1000/questions").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(data["success"], false);
    assert_eq!(data["message"], "resource not found");

    let (status, _) = get(&app, "/categories/4/questions?page=2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn play_quizzes() {
    let app = app().await;
    let (status, data) = post(
        &app,
        "/quizzes",
        json!({"quiz_category": "5", "previous_questions": [2, 4]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["success"], true);
    assert_eq!(data["total_questions"], 3);
    assert_eq!(data["question"]["id"], 6);
    assert_eq!(data["current_category"], "Entertainment");
}

#[tokio::test]
async fn quiz_walks_category_until_exhausted() {
    let app = app().await;
    let mut previous: Vec<i64> = Vec::new();
    loop {
        let (status, data) = post(
            &app,
            "/quizzes",
            json!({
                "quiz_category": {"id": 2, "type": "Art"},
                "previous_questions": previous,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(data["success"], true);
        if data["question"].is_null() {
            break;
        }
        let id = data["question"]["id"].as_i64().unwrap();
        assert_eq!(data["question"]["category"], 2);
        assert!(!previous.contains(&id));
        previous.push(id);
    }
    previous.sort_unstable();
    assert_eq!(previous, [16, 17, 18, 19]);
}

#[tokio::test]
async fn quiz_over_all_categories() {
    let app = app().await;
    let (status, data) = post(
        &app,
        "/quizzes",
        json!({"quiz_category": {"id": 0, "type": "click"}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["total_questions"], SEEDED_QUESTIONS);
    assert!(data["question"].is_object());
    assert!(data["current_category"].is_null());

    let (status, data) = post(
        &app,
        "/quizzes",
        json!({"quiz_category": "ALL", "previous_questions": null}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(data["question"].is_object());
}

#[tokio::test]
async fn quiz_for_unknown_category_is_404() {
    let app = app().await;
    let (status, data) = post(
        &app,
        "/quizzes",
        json!({"quiz_category": 1000, "previous_questions": []}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(data["message"], "resource not found");
}

#[tokio::test]
async fn quiz_without_category_is_422() {
    let app = app().await;
    let (status, data) = post(&app, "/quizzes", json!({"previous_questions": []})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(data["success"], false);
}
