use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_default_from_null;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Question,
    },
    server::{
        app::AppState, deserializers::QuizCategory, error::ApiResponse, extractors::AppJson, quiz,
    },
    telemetry::QUIZ_QUESTIONS_SERVED,
};

#[derive(Deserialize)]
struct QuizBody {
    quiz_category: QuizCategory,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    previous_questions: Vec<i64>,
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    question: Option<Question>,
    total_questions: usize,
    current_category: Option<String>,
}

async fn play_quiz(
    State(pool): State<SqlitePool>,
    AppJson(body): AppJson<QuizBody>,
) -> ApiResponse<Json<QuizQuestion>> {
    let current_category = match body.quiz_category.id() {
        Some(id) => Some(categories::get_category(&pool, id).await?.kind),
        None => None,
    };
    let candidates = questions::get_questions_for_quiz(&pool, body.quiz_category.id()).await?;
    let total_questions = candidates.len();
    let question = quiz::pick_question(
        candidates,
        &body.previous_questions,
        &mut rand::thread_rng(),
    );

    let label = current_category.as_deref().unwrap_or("all");
    match &question {
        Some(question) => {
            QUIZ_QUESTIONS_SERVED.with_label_values(&[label]).inc();
            tracing::debug!(id = question.id, category = label, "Quiz question served");
        }
        None => tracing::debug!(category = label, "Quiz exhausted"),
    }

    Ok(Json(QuizQuestion {
        success: true,
        question,
        total_questions,
        current_category,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
