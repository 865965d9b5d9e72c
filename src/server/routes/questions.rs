use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        error::{ApiError, ApiResponse},
        extractors::{AppJson, AppPath, AppQuery},
        pagination::{require_non_empty, Page, PageQuery, PageSize},
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::categories::{category_map, CategoryMap};

const DIFFICULTY_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

#[derive(Deserialize)]
struct QuestionBody {
    question: String,
    answer: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    category: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    difficulty: i64,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm")]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: CategoryMap,
    current_category: Option<String>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<String>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
    total_questions: i64,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
    total_questions: i64,
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    State(page_size): State<PageSize>,
    AppQuery(query): AppQuery<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let page = Page::from_query(&query, page_size);
    let page_questions = questions::get_questions_page(&pool, page.limit(), page.offset()).await?;
    let page_questions = require_non_empty(page_questions)?;

    Ok(Json(QuestionsPage {
        success: true,
        questions: page_questions,
        total_questions: questions::count_questions(&pool).await?,
        categories: category_map(categories::get_all_categories(&pool).await?),
        current_category: None,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    AppJson(body): AppJson<QuestionBody>,
) -> ApiResponse<Json<Created>> {
    let question = body.question.trim();
    let answer = body.answer.trim();
    if question.is_empty() || answer.is_empty() || !DIFFICULTY_RANGE.contains(&body.difficulty) {
        return Err(ApiError::Unprocessable);
    }
    if !categories::category_exists(&pool, body.category).await? {
        tracing::debug!(category = body.category, "Question for unknown category");
        return Err(ApiError::Unprocessable);
    }

    let id = questions::create_question(
        &pool,
        NewQuestion {
            question,
            answer,
            category: body.category,
            difficulty: body.difficulty,
        },
    )
    .await
    .map_err(ApiError::unprocessable)?;
    QUESTIONS_CREATED.inc();
    tracing::info!(id, "Question created");

    Ok(Json(Created {
        success: true,
        created: id,
        total_questions: questions::count_questions(&pool).await?,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    AppPath(id): AppPath<i64>,
) -> ApiResponse<Json<Deleted>> {
    let deleted = questions::delete_question(&pool, id)
        .await
        .map_err(ApiError::unprocessable)?;
    if !deleted {
        return Err(ApiError::Unprocessable);
    }
    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Question deleted");

    Ok(Json(Deleted {
        success: true,
        deleted: id,
        total_questions: questions::count_questions(&pool).await?,
    }))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    AppJson(body): AppJson<SearchBody>,
) -> ApiResponse<Json<SearchResults>> {
    if body.search_term.trim().is_empty() {
        return Err(ApiError::Unprocessable);
    }
    let found = questions::search_questions(&pool, &body.search_term).await?;

    Ok(Json(SearchResults {
        success: true,
        total_questions: found.len(),
        questions: found,
        current_category: None,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/questions/search", post(search_questions))
        .with_state(state)
}
