use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Category, Question,
    },
    server::{
        app::AppState,
        error::ApiResponse,
        extractors::{AppPath, AppQuery},
        pagination::{require_non_empty, Page, PageQuery, PageSize},
    },
};

/// Categories keyed by id, the shape the quiz frontend renders menus from.
pub(super) type CategoryMap = BTreeMap<i64, String>;

pub(super) fn category_map(categories: Vec<Category>) -> CategoryMap {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: CategoryMap,
}

#[derive(Serialize)]
struct CategoryQuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    current_category: String,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesResponse>> {
    let categories = require_non_empty(categories::get_all_categories(&pool).await?)?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(categories),
    }))
}

async fn get_category_questions(
    State(pool): State<SqlitePool>,
    State(page_size): State<PageSize>,
    AppPath(id): AppPath<i64>,
    AppQuery(query): AppQuery<PageQuery>,
) -> ApiResponse<Json<CategoryQuestionsResponse>> {
    let category = categories::get_category(&pool, id).await?;
    let page = Page::from_query(&query, page_size);
    let page_questions =
        questions::get_questions_page_for_category(&pool, id, page.limit(), page.offset()).await?;
    let page_questions = require_non_empty(page_questions)?;

    Ok(Json(CategoryQuestionsResponse {
        success: true,
        questions: page_questions,
        total_questions: questions::count_questions_for_category(&pool, id).await?,
        current_category: category.kind,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(get_category_questions))
        .with_state(state)
}
