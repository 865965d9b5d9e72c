use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub struct NewQuestion<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

pub async fn count_questions_for_category(pool: &SqlitePool, category: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE questions.category = ?1")
        .bind(category)
        .fetch_one(pool)
        .await
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_questions_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        ORDER BY id
        LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn get_questions_page_for_category(
    pool: &SqlitePool,
    category: i64,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(category)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Questions a quiz may draw from; `None` means every category.
pub async fn get_questions_for_quiz(
    pool: &SqlitePool,
    category: Option<i64>,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE ?1 IS NULL OR questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring search over question text.
///
/// `%` and `_` in `term` match literally.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.question LIKE '%' || ?1 || '%' ESCAPE '\'
        ORDER BY id
        "#,
    )
    .bind(escape_like(term))
    .fetch_all(pool)
    .await
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub async fn create_question(pool: &SqlitePool, new: NewQuestion<'_>) -> sqlx::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(new.question)
    .bind(new.answer)
    .bind(new.category)
    .bind(new.difficulty)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns `false` when no question with `id` exists.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    let mut conn = pool.acquire().await?;

    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(deleted > 0)
}

/// Replaces the question table content with `questions`, keeping ids.
pub async fn import_questions(
    conn: &mut SqliteConnection,
    questions: Vec<Question>,
) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM questions")
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .collect();
    let new_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();

    for id in existing_ids.difference(&new_ids) {
        sqlx::query("DELETE FROM questions WHERE questions.id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                category = excluded.category,
                difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
