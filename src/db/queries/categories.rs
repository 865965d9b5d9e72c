use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn category_exists(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Replaces the category table content with `categories`, keeping ids.
///
/// Categories missing from `categories` are deleted together with their questions. Runs on
/// the caller's connection so it can share a transaction with [`super::questions::import_questions`].
pub async fn import_categories(
    conn: &mut SqliteConnection,
    categories: Vec<Category>,
) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM categories")
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .collect();
    let new_ids: HashSet<i64> = categories.iter().map(|c| c.id).collect();

    for id in existing_ids.difference(&new_ids) {
        sqlx::query("DELETE FROM categories WHERE categories.id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }
    for category in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, "type") VALUES (?1, ?2)
            ON CONFLICT (id) DO UPDATE SET "type" = excluded."type"
            "#,
        )
        .bind(category.id)
        .bind(category.kind)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
