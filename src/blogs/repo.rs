use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::blogs::dto::{BlogAuthor, BlogListItem, BlogListQuery};

/// Blog record in the content store. The wire shape follows the documented
/// contract: camelCase keys, author exposed as `author`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    #[serde(rename = "author")]
    pub author_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Row from the list query: blog columns joined with the author's username.
#[derive(Debug, FromRow)]
pub struct BlogWithAuthorRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub author_id: Uuid,
    pub author_username: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<BlogWithAuthorRow> for BlogListItem {
    fn from(r: BlogWithAuthorRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            content: r.content,
            category: r.category,
            author: BlogAuthor {
                id: r.author_id,
                username: r.author_username,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Map a client-facing sort field onto a real column. Unknown fields fall
/// back to creation time rather than erroring.
pub(crate) fn sort_column(sort_by: &str) -> &'static str {
    match sort_by {
        "updatedAt" => "updated_at",
        "title" => "title",
        _ => "created_at",
    }
}

/// Substring search pattern for ILIKE, with the pattern metacharacters
/// escaped so user input stays literal.
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const FILTER_SQL: &str = r#"
    WHERE ($1::text IS NULL OR b.title ILIKE $1 OR b.content ILIKE $1)
      AND ($2::text IS NULL OR b.category = $2)
"#;

pub async fn insert(
    db: &PgPool,
    author_id: Uuid,
    title: &str,
    content: &str,
    category: Option<&str>,
) -> anyhow::Result<Blog> {
    let blog = sqlx::query_as::<_, Blog>(
        r#"
        INSERT INTO blogs (title, content, category, author_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, content, category, author_id, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(category)
    .bind(author_id)
    .fetch_one(db)
    .await?;
    Ok(blog)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Blog>> {
    let blog = sqlx::query_as::<_, Blog>(
        r#"
        SELECT id, title, content, category, author_id, created_at, updated_at
        FROM blogs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(blog)
}

/// Partial update: absent fields keep their current value. Returns None when
/// the blog does not exist.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    content: Option<&str>,
    category: Option<&str>,
) -> anyhow::Result<Option<Blog>> {
    let blog = sqlx::query_as::<_, Blog>(
        r#"
        UPDATE blogs
        SET title = COALESCE($2, title),
            content = COALESCE($3, content),
            category = COALESCE($4, category),
            updated_at = now()
        WHERE id = $1
        RETURNING id, title, content, category, author_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .bind(category)
    .fetch_optional(db)
    .await?;
    Ok(blog)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM blogs WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// List matching blogs with the author joined in, sorted and paginated.
/// The query must already be normalized.
pub async fn list(db: &PgPool, query: &BlogListQuery) -> anyhow::Result<Vec<BlogWithAuthorRow>> {
    let col = sort_column(&query.sort_by);
    let dir = if query.sort_order == "asc" { "ASC" } else { "DESC" };
    // col and dir come from fixed whitelists, never from user input.
    let sql = format!(
        r#"
        SELECT b.id, b.title, b.content, b.category, b.author_id,
               u.username AS author_username, b.created_at, b.updated_at
        FROM blogs b
        JOIN users u ON u.id = b.author_id
        {FILTER_SQL}
        ORDER BY b.{col} {dir}
        LIMIT $3 OFFSET $4
        "#
    );

    let rows = sqlx::query_as::<_, BlogWithAuthorRow>(&sql)
        .bind(query.search.as_deref().map(like_pattern))
        .bind(query.category.as_deref())
        .bind(query.limit)
        .bind(query.offset())
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn count(db: &PgPool, query: &BlogListQuery) -> anyhow::Result<i64> {
    let sql = format!(
        r#"
        SELECT COUNT(*)
        FROM blogs b
        {FILTER_SQL}
        "#
    );
    let total: i64 = sqlx::query_scalar(&sql)
        .bind(query.search.as_deref().map(like_pattern))
        .bind(query.category.as_deref())
        .fetch_one(db)
        .await?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_column_whitelists_fields() {
        assert_eq!(sort_column("createdAt"), "created_at");
        assert_eq!(sort_column("updatedAt"), "updated_at");
        assert_eq!(sort_column("title"), "title");
        // Anything unknown falls back instead of reaching the SQL string.
        assert_eq!(sort_column("password_hash"), "created_at");
        assert_eq!(sort_column("1; DROP TABLE blogs"), "created_at");
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("hello"), "%hello%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }

    #[test]
    fn blog_serializes_with_contract_keys() {
        let blog = Blog {
            id: Uuid::new_v4(),
            title: "Hello".into(),
            content: "World content".into(),
            category: None,
            author_id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&blog).unwrap();
        assert!(json.get("author").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("author_id").is_none());
    }
}
