use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const TITLE_MAX_CHARS: usize = 200;
pub const CONTENT_MAX_CHARS: usize = 50_000;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
}

impl CreateBlogRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_content(&self.content)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

impl UpdateBlogRequest {
    /// Only provided fields are re-validated, same rules as creation.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(content) = &self.content {
            validate_content(content)?;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required.".into());
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(format!("Title must be at most {TITLE_MAX_CHARS} characters."));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Content is required.".into());
    }
    if content.chars().count() > CONTENT_MAX_CHARS {
        return Err(format!(
            "Content must be at most {CONTENT_MAX_CHARS} characters."
        ));
    }
    Ok(())
}

/// Query string for GET /api/blogs. Serialize is derived too so the client
/// library can reuse the same struct for its requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}
fn default_sort_by() -> String {
    "createdAt".into()
}
fn default_sort_order() -> String {
    "desc".into()
}

impl Default for BlogListQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            page: default_page(),
            limit: default_limit(),
            sort_by: default_sort_by(),
            sort_order: default_sort_order(),
        }
    }
}

impl BlogListQuery {
    /// Clamp page and limit to sane ranges; the limit cap keeps responses
    /// bounded no matter what the client asks for.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

pub fn total_pages(total_blogs: i64, limit: i64) -> i64 {
    if total_blogs == 0 {
        0
    } else {
        (total_blogs + limit - 1) / limit
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogAuthor {
    pub id: Uuid,
    pub username: String,
}

/// List item: the blog plus its author's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListItem {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub author: BlogAuthor,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListResponse {
    pub total_blogs: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub blogs: Vec<BlogListItem>,
}
