//! API client for the blog list: the state machine behind the home page
//! (paging, search, markdown previews), decoupled from any rendering.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use crate::blogs::dto::{BlogListItem, BlogListQuery, BlogListResponse};

/// The home page shows four blogs at a time.
pub const HOME_PAGE_SIZE: i64 = 4;
/// Character budget for plain-text previews.
pub const PREVIEW_CHARS: usize = 100;

#[async_trait]
pub trait BlogFetcher: Send + Sync {
    async fn list(&self, query: &BlogListQuery) -> anyhow::Result<BlogListResponse>;
}

/// Fetcher backed by the real HTTP API.
pub struct HttpBlogFetcher {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBlogFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BlogFetcher for HttpBlogFetcher {
    async fn list(&self, query: &BlogListQuery) -> anyhow::Result<BlogListResponse> {
        let res = self
            .http
            .get(format!("{}/api/blogs", self.base_url))
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }
}

/// Client-side list state: current page, fixed page size, last known total
/// pages, search term, and the blogs on display.
pub struct BlogBrowser<F> {
    fetcher: F,
    page: i64,
    total_pages: i64,
    search_term: String,
    blogs: Vec<BlogListItem>,
}

impl<F: BlogFetcher> BlogBrowser<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            page: 1,
            total_pages: 1,
            search_term: String::new(),
            blogs: Vec::new(),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn total_pages(&self) -> i64 {
        self.total_pages
    }

    pub fn blogs(&self) -> &[BlogListItem] {
        &self.blogs
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// "Previous" is disabled on the first page.
    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    /// "Next" is disabled on the last known total page.
    pub fn can_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Fetch the current page and refresh both the list and the page count.
    pub async fn load(&mut self) -> anyhow::Result<()> {
        let query = BlogListQuery {
            page: self.page,
            limit: HOME_PAGE_SIZE,
            ..Default::default()
        };
        let res = self.fetcher.list(&query).await?;
        self.blogs = res.blogs;
        self.total_pages = res.total_pages;
        Ok(())
    }

    pub async fn next_page(&mut self) -> anyhow::Result<()> {
        if self.can_next() {
            self.page += 1;
            self.load().await?;
        }
        Ok(())
    }

    pub async fn prev_page(&mut self) -> anyhow::Result<()> {
        if self.can_prev() {
            self.page -= 1;
            self.load().await?;
        }
        Ok(())
    }

    /// Fetch a filtered list and replace what's displayed. Deliberately does
    /// NOT touch `total_pages`: the original SPA left the pagination controls
    /// pointing at the pre-search totals, and that behavior is kept.
    pub async fn submit_search(&mut self) -> anyhow::Result<()> {
        let query = BlogListQuery {
            search: Some(self.search_term.clone()),
            limit: HOME_PAGE_SIZE,
            ..Default::default()
        };
        let res = self.fetcher.list(&query).await?;
        self.blogs = res.blogs;
        Ok(())
    }

    /// Plain-text previews for the current list.
    pub fn previews(&self) -> Vec<String> {
        self.blogs
            .iter()
            .map(|b| truncate_markdown(&b.content, PREVIEW_CHARS))
            .collect()
    }
}

/// Strip markdown markup and truncate to a character budget, appending an
/// ellipsis marker when the text was cut.
pub fn truncate_markdown(markdown: &str, budget: usize) -> String {
    lazy_static! {
        static ref IMAGE_RE: Regex = Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap();
        static ref LINK_RE: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
        static ref HEADING_RE: Regex = Regex::new(r"(?m)^#{1,6}\s*").unwrap();
        static ref QUOTE_RE: Regex = Regex::new(r"(?m)^>\s?").unwrap();
        static ref BULLET_RE: Regex = Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").unwrap();
        static ref FENCE_RE: Regex = Regex::new(r"(?m)^```[^\n]*$").unwrap();
        static ref MARK_RE: Regex = Regex::new(r"[*_`~]").unwrap();
    }

    let text = IMAGE_RE.replace_all(markdown, "$1");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = HEADING_RE.replace_all(&text, "");
    let text = QUOTE_RE.replace_all(&text, "");
    let text = BULLET_RE.replace_all(&text, "");
    let text = FENCE_RE.replace_all(&text, "");
    let text = MARK_RE.replace_all(&text, "");
    let plain = text.trim();

    if plain.chars().count() > budget {
        let cut: String = plain.chars().take(budget).collect();
        format!("{cut}...")
    } else {
        plain.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blogs::dto::{total_pages, BlogAuthor};
    use std::sync::{Arc, Mutex};
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn item(title: &str, content: &str) -> BlogListItem {
        BlogListItem {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            category: None,
            author: BlogAuthor {
                id: Uuid::new_v4(),
                username: "alice".into(),
            },
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    /// Serves pages out of a fixed 9-blog corpus and records every query.
    #[derive(Clone)]
    struct FakeFetcher {
        calls: Arc<Mutex<Vec<BlogListQuery>>>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl BlogFetcher for FakeFetcher {
        async fn list(&self, query: &BlogListQuery) -> anyhow::Result<BlogListResponse> {
            self.calls.lock().unwrap().push(query.clone());

            if query.search.is_some() {
                return Ok(BlogListResponse {
                    total_blogs: 1,
                    current_page: 1,
                    total_pages: 1,
                    blogs: vec![item("Match", "found it")],
                });
            }

            let total_blogs = 9;
            let blogs = (0..query.limit.min(total_blogs))
                .map(|i| item(&format!("Blog {i}"), "body"))
                .collect();
            Ok(BlogListResponse {
                total_blogs,
                current_page: query.page,
                total_pages: total_pages(total_blogs, query.limit),
                blogs,
            })
        }
    }

    #[tokio::test]
    async fn load_sets_blogs_and_total_pages() {
        let fetcher = FakeFetcher::new();
        let mut browser = BlogBrowser::new(fetcher.clone());
        browser.load().await.unwrap();

        assert_eq!(browser.total_pages(), 3); // ceil(9 / 4)
        assert_eq!(browser.blogs().len(), 4);
        assert!(!browser.can_prev());
        assert!(browser.can_next());

        let calls = fetcher.calls.lock().unwrap();
        assert_eq!(calls[0].page, 1);
        assert_eq!(calls[0].limit, HOME_PAGE_SIZE);
    }

    #[tokio::test]
    async fn paging_clamps_at_both_ends() {
        let fetcher = FakeFetcher::new();
        let mut browser = BlogBrowser::new(fetcher.clone());
        browser.load().await.unwrap();

        // Previous is a no-op on page 1.
        browser.prev_page().await.unwrap();
        assert_eq!(browser.page(), 1);

        browser.next_page().await.unwrap();
        browser.next_page().await.unwrap();
        assert_eq!(browser.page(), 3);
        assert!(!browser.can_next());

        // Next is a no-op on the last page.
        browser.next_page().await.unwrap();
        assert_eq!(browser.page(), 3);
    }

    #[tokio::test]
    async fn search_replaces_list_but_leaves_totals_stale() {
        let fetcher = FakeFetcher::new();
        let mut browser = BlogBrowser::new(fetcher.clone());
        browser.load().await.unwrap();
        assert_eq!(browser.total_pages(), 3);

        browser.set_search_term("found");
        browser.submit_search().await.unwrap();

        assert_eq!(browser.blogs().len(), 1);
        assert_eq!(browser.blogs()[0].title, "Match");
        // Pagination controls still reference the pre-search page count.
        assert_eq!(browser.total_pages(), 3);

        let calls = fetcher.calls.lock().unwrap();
        let search_call = calls.last().unwrap();
        assert_eq!(search_call.search.as_deref(), Some("found"));
        assert_eq!(search_call.limit, HOME_PAGE_SIZE);
    }

    #[test]
    fn truncate_strips_markup() {
        let md = "# Title\n\nSome *bold* text with a [link](https://x.com) and ![img](a.png).";
        let plain = truncate_markdown(md, 500);
        assert!(!plain.contains('#'));
        assert!(!plain.contains('*'));
        assert!(!plain.contains("https://x.com"));
        assert!(plain.contains("link"));
        assert!(plain.contains("Title"));
        assert!(plain.contains("img"));
    }

    #[test]
    fn truncate_respects_budget_with_ellipsis() {
        let long = "word ".repeat(100);
        let preview = truncate_markdown(&long, 20);
        assert_eq!(preview.chars().count(), 23);
        assert!(preview.ends_with("..."));

        let short = truncate_markdown("tiny", 20);
        assert_eq!(short, "tiny");
    }

    #[test]
    fn truncate_strips_list_bullets_and_fences() {
        let md = "- one\n- two\n```rust\nlet x = 1;\n```\n> quoted";
        let plain = truncate_markdown(md, 500);
        assert!(!plain.contains("- one"));
        assert!(plain.contains("one"));
        assert!(!plain.contains("```"));
        assert!(plain.contains("quoted"));
    }
}
