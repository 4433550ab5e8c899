//! Client-side filtering, sorting and pagination of fetched article lists.

use serde::{Deserialize, Serialize};

use crate::types::article::Article;

/// Sort order of the article listing page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    MostViewed,
    MostLiked,
    Title,
}

/// Listing filters; empty fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArticleFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl ArticleFilter {
    pub fn matches(&self, article: &Article) -> bool {
        if let Some(category) = non_blank(&self.category) {
            let same = article
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            if !same {
                return false;
            }
        }

        if let Some(tag) = non_blank(&self.tag) {
            if !article.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                return false;
            }
        }

        if let Some(term) = non_blank(&self.search) {
            let term = term.to_lowercase();
            let haystacks = [
                Some(article.title.as_str()),
                article.excerpt.as_deref(),
                article.category.as_deref(),
            ];
            if !haystacks
                .iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&term))
            {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }
}

/// Sorts `articles` in place.
pub fn sort_articles(articles: &mut [Article], order: SortOrder) {
    let published = |a: &Article| a.published_at.unwrap_or(a.created_at);
    match order {
        SortOrder::Newest => articles.sort_by_key(|a| std::cmp::Reverse(published(a))),
        SortOrder::Oldest => articles.sort_by_key(published),
        SortOrder::MostViewed => articles.sort_by(|a, b| {
            b.view_count
                .cmp(&a.view_count)
                .then_with(|| published(b).cmp(&published(a)))
        }),
        SortOrder::MostLiked => articles.sort_by(|a, b| {
            b.like_count
                .cmp(&a.like_count)
                .then_with(|| published(b).cmp(&published(a)))
        }),
        SortOrder::Title => articles.sort_by_key(|a| a.title.to_lowercase()),
    }
}

/// Slices `items` into 1-based page `page`. Page 0 is treated as page 1;
/// pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let items = match (page - 1).checked_mul(per_page) {
        Some(start) if start < total_items => items.into_iter().skip(start).take(per_page).collect(),
        _ => Vec::new(),
    };

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

/// Filter, sort, then paginate.
pub fn list_articles(
    articles: Vec<Article>,
    filter: &ArticleFilter,
    order: SortOrder,
    page: usize,
    per_page: usize,
) -> Page<Article> {
    let mut matching: Vec<Article> = articles.into_iter().filter(|a| filter.matches(a)).collect();
    sort_articles(&mut matching, order);
    paginate(matching, page, per_page)
}
