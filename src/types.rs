use chrono::NaiveDateTime;

use crate::posts::{DetailError, ListError};

/// One row of the list pane, shaped from a raw `get_discussions_by_blog`
/// record. Carries both the parsed timestamp and the pre-formatted display
/// string so the UI never re-derives anything.
#[derive(Clone, Debug)]
pub struct PostSummary {
    pub title: String,
    pub author: String,
    pub permlink: String,
    pub created: NaiveDateTime,
    /// "dd/mm/YYYY", derived from `created`.
    pub when: String,
    /// First 30 words of the body, markup stripped, "..."-terminated when cut.
    pub excerpt: String,
    /// First entry of the `json_metadata.image` array, when present.
    pub thumbnail_url: Option<String>,
    /// `net_rshares`, may be negative.
    pub vote_score: i64,
    /// Configured viewer URL with `?permlink=&author=` appended.
    pub detail_link: String,
}

/// The reading view's model, shaped from a `get_content` record.
#[derive(Clone, Debug)]
pub struct PostDetail {
    pub title: String,
    pub author: String,
    pub permlink: String,
    pub created: NaiveDateTime,
    /// "dd/mm/YYYY HH:MM", derived from `created`.
    pub when: String,
    /// Body reduced to plain text and split on blank lines.
    pub paragraphs: Vec<String>,
    /// Leading decimal of `pending_payout_value` ("1.234 HBD" style).
    pub pending_payout: f64,
    /// The record's `children` count.
    pub comment_count: i64,
    /// Fixed-pattern block-explorer link for this post.
    pub explorer_link: String,
}

/// Work orders for the fetch task. Each request maps to exactly one outbound
/// HTTP call.
#[derive(Clone, Debug)]
pub enum FetchRequest {
    Posts,
    Post { author: String, permlink: String },
}

/// Events flowing from the fetch task back into the app over the unbounded
/// channel.
#[derive(Debug)]
pub enum AppEvent {
    PostList(Result<Vec<PostSummary>, ListError>),
    PostBody(Box<Result<PostDetail, DetailError>>),
    Quit,
}
