//! List and detail assemblers: raw condenser records in, view models out.
//!
//! Field access is deliberately tolerant. Condenser nodes disagree on small
//! things (numbers arriving as strings, metadata arriving pre-parsed), so
//! every coercion has a quiet fallback instead of a hard failure.

use serde_json::Value;
use thiserror::Error;

use crate::rpc::{HiveClient, RpcError};
use crate::types::{PostDetail, PostSummary};
use crate::util_text;

/// Words kept in a list excerpt before the "..." cut.
pub const EXCERPT_WORDS: usize = 30;

/// Block-explorer page pattern for a post.
const EXPLORER_BASE: &str = "https://peakd.com";

#[derive(Debug, Error)]
pub enum ListError {
    /// No account name configured; the network is never touched.
    #[error("no hive account configured")]
    NotConfigured,
    /// The call worked but there is nothing to show. Not a failure.
    #[error("the account has no posts")]
    NoPosts,
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

#[derive(Debug, Error)]
pub enum DetailError {
    /// Author or permlink missing after trimming; the network is never
    /// touched.
    #[error("author and permlink are required")]
    MissingIdentifier,
    /// The node knows nothing under that (author, permlink).
    #[error("post not found")]
    NotFound,
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Fetch and shape the account's latest posts, in the order the node
/// returned them.
pub async fn fetch_posts(
    client: &HiveClient,
    account: &str,
    limit: u32,
    viewer_url: &str,
) -> Result<Vec<PostSummary>, ListError> {
    let account = account.trim().trim_start_matches('@');
    if account.is_empty() {
        return Err(ListError::NotConfigured);
    }

    let result = client.get_discussions_by_blog(account, limit).await?;
    let records = match result.as_array() {
        Some(list) if !list.is_empty() => list,
        _ => return Err(ListError::NoPosts),
    };

    let posts: Vec<PostSummary> = records.iter().map(|r| summarize(r, viewer_url)).collect();
    log::info!("loaded {} posts for @{account}", posts.len());
    Ok(posts)
}

/// Fetch and shape one post for the reading view.
pub async fn fetch_post(
    client: &HiveClient,
    author: &str,
    permlink: &str,
) -> Result<PostDetail, DetailError> {
    let author = author.trim().trim_start_matches('@');
    let permlink = permlink.trim();
    if author.is_empty() || permlink.is_empty() {
        return Err(DetailError::MissingIdentifier);
    }

    let result = client.get_content(author, permlink).await?;
    if !result.is_object() {
        return Err(DetailError::NotFound);
    }
    let body = result.get("body").and_then(Value::as_str).unwrap_or("");
    if body.is_empty() {
        // get_content answers an empty husk (id 0, blank body) for unknown
        // posts rather than a JSON-RPC error.
        return Err(DetailError::NotFound);
    }

    log::info!("loaded post @{author}/{permlink}");
    Ok(shape_detail(&result, body, author, permlink))
}

fn summarize(record: &Value, viewer_url: &str) -> PostSummary {
    let title = str_field(record, "title");
    let author = str_field(record, "author");
    let permlink = str_field(record, "permlink");
    let created = util_text::parse_created(&str_field(record, "created")).unwrap_or_default();
    let detail_link = detail_link(viewer_url, &author, &permlink);

    PostSummary {
        when: util_text::format_date(&created),
        excerpt: util_text::excerpt(record.get("body").and_then(Value::as_str).unwrap_or(""), EXCERPT_WORDS),
        thumbnail_url: first_metadata_image(record),
        vote_score: int_field(record, "net_rshares"),
        title,
        author,
        permlink,
        created,
        detail_link,
    }
}

fn shape_detail(record: &Value, body: &str, req_author: &str, req_permlink: &str) -> PostDetail {
    let mut author = str_field(record, "author");
    if author.is_empty() {
        author = req_author.to_string();
    }
    let mut permlink = str_field(record, "permlink");
    if permlink.is_empty() {
        permlink = req_permlink.to_string();
    }
    let created = util_text::parse_created(&str_field(record, "created")).unwrap_or_default();

    PostDetail {
        title: str_field(record, "title"),
        when: util_text::format_datetime(&created),
        created,
        paragraphs: util_text::body_paragraphs(body),
        pending_payout: util_text::parse_amount_prefix(
            record.get("pending_payout_value").and_then(Value::as_str).unwrap_or(""),
        ),
        comment_count: int_field(record, "children"),
        explorer_link: format!("{EXPLORER_BASE}/@{author}/{permlink}"),
        author,
        permlink,
    }
}

/// Viewer link in the shape the original list used: permlink first, then
/// author, both percent-encoded.
fn detail_link(viewer_url: &str, author: &str, permlink: &str) -> String {
    format!(
        "{viewer_url}?permlink={}&author={}",
        urlencoding::encode(permlink),
        urlencoding::encode(author)
    )
}

fn str_field(record: &Value, key: &str) -> String {
    record.get(key).and_then(Value::as_str).unwrap_or("").to_string()
}

/// Integer field that may arrive as a JSON number or a numeric string
/// (net_rshares does both in the wild).
fn int_field(record: &Value, key: &str) -> i64 {
    match record.get(key) {
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
            .unwrap_or(0),
        None => 0,
    }
}

/// First entry of the metadata `image` array. json_metadata is normally a
/// string-encoded JSON blob, but some nodes inline it as an object.
fn first_metadata_image(record: &Value) -> Option<String> {
    let meta = record.get("json_metadata")?;
    let parsed: Value = match meta {
        Value::String(raw) => serde_json::from_str(raw).ok()?,
        other => other.clone(),
    };
    Some(parsed.get("image")?.as_array()?.first()?.as_str()?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> Value {
        json!({
            "title": "Hello",
            "author": "alice",
            "permlink": "p1",
            "body": "word ".repeat(50),
            "created": "2024-01-01T00:00:00",
            "net_rshares": "123",
            "json_metadata": "{}",
        })
    }

    #[test]
    fn summarize_shapes_a_plain_blog_record() {
        let summary = summarize(&sample_record(), "view-post-hive");
        assert_eq!(summary.title, "Hello");
        assert_eq!(summary.excerpt, format!("{}...", vec!["word"; 30].join(" ")));
        assert_eq!(summary.vote_score, 123);
        assert!(summary.thumbnail_url.is_none());
        assert!(summary.detail_link.contains("permlink=p1&author=alice"));
        assert_eq!(summary.when, "01/01/2024");
    }

    #[test]
    fn summarize_picks_the_first_metadata_image() {
        let mut record = sample_record();
        record["json_metadata"] =
            json!(r#"{"image":["https://img.example/a.png","https://img.example/b.png"]}"#);
        let summary = summarize(&record, "view-post-hive");
        assert_eq!(summary.thumbnail_url.as_deref(), Some("https://img.example/a.png"));
    }

    #[test]
    fn summarize_tolerates_broken_metadata() {
        let mut record = sample_record();
        record["json_metadata"] = json!("not json at all");
        assert!(summarize(&record, "v").thumbnail_url.is_none());
        record["json_metadata"] = json!({"image": ["inline.png"]});
        assert_eq!(summarize(&record, "v").thumbnail_url.as_deref(), Some("inline.png"));
    }

    #[test]
    fn vote_score_accepts_numbers_strings_and_negatives() {
        let mut record = sample_record();
        record["net_rshares"] = json!(-42);
        assert_eq!(summarize(&record, "v").vote_score, -42);
        record["net_rshares"] = json!("-7");
        assert_eq!(summarize(&record, "v").vote_score, -7);
        record["net_rshares"] = json!(null);
        assert_eq!(summarize(&record, "v").vote_score, 0);
    }

    #[test]
    fn detail_link_percent_encodes_both_params() {
        let link = detail_link("https://my.site/view", "a&b", "p 1");
        assert_eq!(link, "https://my.site/view?permlink=p%201&author=a%26b");
    }

    #[test]
    fn shape_detail_parses_payout_children_and_links() {
        let record = json!({
            "title": "Deep dive",
            "author": "alice",
            "permlink": "deep-dive",
            "created": "2024-02-03T10:30:00",
            "pending_payout_value": "12.345 HBD",
            "children": 7,
        });
        let detail = shape_detail(&record, "one\n\ntwo", "alice", "deep-dive");
        assert_eq!(detail.pending_payout, 12.345);
        assert_eq!(detail.comment_count, 7);
        assert_eq!(detail.explorer_link, "https://peakd.com/@alice/deep-dive");
        assert_eq!(detail.paragraphs, vec!["one", "two"]);
        assert_eq!(detail.when, "03/02/2024 10:30");
    }

    #[test]
    fn shape_detail_falls_back_to_requested_ids() {
        let detail = shape_detail(&json!({}), "text", "bob", "some-post");
        assert_eq!(detail.author, "bob");
        assert_eq!(detail.permlink, "some-post");
        assert_eq!(detail.explorer_link, "https://peakd.com/@bob/some-post");
    }
}
