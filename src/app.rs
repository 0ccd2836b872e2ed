use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;

use crate::posts::{DetailError, ListError};
use crate::types::{AppEvent, FetchRequest, PostDetail, PostSummary};

/// Which screen the reader is on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum View {
    List,
    Reading,
}

/// Fixed user-facing message for each list failure.
pub fn list_error_message(err: &ListError, account: &str) -> String {
    match err {
        ListError::NotConfigured => {
            "No Hive account is configured. Set one with --account <name> or in hivex.toml.".into()
        }
        ListError::NoPosts => format!("@{account} has no posts to show."),
        ListError::Rpc(_) => "Could not load posts from the Hive API.".into(),
    }
}

/// Fixed user-facing message for each reading-view failure.
pub fn detail_error_message(err: &DetailError) -> String {
    match err {
        DetailError::MissingIdentifier => "Select a post from the list.".into(),
        DetailError::NotFound => "Post not found.".into(),
        DetailError::Rpc(_) => "Could not load this post from the Hive API.".into(),
    }
}

pub struct App {
    quit: bool,
    view: View,
    account: String,

    posts: Vec<PostSummary>,
    sel: usize,
    list_notice: Option<String>,   // error or empty text replacing the list
    loading_list: bool,

    detail: Option<Box<PostDetail>>,
    detail_notice: Option<String>,
    loading_post: bool,
    body_scroll: u16,
    body_viewport_height: u16,     // set by the UI layer each frame
    body_line_count: u16,          // wrapped line total, set by the UI layer

    req_tx: UnboundedSender<FetchRequest>,

    toast_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(account: String, req_tx: UnboundedSender<FetchRequest>) -> Self {
        Self {
            quit: false,
            view: View::List,
            account,
            posts: Vec::new(),
            sel: 0,
            list_notice: None,
            loading_list: false,
            detail: None,
            detail_notice: None,
            loading_post: false,
            body_scroll: 0,
            body_viewport_height: 20,
            body_line_count: 0,
            req_tx,
            toast_message: None,
        }
    }

    // ----- getters -----
    pub fn quit_flag(&self) -> bool {
        self.quit
    }
    pub fn view(&self) -> View {
        self.view
    }
    pub fn account(&self) -> &str {
        &self.account
    }
    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }
    pub fn selection(&self) -> usize {
        self.sel
    }
    pub fn selected(&self) -> Option<&PostSummary> {
        self.posts.get(self.sel)
    }
    pub fn list_notice(&self) -> Option<&str> {
        self.list_notice.as_deref()
    }
    pub fn loading_list(&self) -> bool {
        self.loading_list
    }
    pub fn detail(&self) -> Option<&PostDetail> {
        self.detail.as_deref()
    }
    pub fn detail_notice(&self) -> Option<&str> {
        self.detail_notice.as_deref()
    }
    pub fn loading_post(&self) -> bool {
        self.loading_post
    }
    pub fn body_scroll(&self) -> u16 {
        self.body_scroll
    }

    /// Report the reading pane geometry (called from the UI layer so End and
    /// scrolling clamp against what is actually on screen).
    pub fn set_body_metrics(&mut self, viewport_height: u16, line_count: u16) {
        self.body_viewport_height = viewport_height;
        self.body_line_count = line_count;
    }

    /// Show a toast notification for 2 seconds
    pub fn show_toast(&mut self, msg: String) {
        self.toast_message = Some((msg, Instant::now()));
    }

    /// Get current toast message if still active
    pub fn toast_message(&self) -> Option<&str> {
        const TOAST_DURATION: Duration = Duration::from_secs(2);
        self.toast_message.as_ref().and_then(|(msg, time)| {
            if time.elapsed() < TOAST_DURATION {
                Some(msg.as_str())
            } else {
                None
            }
        })
    }

    // ----- fetch requests -----
    /// Ask the fetch task for the post list.
    pub fn request_posts(&mut self) {
        self.loading_list = true;
        self.list_notice = None;
        let _ = self.req_tx.send(FetchRequest::Posts);
    }

    /// Ask the fetch task for one post and switch to the reading view.
    pub fn open_post(&mut self, author: String, permlink: String) {
        self.view = View::Reading;
        self.detail = None;
        self.detail_notice = None;
        self.loading_post = true;
        self.body_scroll = 0;
        let _ = self.req_tx.send(FetchRequest::Post { author, permlink });
    }

    /// Open the post under the cursor. Does nothing when the list is empty.
    pub fn open_selected(&mut self) {
        if let Some(post) = self.selected() {
            let author = post.author.clone();
            let permlink = post.permlink.clone();
            self.open_post(author, permlink);
        }
    }

    /// Re-fetch whatever the current view shows.
    pub fn refresh(&mut self) {
        match self.view {
            View::List => self.request_posts(),
            View::Reading => {
                if let Some(detail) = self.detail.take() {
                    self.open_post(detail.author, detail.permlink);
                }
            }
        }
    }

    /// Leave the reading view and return to the list.
    pub fn back_to_list(&mut self) {
        self.view = View::List;
        self.detail = None;
        self.detail_notice = None;
        self.loading_post = false;
        self.body_scroll = 0;
    }

    // ----- copy functionality -----
    /// Text for the clipboard: the share link in the list, the explorer link
    /// while reading. Empty when there is nothing to copy.
    pub fn get_copy_content(&self) -> String {
        match self.view {
            View::List => self
                .selected()
                .map(|p| p.detail_link.clone())
                .unwrap_or_default(),
            View::Reading => self
                .detail
                .as_ref()
                .map(|d| d.explorer_link.clone())
                .unwrap_or_default(),
        }
    }

    // ----- selection / scrolling -----
    /// Up arrow: previous post in the list, scroll up while reading.
    pub fn up(&mut self) {
        match self.view {
            View::List => {
                if self.sel > 0 {
                    self.sel -= 1;
                }
            }
            View::Reading => self.scroll_body(-1),
        }
    }

    /// Down arrow: next post in the list, scroll down while reading.
    pub fn down(&mut self) {
        match self.view {
            View::List => {
                if self.sel + 1 < self.posts.len() {
                    self.sel += 1;
                }
            }
            View::Reading => self.scroll_body(1),
        }
    }

    pub fn page_up(&mut self, page: u16) {
        match self.view {
            View::List => self.sel = self.sel.saturating_sub(page as usize),
            View::Reading => self.scroll_body(-(page as i32)),
        }
    }

    pub fn page_down(&mut self, page: u16) {
        match self.view {
            View::List => {
                if !self.posts.is_empty() {
                    self.sel = (self.sel + page as usize).min(self.posts.len() - 1);
                }
            }
            View::Reading => self.scroll_body(page as i32),
        }
    }

    pub fn home(&mut self) {
        match self.view {
            View::List => self.sel = 0,
            View::Reading => self.body_scroll = 0,
        }
    }

    pub fn end(&mut self) {
        match self.view {
            View::List => self.sel = self.posts.len().saturating_sub(1),
            View::Reading => {
                self.body_scroll = self.body_line_count.saturating_sub(self.body_viewport_height);
            }
        }
    }

    fn scroll_body(&mut self, delta: i32) {
        let max_scroll = self.body_line_count.saturating_sub(self.body_viewport_height);
        let next = (self.body_scroll as i32 + delta).max(0).min(max_scroll as i32);
        self.body_scroll = next as u16;
    }

    // ----- events -----
    pub fn on_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Quit => self.quit = true,
            AppEvent::PostList(Ok(posts)) => {
                self.loading_list = false;
                self.list_notice = None;
                self.posts = posts;
                if self.sel >= self.posts.len() {
                    self.sel = self.posts.len().saturating_sub(1);
                }
            }
            AppEvent::PostList(Err(err)) => {
                self.loading_list = false;
                let msg = list_error_message(&err, &self.account);
                if self.posts.is_empty() {
                    self.list_notice = Some(msg);
                } else {
                    // A refresh failure keeps the stale list on screen.
                    self.show_toast(msg);
                }
            }
            AppEvent::PostBody(res) => {
                self.loading_post = false;
                match *res {
                    Ok(detail) => {
                        self.detail = Some(Box::new(detail));
                        self.detail_notice = None;
                        self.body_scroll = 0;
                    }
                    Err(err) => {
                        self.detail = None;
                        self.detail_notice = Some(detail_error_message(&err));
                    }
                }
            }
        }
    }
}
