use crate::app::{App, View};
use crate::util_text::{format_payout, format_score};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

// ===============================
// Top-level draw
// ===============================
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    header(f, chunks[0], app);
    body(f, chunks[1], app);
    footer(f, chunks[2], app);

    if app.toast_message().is_some() {
        draw_toast_modal(f, app);
    }
}

// ===============================
// Header
// ===============================
fn header(f: &mut Frame, area: Rect, app: &App) {
    let text = match app.view() {
        View::List => {
            if app.account().is_empty() {
                " hivex ".to_string()
            } else {
                format!(" Latest posts by @{} ", app.account())
            }
        }
        View::Reading => match app.detail() {
            Some(d) => format!(" {} ", d.title),
            None => " Reading ".to_string(),
        },
    };

    let line = Line::from(Span::styled(
        text,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    f.render_widget(Paragraph::new(line), area);
}

// ===============================
// Body
// ===============================
fn body(f: &mut Frame, area: Rect, app: &mut App) {
    const MIN_WIDTH: u16 = 40;
    const MIN_HEIGHT: u16 = 8;

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let warning = Paragraph::new(format!(
            "Terminal too small!\nMinimum size: {}×{}, current: {}×{}",
            MIN_WIDTH, MIN_HEIGHT, area.width, area.height
        ))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
        f.render_widget(warning, area);
        return;
    }

    match app.view() {
        View::List => render_list(f, area, app),
        View::Reading => render_reading(f, area, app),
    }
}

fn render_list(f: &mut Frame, area: Rect, app: &App) {
    if app.posts().is_empty() {
        if app.loading_list() {
            render_notice(f, area, "Loading posts...", Color::DarkGray);
        } else if let Some(notice) = app.list_notice() {
            render_notice(f, area, notice, Color::Yellow);
        } else {
            render_notice(f, area, "No posts loaded. Press r to fetch.", Color::DarkGray);
        }
        return;
    }

    let items: Vec<ListItem> = app
        .posts()
        .iter()
        .map(|p| {
            let mut lines = vec![Line::from(vec![
                Span::styled(format!("{}  ", p.when), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:>7}  ", format_score(p.vote_score)),
                    Style::default().fg(if p.vote_score < 0 {
                        Color::Red
                    } else {
                        Color::Green
                    }),
                ),
                Span::styled(p.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
            ])];
            if !p.excerpt.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("            {}", p.excerpt),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            if let Some(url) = &p.thumbnail_url {
                lines.push(Line::from(Span::styled(
                    format!("            ▣ {url}"),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.selection().min(app.posts().len() - 1)));

    let title = if app.loading_list() {
        format!(" Posts ({}) · refreshing... ", app.posts().len())
    } else {
        format!(" Posts ({}) ", app.posts().len())
    };

    let widget = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("")
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    f.render_stateful_widget(widget, area, &mut state);
}

fn render_reading(f: &mut Frame, area: Rect, app: &mut App) {
    if app.loading_post() {
        render_notice(f, area, "Loading post...", Color::DarkGray);
        return;
    }
    if app.detail().is_none() {
        let notice = app.detail_notice().unwrap_or("Post not found.").to_string();
        render_notice(f, area, &notice, Color::Yellow);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    if let Some(d) = app.detail() {
        lines.push(Line::from(Span::styled(
            format!("by @{} · {}", d.author, d.when),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "Pending payout: ${} · {} comments",
                format_payout(d.pending_payout),
                d.comment_count
            ),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            d.explorer_link.clone(),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::default());
        for (i, paragraph) in d.paragraphs.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            for sub in paragraph.split('\n') {
                lines.push(Line::from(sub.to_string()));
            }
        }
    }

    // Wrap-aware line estimate so End and scrolling clamp sensibly.
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let total_lines: u16 = lines
        .iter()
        .map(|l| {
            let w: usize = l.spans.iter().map(|s| s.content.chars().count()).sum();
            (1 + w.saturating_sub(1) / inner_width) as u16
        })
        .sum();
    app.set_body_metrics(area.height.saturating_sub(2), total_lines);

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.body_scroll(), 0))
        .block(
            Block::default()
                .title(" Reading · Esc to go back ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    f.render_widget(widget, area);
}

/// Centered message replacing a view body (errors, empty states, loading).
fn render_notice(f: &mut Frame, area: Rect, text: &str, color: Color) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Percentage(40),
        ])
        .split(area);

    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(color));
    f.render_widget(widget, rows[1]);
}

// ===============================
// Footer
// ===============================
fn footer(f: &mut Frame, area: Rect, app: &App) {
    let accent = Style::default().fg(Color::Cyan);
    let spans: Vec<Span> = match app.view() {
        View::List => vec![
            Span::styled("↑/↓", accent),
            Span::raw(" select │ "),
            Span::styled("Enter", accent),
            Span::raw(" read │ "),
            Span::styled("r", accent),
            Span::raw(" refresh │ "),
            Span::styled("c", accent),
            Span::raw(" copy link │ "),
            Span::styled("q", accent),
            Span::raw(" quit"),
        ],
        View::Reading => vec![
            Span::styled("↑/↓", accent),
            Span::raw(" scroll │ "),
            Span::styled("Esc", accent),
            Span::raw(" back │ "),
            Span::styled("r", accent),
            Span::raw(" reload │ "),
            Span::styled("c", accent),
            Span::raw(" copy link │ "),
            Span::styled("q", accent),
            Span::raw(" quit"),
        ],
    };

    let w = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_type(BorderType::Plain),
    );
    f.render_widget(w, area);
}

fn draw_toast_modal(f: &mut Frame, app: &App) {
    let message = app.toast_message().unwrap_or("");

    // Small centered box
    let area = f.area();
    let width = (area.width * 4) / 10;
    let height = 3;
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let overlay = Rect { x, y, width, height };

    f.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Green));

    let text = Paragraph::new(format!("✓ {message}"))
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(block);

    f.render_widget(text, overlay);
}
