// Native binary for hivex - terminal Hive blog reader

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::Env;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use hivex::{
    app::{App, View},
    clipboard, config, source,
    types::{AppEvent, FetchRequest},
    ui,
};

// Fixed render cadence; the loop coalesces events inside each frame.
const FRAME_BUDGET: Duration = Duration::from_millis(33);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    // Default to warn so the logger stays quiet under the alternate screen;
    // RUST_LOG overrides for debugging.
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cfg = config::load().context("Failed to load configuration")?;

    if cfg.save {
        if cfg.account.is_empty() {
            anyhow::bail!("An account name is required to save settings; pass --account <name>");
        }
        cfg.save()?;
        cfg.log_summary();
        println!("Settings saved to {}.", cfg.config_path.display());
        return Ok(());
    }

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // app + channels
    let (req_tx, req_rx) = unbounded_channel::<FetchRequest>();
    let (tx, rx) = unbounded_channel::<AppEvent>();

    let source_task = tokio::spawn(source::run(cfg.clone(), req_rx, tx));

    let mut app = App::new(cfg.account.clone(), req_tx);

    // First request: one post when --post was given, the list otherwise.
    match cfg.post.as_deref() {
        Some(arg) => {
            let (author, permlink) = config::parse_post_arg(arg);
            app.open_post(author, permlink);
        }
        None => app.request_posts(),
    }

    let loop_result = run_loop(&mut app, &mut terminal, rx).await;

    // cleanup
    source_task.abort();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    loop_result
}

async fn run_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        let wait = FRAME_BUDGET.saturating_sub(last_frame.elapsed());

        // input or fetch events
        if event::poll(wait)? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                    handle_key(app, k);
                }
            }
        }
        while let Ok(ev) = rx.try_recv() {
            app.on_event(ev);
        }

        if last_frame.elapsed() >= FRAME_BUDGET {
            terminal.draw(|f| ui::draw(f, app))?;
            last_frame = Instant::now();
        }
        if app.quit_flag() {
            break;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, k: KeyEvent) {
    match (k.code, k.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.on_event(AppEvent::Quit);
        }

        (KeyCode::Up, _) => app.up(),
        (KeyCode::Down, _) => app.down(),
        (KeyCode::PageUp, _) => app.page_up(20),
        (KeyCode::PageDown, _) => app.page_down(20),
        (KeyCode::Home, _) => app.home(),
        (KeyCode::End, _) => app.end(),

        (KeyCode::Enter, _) => {
            if app.view() == View::List {
                app.open_selected();
            }
        }
        (KeyCode::Esc, _) | (KeyCode::Backspace, _) => {
            if app.view() == View::Reading {
                app.back_to_list();
            }
        }
        (KeyCode::Char('r'), _) => app.refresh(),
        (KeyCode::Char('c'), _) => {
            let content = app.get_copy_content();
            if content.is_empty() {
                app.show_toast("Nothing to copy".to_string());
            } else if clipboard::copy_to_clipboard(&content) {
                app.show_toast("Copied link".to_string());
            } else {
                app.show_toast("Copy failed".to_string());
            }
        }
        _ => {}
    }
}
