mod app;
mod timer;
mod ui;

use anyhow::{Context, Result};
use app::{Action, Alert, App};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sailtimer_core::models::{Config, StartDuration, TimerMode};
use sailtimer_core::storage::{init_config_dir, ConfigStorage};
use sailtimer_core::TimerEngine;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use timer::TimerSession;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

#[derive(Parser, Debug)]
#[command(name = "sailtimer")]
#[command(about = "SailTimer - sailing start sequence timer", long_about = None)]
struct Args {
    /// Directory holding config.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sequence length in minutes (3 or 5, other values become a custom sequence)
    #[arg(short, long)]
    duration: Option<u64>,

    /// Start in repeat mode
    #[arg(long)]
    repeat: bool,

    /// Log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Disable the terminal bell
    #[arg(long)]
    no_audio: bool,
}

fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sailtimer_tui={0},sailtimer_core={0}", level)))
}

/// Install the JSON file logger. The returned handle swaps the level once the config is known.
fn setup_logging(level: &str) -> Result<LogFilterHandle> {
    let mut log_path = std::env::temp_dir();
    log_path.push("sailtimer-tui.log");

    let log_file = std::fs::File::create(log_path)?;
    let (filter, handle) = reload::Layer::new(log_filter(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(log_file))
        .try_init()?;
    Ok(handle)
}

fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
        let _ = crossterm::execute!(std::io::stdout(), crossterm::cursor::Show);

        tracing::error!(?panic_info, "Application panicked");

        eprintln!("A fatal error occurred: {}", panic_info);

        original_hook(panic_info);
    }));
}

fn load_config(args: &Args) -> Result<Config> {
    let dir = match &args.config {
        Some(dir) => dir.clone(),
        None => init_config_dir()?,
    };
    let mut config = ConfigStorage::new(dir)
        .load()
        .context("Failed to load configuration")?;

    if let Some(minutes) = args.duration {
        config.timer.default_duration = StartDuration::try_from(minutes)?;
    }
    if args.repeat {
        config.timer.default_mode = TimerMode::CountdownThenRepeat;
    }
    if let Some(level) = &args.log_level {
        config.ui.log_level = level.clone();
    }
    if args.no_audio {
        config.ui.audio_alerts = false;
    }

    config.validate()?;
    Ok(config)
}

fn send_notification(title: &str, body: &str, urgent: bool) {
    let mut notification = notify_rust::Notification::new();
    notification
        .summary(title)
        .body(body)
        .icon("alarm-clock")
        .timeout(notify_rust::Timeout::Milliseconds(5000));

    if urgent {
        #[cfg(all(unix, not(target_os = "macos")))]
        notification.urgency(notify_rust::Urgency::Critical);
    }

    if let Err(e) = notification.show() {
        tracing::error!("Failed to send notification: {}", e);
    }
}

fn audio_alert<C: sailtimer_core::Clock>(app: &App<C>) {
    if app.audio_alerts_enabled {
        print!("\x07");
        let _ = std::io::Write::flush(&mut std::io::stdout());
    }
}

fn raise_alert<C: sailtimer_core::Clock>(app: &App<C>, alert: Alert) {
    info!(?alert, "Alert");
    audio_alert(app);

    if !app.notifications_enabled {
        return;
    }
    match alert {
        Alert::MinuteMark(_) => {}
        Alert::Start => send_notification("🏁 Start!", "The countdown has finished.", true),
        Alert::CycleStart(cycle) => send_notification(
            "🏁 Sequence complete",
            &format!("Cycle {} finished, next sequence running.", cycle),
            false,
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_handle = setup_logging(args.log_level.as_deref().unwrap_or("info"))?;
    setup_panic_hook();

    let config = load_config(&args)?;
    log_handle.reload(log_filter(&config.ui.log_level))?;
    info!(?config, "SailTimer TUI starting up");

    let mut engine = TimerEngine::new();
    engine.select_duration(config.timer.default_duration)?;
    engine.set_mode(config.timer.default_mode)?;

    let session = Arc::new(TimerSession::new(
        engine,
        Duration::from_millis(config.timer.tick_interval_ms),
    ));
    let mut event_rx = session.subscribe();
    let tick_handle = tokio::spawn(session.clone().start_tick_loop());

    let mut app = App::new(session, &config.ui).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if app.should_quit {
            break;
        }

        tokio::select! {
            received = event_rx.recv() => {
                match received {
                    Ok(event) => {
                        if !event.is_tick() {
                            info!(event = ?event.event_type, "Timer event");
                        }
                        if let Some(alert) = app.on_timer_event(&event).await {
                            raise_alert(&app, alert);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Timer events lagged");
                        app.refresh_timer().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(16)) => {
                if event::poll(Duration::from_millis(0))? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if let Some(action) = Action::from_key(key.code, key.modifiers) {
                                info!(?action, "Key action");
                                app.handle_action(action).await?;
                            }
                        }
                        Event::Resize(width, height) => {
                            info!(width, height, "Terminal resized");
                        }
                        _ => {}
                    }
                }
                // Keeps the wall clock current while idle.
                app.refresh_timer().await;
            }
        }
    }

    tick_handle.abort();
    info!("SailTimer TUI shutting down");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
