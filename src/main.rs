//! Main entry point for chatmock

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, Stdout},
    panic,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{error, info};

use chatmock::{
    capture::{CaptureExporter, DirectorySink},
    config::Config,
    draft::MessageDraft,
    image_loader,
    input::handle_event,
    logging,
    preview::PreviewController,
    raster::FrameRasterizer,
    state::AppState,
    style::StyleId,
    ui,
    worker::{spawn_worker, WorkerHandle},
};

/// Target frame time for 60 FPS
const FRAME_TIME_MS: u64 = 16;

/// Command line overrides on top of the config file
#[derive(Debug, Default)]
struct Args {
    style: Option<StyleId>,
    name: Option<String>,
    message: Option<String>,
    time: Option<String>,
    read: bool,
    avatar: Option<PathBuf>,
    out: Option<PathBuf>,
    render_once: bool,
}

fn parse_args(mut iter: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    while let Some(a) = iter.next() {
        match a.as_str() {
            "--style" => {
                if let Some(s) = flag_value(&mut iter, &a) {
                    args.style = Some(s.parse()?);
                }
            }
            "--name" => args.name = flag_value(&mut iter, &a),
            // "\n" on the command line stands for a line break
            "--message" => {
                args.message = flag_value(&mut iter, &a).map(|m| m.replace("\\n", "\n"))
            }
            "--time" => args.time = flag_value(&mut iter, &a),
            "--read" => args.read = true,
            "--avatar" => args.avatar = flag_value(&mut iter, &a).map(PathBuf::from),
            "--out" => args.out = flag_value(&mut iter, &a).map(PathBuf::from),
            "--render-once" => args.render_once = true,
            other => eprintln!("Ignoring unknown argument '{}'", other),
        }
    }
    Ok(args)
}

/// Next argument as the value of `flag`, warning when it is missing
fn flag_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Option<String> {
    let value = iter.next();
    if value.is_none() {
        eprintln!("Ignoring '{}': missing value", flag);
    }
    value
}

fn apply_args(config: &mut Config, args: &Args) {
    let defaults = &mut config.defaults;
    if let Some(style) = args.style {
        defaults.style = style;
    }
    if let Some(ref name) = args.name {
        defaults.sender_name = name.clone();
    }
    if let Some(ref message) = args.message {
        defaults.body_text = message.clone();
    }
    if let Some(ref time) = args.time {
        defaults.timestamp = time.clone();
    }
    if args.read {
        defaults.read = true;
    }
    if let Some(ref out) = args.out {
        config.export.output_dir = Some(out.clone());
    }
}

fn main() -> Result<()> {
    // Set up panic hook to restore terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
        original_hook(panic_info);
    }));

    let args = parse_args(std::env::args().skip(1))?;

    let mut config = Config::load().unwrap_or_default();
    apply_args(&mut config, &args);

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = match logging::init(&Config::log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };

    let exporter = CaptureExporter::new(
        FrameRasterizer::from_preferences(&config.render),
        DirectorySink::new(config.export.resolved_output_dir()),
    );

    if args.render_once {
        return run_render_once(exporter, &config, args.avatar.as_deref());
    }

    let workers = spawn_worker(exporter).context("failed to start export worker")?;

    let mut app_state = AppState::new(config, workers.request_tx.clone());
    if let Some(ref path) = args.avatar {
        match image_loader::load_image(path) {
            Ok(img) => app_state.controller.set_avatar_image(img),
            Err(e) => app_state.set_status(&format!("Avatar unchanged: {:#}", e), true),
        }
    }

    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app_state, &workers);
    cleanup_terminal(terminal)?;

    workers.shutdown();

    if let Err(ref e) = result {
        error!(error = %e, "event loop failed");
    }
    result
}

/// Set up the terminal for TUI rendering
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn cleanup_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main event loop - handles input, processes worker messages, renders UI
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app_state: &mut AppState,
    workers: &WorkerHandle,
) -> Result<()> {
    let frame_duration = Duration::from_millis(FRAME_TIME_MS);
    info!(style = %app_state.controller.style(), "session started");

    loop {
        let frame_start = Instant::now();

        terminal.draw(|frame| ui::render(frame, app_state))?;

        let timeout = frame_duration.saturating_sub(frame_start.elapsed());
        if event::poll(timeout)? {
            handle_event(event::read()?, app_state)?;
        }

        // Process worker responses (non-blocking)
        while let Ok(response) = workers.response_rx.try_recv() {
            app_state.handle_worker_response(response);
        }

        if app_state.should_quit {
            break;
        }
    }

    Ok(())
}

/// Render once: build the preview from the arguments, export it and print the path
fn run_render_once(
    exporter: CaptureExporter,
    config: &Config,
    avatar: Option<&std::path::Path>,
) -> Result<()> {
    let draft = MessageDraft::from_defaults(&config.defaults);
    let mut controller = PreviewController::new(config.defaults.style, draft);
    if let Some(path) = avatar {
        controller.set_avatar_image(image_loader::load_image(path)?);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to start async runtime")?;
    let outcome = runtime.block_on(Arc::new(exporter).export_async(controller.node().clone()))?;

    println!(
        "Saved {} ({}ms)",
        outcome.path.display(),
        outcome.elapsed_ms
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_parse_flags() {
        let args = parse(&[
            "--style", "vk", "--name", "Anna", "--message", "line1\\nline2", "--read",
            "--render-once",
        ])
        .unwrap();
        assert_eq!(args.style, Some(StyleId::Vk));
        assert_eq!(args.name.as_deref(), Some("Anna"));
        assert_eq!(args.message.as_deref(), Some("line1\nline2"));
        assert!(args.read);
        assert!(args.render_once);
    }

    #[test]
    fn test_flag_without_value_is_skipped() {
        let args = parse(&["--name", "Anna", "--style"]).unwrap();
        assert_eq!(args.style, None);
        assert_eq!(args.name.as_deref(), Some("Anna"));

        let mut empty = std::iter::empty::<String>();
        assert_eq!(flag_value(&mut empty, "--out"), None);
    }

    #[test]
    fn test_unknown_style_is_an_error() {
        assert!(parse(&["--style", "icq"]).is_err());
    }
}
