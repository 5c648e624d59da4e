//! HashBridge CLI
//!
//! No subcommand runs the interactive console; every other subcommand runs
//! headless against the same console core and exits with a status code.
//!
//! EXIT: Ctrl+C / Ctrl+Q from any view

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use hashbridge::backend::{Backend, HttpBackend};
use hashbridge::cli::{run_cli_mode, Args, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use hashbridge::console::Console;
use hashbridge::logging::{self, LogTarget};
use hashbridge::settings::{Settings, SettingsError};
use hashbridge::ui::{self, handle_action, map_key_event, UiState};

/// Redraw interval when nothing else happens
const TICK_RATE: Duration = Duration::from_millis(250);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<SettingsError>().is_some() {
                EXIT_CONFIG_ERROR
            } else {
                EXIT_FAILURE
            }
        }
    };
    std::process::exit(code);
}

async fn run(args: Args) -> Result<i32> {
    let settings = Settings::load(args.config.as_deref(), args.base_url.as_deref())?;

    let interactive = args.is_interactive();
    let target = if interactive {
        LogTarget::File
    } else {
        LogTarget::Stderr
    };
    let _log_guard = logging::init(&settings.logging, target);
    info!(base_url = %settings.base_url, "hashbridge starting");

    let backend: Arc<dyn Backend> = Arc::new(
        HttpBackend::new(settings.base_url.clone(), settings.request_timeout())
            .context("creating HTTP client")?,
    );
    let mut console = Console::new(Arc::clone(&backend), &settings);

    if interactive {
        run_tui(&mut console).await?;
        return Ok(EXIT_SUCCESS);
    }

    let mut out = io::stdout();
    let code = run_cli_mode(args.mode_or_default(), &mut console, backend, &mut out)
        .await
        .context("command failed")?;
    Ok(code)
}

/// Run TUI mode
async fn run_tui(console: &mut Console) -> Result<()> {
    let mut terminal = setup_terminal().context("initializing terminal")?;
    let run_result = run_loop(&mut terminal, console).await;
    let restore_result = restore_terminal(&mut terminal);

    run_result?;
    restore_result.context("restoring terminal")?;
    info!("console closed");
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main event loop: terminal input, console completions and a redraw tick
async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    console: &mut Console,
) -> ui::Result<()> {
    let mut state = UiState::new();
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(TICK_RATE);

    console.boot();

    loop {
        ui::render(terminal, console, &state)?;

        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = map_key_event(console.view(), key) {
                        handle_action(console, &mut state, action);
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Err(ui::Error::InputClosed),
            },
            Some(event) = console.next_event() => {
                console.apply(event);
                console.drain();
            }
            _ = tick.tick() => {}
        }

        if state.should_quit() {
            break;
        }
    }

    Ok(())
}
