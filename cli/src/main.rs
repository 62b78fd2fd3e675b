//! MKS OS - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The binary bridges [`mks_engine`] (shell state) and [`mks_tui`] (rendering),
//! providing RAII-based terminal management with guaranteed cleanup.
//!
//! ```text
//! main() -> TerminalSession::new() -> Shell::start() -> run_shell() -> exit code
//! ```
//!
//! # Event Loop
//!
//! A fixed 16ms render cadence on a current-thread runtime:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`mks_tui::InputPump`])
//! 3. Advance the clock and collect command outcomes (`shell.tick()`)
//! 4. Render frame
//! 5. Stop once the shell has terminated

mod surface;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    env,
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    process::ExitCode,
    sync::Mutex,
    time::{Duration, Instant},
};
use tokio::runtime::Handle;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use mks_engine::{ConfigStore, ProcessRunner, Shell, ShellDeps, SystemClock, config_dir};
use mks_tui::{InputPump, draw, handle_events};

use crate::surface::TerminalSurface;

const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Exit code when the terminal itself fails.
const EXIT_TERMINAL_FAILURE: u8 = 1;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than write over the desktop.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    // Primary: ~/.mks-os/logs/mks-os.log
    let mut candidates = vec![config_dir().join("logs").join("mks-os.log")];

    // Fallback: ./.mks-os/logs/mks-os.log
    let local = PathBuf::from(".mks-os").join("logs").join("mks-os.log");
    if !candidates.contains(&local) {
        candidates.push(local);
    }

    candidates
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode, the alternate screen and mouse capture are enabled for the life of
/// the session and restored on drop, including after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            let _ = execute!(out, DisableMouseCapture, LeaveAlternateScreen);
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(code) => {
            tracing::info!(code, "Exited");
            ExitCode::from(u8::try_from(code).unwrap_or(EXIT_TERMINAL_FAILURE))
        }
        Err(err) => {
            tracing::error!("Terminal failure: {err:#}");
            eprintln!("Error: {err:?}");
            ExitCode::from(EXIT_TERMINAL_FAILURE)
        }
    }
}

async fn run() -> Result<i32> {
    let mut session = TerminalSession::new()?;

    let store = ConfigStore::from_env();
    tracing::debug!(path = %store.path().display(), "Config location");
    let start_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut shell = Shell::start(
        ShellDeps {
            store,
            surface: Box::new(TerminalSurface::stdout()),
            clock: Box::new(SystemClock),
            runner: Box::new(ProcessRunner::new(Handle::current())),
            start_dir,
        },
        Instant::now(),
    );

    // The terminal may not honour the requested size.
    let size = session.terminal.size()?;
    shell.set_viewport(size.width, size.height);

    let result = run_shell(&mut session.terminal, &mut shell).await;
    if result.is_err() {
        // Still persist and close windows when the terminal goes away.
        shell.request_close();
    }
    result?;
    Ok(shell.exit_code().unwrap_or_default())
}

async fn run_shell<B>(terminal: &mut Terminal<B>, shell: &mut Shell) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        if let Err(e) = handle_events(shell, &mut input) {
            break Err(e);
        }
        if shell.is_terminated() {
            break Ok(());
        }

        shell.tick(Instant::now());

        if let Err(e) = terminal.draw(|frame| draw(frame, shell)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
