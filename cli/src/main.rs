//! Chorus headless driver.
//!
//! Runs the pane engine over the recording host and drives it from
//! line commands on stdin. Browser signals (load finished, load failed,
//! renderer crash, focus) are synthesized by commands, so the whole
//! recovery and overlay state machine can be exercised without a webview.
//!
//! ```text
//! stdin line -> Command::parse -> App method / synthesized HostEvent
//! timer deadline --------------> App::run_due_timers
//! ```

mod commands;

use std::fs::{self, File, OpenOptions};
use std::future;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tokio::signal;
use tokio::time::{self, Instant};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use chorus_config::{ChorusConfig, ResolvedConfig};
use chorus_engine::{App, ConfigFileStore, HideOptions, SystemClock};
use chorus_host::{BrowserHost, HostError, KeyInput, RecordingHost};
use chorus_types::{PaneCount, PaneIndex, ViewId};

use commands::{Command, HELP};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_chorus_log_file();

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

    // Stdout carries command output; without a log file, log nothing.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_chorus_log_file() -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in chorus_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
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

fn chorus_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.chorus/logs/chorus.log
    if let Some(config_path) = ChorusConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("chorus.log"));
    }

    // Fallback: ./.chorus/logs/chorus.log
    candidates.push(PathBuf::from(".chorus").join("logs").join("chorus.log"));

    candidates
}

fn load_config() -> ResolvedConfig {
    match ChorusConfig::load() {
        Ok(Some(config)) => config.resolve(),
        Ok(None) => ResolvedConfig::default(),
        Err(e) => {
            eprintln!("{e}; using defaults");
            ResolvedConfig::default()
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending::<()>().await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut app = App::new(RecordingHost::new(), load_config(), Box::new(SystemClock));
    if let Some(store) = ConfigFileStore::user_config() {
        app = app.with_preference_store(Box::new(store));
    }
    app.set_navigation_error_handler(Box::new(
        |pane: PaneIndex, view: ViewId, err: &HostError| {
            eprintln!("pane {} ({view}): navigation did not start: {err}", pane.value());
        },
    ));

    app.initialize();
    print_state(&app);

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        let deadline = app.next_deadline().map(Instant::from_std);
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => execute(&mut app, command),
                    Err(e) => eprintln!("{e}"),
                }
            }
            () = sleep_until_deadline(deadline) => {
                let ran = app.run_due_timers();
                tracing::debug!(ran, "Ran due timers");
            }
            _ = signal::ctrl_c() => break,
        }
    }

    app.shutdown();
    Ok(())
}

fn pane_view(app: &App<RecordingHost>, pane: usize) -> Option<ViewId> {
    let view = app.panes().pane(pane).map(|state| state.view);
    if view.is_none() {
        eprintln!("no pane {pane}");
    }
    view
}

fn execute(app: &mut App<RecordingHost>, command: Command) {
    match command {
        Command::Panes(count) => match PaneCount::new(count) {
            Ok(count) => {
                let outcome = app.set_pane_count(count);
                println!(
                    "panes={} anchor={}",
                    outcome.current_pane_count,
                    outcome.quick_prompt_anchor_pane_index.value()
                );
            }
            Err(e) => eprintln!("{e}"),
        },
        Command::Switch { pane, provider } => {
            let outcome = app.update_pane_provider(pane, &provider);
            println!("switch pane={} success={}", outcome.pane_index, outcome.success);
        }
        Command::Reset => {
            println!("reset success={}", app.reset_all_panes_to_provider_home());
        }
        Command::Toggle => println!("quick prompt visible={}", app.toggle_quick_prompt()),
        Command::Show => println!("quick prompt visible={}", app.show_quick_prompt()),
        Command::Hide => {
            println!(
                "quick prompt visible={}",
                app.hide_quick_prompt(HideOptions::default())
            );
        }
        Command::Resize(height) => {
            let (visible, height) = app.resize_quick_prompt(height);
            println!("quick prompt visible={visible} height={height}");
        }
        Command::Anchor(index) => {
            if !app.set_quick_prompt_anchor(index) {
                eprintln!("invalid anchor {index}");
            }
        }
        Command::Window { width, height } => app.relayout(width, height),
        Command::Fail { pane, code } => {
            if let Some(view) = pane_view(app, pane) {
                let event = app.host_mut().fail_load(view, code, "simulated failure");
                app.handle_host_event(event);
            }
        }
        Command::Crash(pane) => {
            if let Some(view) = pane_view(app, pane) {
                let event = app.host_mut().crash(view, "killed");
                app.handle_host_event(event);
            }
        }
        Command::Finish(pane) => {
            if let Some(view) = pane_view(app, pane) {
                let event = app.host_mut().finish_load(view);
                app.handle_host_event(event);
            }
        }
        Command::Stop(pane) => {
            if let Some(view) = pane_view(app, pane) {
                let event = app.host().stop_loading(view);
                app.handle_host_event(event);
            }
        }
        Command::Focus(pane) => {
            if let Some(view) = pane_view(app, pane) {
                let event = app.host_mut().user_focus(view);
                app.handle_host_event(event);
            }
        }
        Command::Blur => match app.quick_prompt().view() {
            Some(view) => {
                let event = app.host_mut().user_blur(view);
                app.handle_host_event(event);
            }
            None => eprintln!("quick prompt has no view"),
        },
        Command::Enter => match app.quick_prompt().view() {
            Some(view) => {
                let enter = KeyInput::key_down("Enter", "Enter");
                let disposition = app.handle_before_input(view, &enter);
                println!("enter {disposition:?}");
            }
            None => eprintln!("quick prompt has no view"),
        },
        Command::State => print_state(app),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn print_state(app: &App<RecordingHost>) {
    for pane in app.panes().panes() {
        let attempts = app
            .recovery_state(pane.view)
            .map_or(0, |state| state.attempt_count);
        println!(
            "pane {} {} {} loading={} attempts={} url={}",
            pane.pane_index.value(),
            pane.provider_key,
            pane.view,
            app.is_pane_loading(pane.pane_index),
            attempts,
            app.host().current_url(pane.view).unwrap_or_default(),
        );
    }
    let overlay = app.quick_prompt();
    println!(
        "quick prompt visible={} ready={} height={} anchor={} timers={}",
        overlay.is_visible(),
        overlay.is_ready(),
        overlay.height(),
        app.quick_prompt_anchor().value(),
        app.pending_timers(),
    );
}
