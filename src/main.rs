mod config;

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use hostwatch_detect::{ProcessEvaluator, ScanCoordinator, ScanHandle, ScanSnapshot};
use hostwatch_host::{HostSampler, ProcessCollector};
use hostwatch_tui::{Action, AppState, Event, EventHandler, KeyBindings, SortKey, Tab, Tui};

use crate::config::Config;

/// hostwatch - A terminal dashboard for spotting suspicious processes and log activity
#[derive(Parser, Debug)]
#[command(name = "hostwatch")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file (default: <config dir>/hostwatch/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding system logs
    #[arg(long, value_name = "DIR")]
    pub log_root: Option<PathBuf>,

    /// Milliseconds between process refreshes
    #[arg(long, value_name = "MS")]
    pub process_interval_ms: Option<u64>,

    /// Seconds between automatic log scans while the log tab is open
    #[arg(long, value_name = "SECS")]
    pub log_interval_secs: Option<u64>,

    /// Do not query the systemd journal
    #[arg(long)]
    pub no_journal: bool,

    /// Write diagnostics here (default: <cache dir>/hostwatch/hostwatch.log)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Start with only suspicious processes listed
    #[arg(long)]
    pub suspicious_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The alternate screen hides stderr, so diagnostics go to a file when possible
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_ansi(false)
        .with_writer(log_writer(args.log_file.clone()))
        .init();

    let result = async {
        let mut config = Config::load(args.config.as_deref())?;
        config.apply_args(&args);
        run_app(&args, config).await
    }
    .await;

    // Handle any errors
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn log_writer(explicit: Option<PathBuf>) -> BoxMakeWriter {
    let path = explicit.or_else(|| {
        dirs::cache_dir().map(|dir| dir.join("hostwatch").join("hostwatch.log"))
    });

    let file = path.and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match file {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None => BoxMakeWriter::new(std::io::stderr),
    }
}

/// Internal actions for background work
enum InternalAction {
    RefreshProcesses,
    StartScan { full: bool },
    ScanFinished(ScanSnapshot),
    ScanFailed(String),
    ClearSeen,
}

async fn run_app(args: &Args, config: Config) -> Result<()> {
    // Create action channels
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<InternalAction>();

    let mut state = AppState::new().with_suspicious_only(args.suspicious_only);
    let evaluator = config.evaluator();
    let mut collector = ProcessCollector::new();
    let mut sampler = HostSampler::new(config.ui.network_max_mbps);
    let scanner = ScanHandle::new(ScanCoordinator::new(config.scan_config()));

    info!(
        log_root = %config.scan.log_root.display(),
        journal = config.scan.journal,
        interval_ms = config.process_interval().as_millis() as u64,
        "starting hostwatch"
    );

    // First samples only prime the CPU deltas
    refresh_processes(&mut state, &mut collector, &evaluator);
    state.host = sampler.sample();

    // Initialize TUI
    let mut tui = Tui::new().context("Failed to initialize terminal")?;
    let mut events = EventHandler::new(config.tick_rate(), config.process_interval());
    let keybindings = KeyBindings::new();

    let mut log_interval = tokio::time::interval(config.log_interval());
    log_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately and the startup scan covers it
    log_interval.tick().await;

    let _ = internal_tx.send(InternalAction::StartScan { full: true });

    // Initial render
    render(&mut tui, &mut state)?;

    // Main event loop
    loop {
        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if state.ui_state.help_visible {
                            Some(keybindings.get_help_action(&key))
                        } else {
                            keybindings.get_action(state.tab.into(), &key)
                        };
                        if let Some(action) = action {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Refresh => {
                        let _ = internal_tx.send(InternalAction::RefreshProcesses);
                    }
                    Event::Tick | Event::Resize(_, _) => {}
                    Event::Error(e) => {
                        warn!(error = %e, "terminal event error");
                        state.show_error(e);
                    }
                }
            }

            // Periodic partial rescans, only while the log tab is visible
            _ = log_interval.tick() => {
                if state.tab == Tab::Logs {
                    let _ = internal_tx.send(InternalAction::StartScan { full: false });
                }
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                handle_action(&mut state, &internal_tx, action);
            }

            // Handle internal actions
            Some(internal) = internal_rx.recv() => {
                match internal {
                    InternalAction::RefreshProcesses => {
                        refresh_processes(&mut state, &mut collector, &evaluator);
                        state.host = sampler.sample();
                    }

                    InternalAction::StartScan { full } => {
                        if state.begin_scan() {
                            spawn_scan(scanner.clone(), full, internal_tx.clone());
                        }
                    }

                    InternalAction::ScanFinished(snapshot) => {
                        info!(
                            entries = snapshot.entries.len(),
                            seen = snapshot.seen_lines,
                            "log scan finished"
                        );
                        state.finish_scan(snapshot);
                    }

                    InternalAction::ScanFailed(msg) => {
                        warn!(error = %msg, "log scan failed");
                        state.abort_scan(msg);
                    }

                    InternalAction::ClearSeen => {
                        // The coordinator is locked for the whole pass
                        if state.scanning {
                            state.ui_state.status_message =
                                Some("Wait for the running scan to finish".to_string());
                        } else {
                            scanner.clear_seen();
                            state.mark_seen_cleared();
                        }
                    }
                }
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state)?;
    }

    // Cleanup
    events.shutdown();
    tui.restore()?;

    Ok(())
}

fn handle_action(
    state: &mut AppState,
    internal_tx: &mpsc::UnboundedSender<InternalAction>,
    action: Action,
) {
    match action {
        Action::Quit => state.should_quit = true,
        Action::NextTab => state.next_tab(),
        Action::ShowTab(tab) => state.tab = tab,

        Action::ToggleHelp => state.toggle_help(),
        Action::ToggleDetails => state.toggle_details(),
        Action::ToggleStats => state.log_view.show_stats = !state.log_view.show_stats,
        Action::CloseOverlay => state.close_overlay(),

        Action::ScrollUp(n) => state.scroll_up(n),
        Action::ScrollDown(n) => state.scroll_down(n),
        Action::ScrollToTop => state.scroll_to_top(),
        Action::ScrollToBottom => state.scroll_to_bottom(),
        Action::PageUp => state.page_up(),
        Action::PageDown => state.page_down(),

        Action::SortByCpu => state.sort_by(SortKey::Cpu),
        Action::SortByMemory => state.sort_by(SortKey::Memory),
        Action::ToggleSortOrder => state.toggle_sort_order(),
        Action::ToggleSuspiciousOnly => state.toggle_suspicious_only(),
        Action::RefreshProcesses => {
            let _ = internal_tx.send(InternalAction::RefreshProcesses);
        }

        Action::RescanLogs => {
            let _ = internal_tx.send(InternalAction::StartScan { full: false });
        }
        Action::FullRescanLogs => {
            let _ = internal_tx.send(InternalAction::StartScan { full: true });
        }
        Action::ClearSeenLogs => {
            let _ = internal_tx.send(InternalAction::ClearSeen);
        }
        Action::CycleLogFilter => state.cycle_log_filter(),
    }
}

/// Collect processes and flag the suspicious ones
fn refresh_processes(
    state: &mut AppState,
    collector: &mut ProcessCollector,
    evaluator: &ProcessEvaluator,
) {
    let mut processes = collector.collect();
    for process in &mut processes {
        process.suspicious = evaluator.is_suspicious(&process.snapshot());
    }
    state.set_processes(processes);
}

/// Run a pass on the blocking pool and post the result back
fn spawn_scan(scanner: ScanHandle, full: bool, tx: mpsc::UnboundedSender<InternalAction>) {
    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || scanner.scan(full)).await;
        let message = match result {
            Ok(snapshot) => InternalAction::ScanFinished(snapshot),
            Err(e) => InternalAction::ScanFailed(format!("Log scan failed: {}", e)),
        };
        let _ = tx.send(message);
    });
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.terminal().draw(|frame| hostwatch_tui::draw(frame, state))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn drain(rx: &mut mpsc::UnboundedReceiver<InternalAction>) -> Vec<InternalAction> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn test_rescan_actions_queue_internal_work() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = AppState::new();

        handle_action(&mut state, &tx, Action::RescanLogs);
        handle_action(&mut state, &tx, Action::FullRescanLogs);
        handle_action(&mut state, &tx, Action::ClearSeenLogs);

        let queued = drain(&mut rx);
        assert!(matches!(queued[0], InternalAction::StartScan { full: false }));
        assert!(matches!(queued[1], InternalAction::StartScan { full: true }));
        assert!(matches!(queued[2], InternalAction::ClearSeen));
    }

    #[test]
    fn test_quit_and_tabs() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = AppState::new();

        handle_action(&mut state, &tx, Action::NextTab);
        assert_eq!(state.tab, Tab::Logs);
        handle_action(&mut state, &tx, Action::ShowTab(Tab::Processes));
        assert_eq!(state.tab, Tab::Processes);

        handle_action(&mut state, &tx, Action::Quit);
        assert!(state.should_quit);
    }

    #[test]
    fn test_refresh_flags_suspicious_processes() {
        let mut state = AppState::new();
        let mut collector = ProcessCollector::new();
        refresh_processes(&mut state, &mut collector, &ProcessEvaluator::new());

        let me = std::process::id();
        assert!(state.process_rows().iter().any(|p| p.pid == me));
    }

    #[tokio::test]
    async fn test_spawned_scan_posts_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("syslog"),
            "kernel panic detected on cpu0\nordinary heartbeat line\n",
        )
        .unwrap();

        let scanner = ScanHandle::new(ScanCoordinator::new(
            hostwatch_detect::ScanConfig::files_only(dir.path()),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_scan(scanner, true, tx);

        let msg = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match msg {
            InternalAction::ScanFinished(snapshot) => {
                assert_eq!(snapshot.entries.len(), 1);
                assert_eq!(snapshot.entries[0].content, "kernel panic detected on cpu0");
            }
            _ => panic!("expected a finished scan"),
        }
    }
}
