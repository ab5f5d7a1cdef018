use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Parser;
use smithay::reexports::calloop::EventLoop;
use smithay::reexports::wayland_server::Display;

use wincore::adapter::state::{CalloopData, State};

/// Accepts `--start-xwayland`, `--replace`, and a session identifier; the
/// launching session sets up the rest (`DISPLAY`, `WAYLAND_DISPLAY`) as
/// environment before exec'ing this binary.
#[derive(Parser, Debug)]
#[command(name = "wincored", about = "Core of a hybrid X11/Wayland window manager and compositor")]
struct Cli {
    /// Start an embedded Xwayland server for legacy X11 clients.
    #[arg(long)]
    start_xwayland: bool,

    /// Replace a currently-running window manager on the same seat.
    #[arg(long)]
    replace: bool,

    /// Session identifier used to match restored session records
    /// (core::session::SessionStore::take_session_info).
    #[arg(long)]
    session_id: Option<String>,
}

/// Dual stdout+file logging, grounded on `utils/logs.rs::init_logs`: an
/// `EnvFilter` gate in front of two non-blocking writers. The guards are
/// leaked deliberately so the background flush threads outlive `main`.
fn init_logging() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    let log_path = std::env::var("HOME")
        .map(|home| format!("{home}/.local/state/wincored.log"))
        .unwrap_or_else(|_| "/tmp/wincored.log".to_string());
    let file_writer = std::fs::File::create(&log_path)
        .map(|file| tracing_appender::non_blocking(file))
        .ok();

    Box::leak(Box::new(stdout_guard));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(stdout_nb).with_target(false))
        .with(file_writer.map(|(file_nb, file_guard)| {
            Box::leak(Box::new(file_guard));
            fmt::layer().with_writer(file_nb).with_ansi(false).with_target(true)
        }))
        .init();

    tracing::info!(%log_path, "logging initialized");
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    tracing::info!(?cli, "starting wincored");

    // A fatal startup error aborts the process with exit code 1.
    if let Err(err) = run(cli) {
        tracing::error!("fatal error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut event_loop: EventLoop<CalloopData> = EventLoop::try_new()?;
    let display: Display<State> = Display::new()?;
    let display_handle = display.handle();

    let state = State::new(event_loop.handle(), event_loop.get_signal(), display);

    if cli.start_xwayland {
        tracing::info!("xwayland startup requested");
        #[cfg(not(feature = "xwayland"))]
        tracing::warn!("built without the `xwayland` feature; ignoring --start-xwayland");
    }
    if cli.replace {
        tracing::info!("replacing an existing window manager on this seat");
    }
    if let Some(session_id) = &cli.session_id {
        tracing::info!(%session_id, "restoring session");
    }

    let running = state.running.clone();
    tracing::info!(socket = %state.socket_name.to_string_lossy(), "listening for clients");
    let mut data = CalloopData { state, display_handle };

    while running.load(Ordering::SeqCst) {
        event_loop.dispatch(Some(Duration::from_millis(16)), &mut data)?;
        data.display_handle.flush_clients()?;
    }

    Ok(())
}
