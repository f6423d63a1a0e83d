//! Sidescroll host
//!
//! `sidescroll [--play] [level.ron]`
//!
//! Without `--play` the session starts in edit mode (editing session: the
//! last active scene is kept). With `--play` it is a production session that
//! always begins in the level's start scene. Without a level path the
//! built-in sample level is used.

mod app;

use std::path::PathBuf;

use clap::Parser;
use macroquad::prelude::{get_frame_time, next_frame, Conf};
use tracing::{error, info};

use sidescroll::config::{load_config_or_default, EngineConfig, CONFIG_FILE_NAME};
use sidescroll::game::{GameRuntime, SessionKind};
use sidescroll::world::{load_level, sample_level};
use sidescroll::VERSION;

use app::App;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Sidescroll v{}", VERSION),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    // Chain so the crash log hook still runs
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
        previous(info);
    }));
}

/// `sidescroll.ron` in the working directory, else the platform config dir
fn config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        dirs::config_dir().map(|dir| dir.join("sidescroll").join(CONFIG_FILE_NAME))
    }
    #[cfg(target_arch = "wasm32")]
    {
        None
    }
}

#[derive(Parser)]
#[command(name = "sidescroll", version = VERSION)]
#[command(about = "Side-scrolling platformer with a live level editor")]
struct Args {
    /// Start a production session in the level's start scene
    #[arg(long)]
    play: bool,
    /// Level file (.ron, plain or brotli-compressed); defaults to the sample level
    level: Option<PathBuf>,
}

#[macroquad::main(window_conf)]
async fn main() {
    // Crash logging first, before anything can panic
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    init_tracing();
    info!(version = VERSION, "starting");

    let args = Args::parse();
    let config = config_path().map(load_config_or_default).unwrap_or_else(EngineConfig::default);

    let level = match &args.level {
        Some(path) => match load_level(path) {
            Ok(level) => level,
            Err(e) => {
                error!(path = %path.display(), error = %e, "could not load level, using sample level");
                sample_level()
            }
        },
        None => sample_level(),
    };

    let runtime = match GameRuntime::from_level(level, &config) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "level cannot be played");
            return;
        }
    };

    let session = if args.play { SessionKind::Production } else { SessionKind::Editing };
    let mut app = App::new(runtime, session);

    loop {
        app.frame(get_frame_time());
        next_frame().await;
    }
}
