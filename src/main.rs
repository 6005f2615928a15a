use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use rolepad::config::AppConfig;
use rolepad::controller::{PadHandle, PadSettings, ProfileCatalog, ScriptedInput};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Gamepad role tracker
#[derive(Parser, Debug)]
#[command(name = "rolepad", version, about)]
struct Args {
    /// Config file to use instead of the one in the user config directory
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Drive the tracker from scripted input instead of a gamepad
    #[arg(long)]
    headless: bool,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    ticks: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let args = Args::parse();
    let config = setup_config(&args).await?;

    let mut settings = PadSettings::from(&config);
    settings.max_ticks = args.ticks;

    let catalog = ProfileCatalog::builtin().with_extra(config.profiles.clone());

    info!("Starting pad driver");
    let handle = if args.headless || config.headless {
        info!("Running headless with scripted input");
        PadHandle::spawn(Box::new(headless_input()), Some(settings), catalog)
    } else {
        PadHandle::spawn_gilrs(Some(settings), catalog)?
    };

    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received");
                cancel.cancel();
            }
            Err(e) => warn!("Unable to listen for interrupt: {}", e),
        }
    });

    handle
        .join()
        .await
        .map_err(|e| eyre!("Pad driver failed: {}", e))?;

    info!("Bye");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

async fn setup_config(args: &Args) -> Result<AppConfig> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => AppConfig::default_path()?,
    };
    let config = AppConfig::load_or_create(&path).await?;
    info!("Using config: {:?}", config);
    Ok(config)
}

// Presses the standard profile's action buttons in turn so the role demo has something to show
fn headless_input() -> ScriptedInput {
    let mut input = ScriptedInput::new();
    let pulse = |at: usize| {
        let mut frames = vec![0.0; at];
        frames.extend([1.0, 1.0, 0.0]);
        frames
    };
    input.queue_axis("Fire2", pulse(10));
    input.queue_axis("Fire1", pulse(40));
    input.queue_axis("Fire3", pulse(70));
    input.queue_axis("Jump", pulse(130));
    input
}
