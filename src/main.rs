use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use lili_console::api::DEFAULT_VERIFICATION;
use lili_console::config::{ConfigError, ConfigOverrides, ConsoleConfig};
use lili_console::notify::TracingNotifier;
use lili_console::session::FileStorage;
use lili_console::{Console, ConsoleError};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Console(#[from] ConsoleError),
    #[error("missing password; pass --password or set CONSOLE_PASSWORD")]
    MissingPassword,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Flags override the `CONSOLE_*` environment, which overrides the defaults.
#[derive(Parser, Debug)]
#[command(name = "console-cli", about = "Admin console session CLI")]
struct Cli {
    /// Backend origin [env: CONSOLE_BASE_URL]
    #[arg(long)]
    base_url: Option<String>,

    /// Session file [env: CONSOLE_STORAGE_PATH]
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Request timeout [env: CONSOLE_REQUEST_TIMEOUT_SECS]
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Page title suffix [env: CONSOLE_BRAND]
    #[arg(long)]
    brand: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the issued tokens.
    Login {
        username: String,
        #[arg(long, env = "CONSOLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// End the session on the backend and locally.
    Logout,
    /// Fetch the current user's profile.
    Whoami,
    /// Exchange the stored refresh token for a new pair.
    Refresh,
    /// Show the local session without calling the backend.
    Status,
    /// Navigate to a view through the route guard.
    Open { path: String },
    Slider(SliderCommand),
    /// Discard the correlation id and generate a new one.
    NewDevice,
}

#[derive(Args, Debug)]
struct SliderCommand {
    #[command(subcommand)]
    command: SliderSubcommand,
}

#[derive(Subcommand, Debug)]
enum SliderSubcommand {
    Fetch {
        #[arg(long, default_value = DEFAULT_VERIFICATION)]
        kind: String,
    },
    Verify {
        x_pos: i64,
        #[arg(long, default_value = DEFAULT_VERIFICATION)]
        kind: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = ConsoleConfig::from_env()?.with_overrides(ConfigOverrides {
        base_url: cli.base_url,
        request_timeout_secs: cli.timeout_secs,
        storage_path: cli.storage,
        brand: cli.brand,
    })?;

    let storage = Arc::new(FileStorage::open(config.storage_path.clone()));
    let console = Console::new(config, storage, Arc::new(TracingNotifier))?;

    let output = run(&console, cli.command).await?;
    print_json(&output)
}

async fn run(console: &Console, command: Command) -> Result<Value, CliError> {
    match command {
        Command::Login { username, password } => {
            let password = password.ok_or(CliError::MissingPassword)?;
            let nav = console.sign_in(&username, &password).await?;
            Ok(json!({ "path": nav.path, "title": nav.title }))
        }
        Command::Logout => {
            let nav = console.sign_out().await?;
            Ok(json!({ "path": nav.path, "title": nav.title }))
        }
        Command::Whoami => Ok(console.load_profile().await?),
        Command::Refresh => {
            let tokens = console.refresh().await?;
            Ok(json!({ "refreshed": true, "authenticated": !tokens.access_token.is_empty() }))
        }
        Command::Status => Ok(status(console)),
        Command::Open { path } => {
            let nav = console.navigate(&path);
            Ok(json!({ "path": nav.path, "redirectedFrom": nav.redirected_from, "title": nav.title }))
        }
        Command::Slider(slider) => match slider.command {
            SliderSubcommand::Fetch { kind } => Ok(console.slider_image(&kind).await?),
            SliderSubcommand::Verify { x_pos, kind } => Ok(console.verify_slider(x_pos, &kind).await?),
        },
        Command::NewDevice => Ok(json!({ "uuid": console.new_device() })),
    }
}

/// Tokens are reported by presence only.
fn status(console: &Console) -> Value {
    let session = console.store().snapshot();
    json!({
        "authenticated": session.auth_state() == lili_console::AuthState::Authenticated,
        "hasRefreshToken": !session.refresh_token.is_empty(),
        "uuid": session.correlation_id,
        "baseUrl": console.config().base_url,
        "storage": console.config().storage_path.display().to_string(),
    })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
