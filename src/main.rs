/*!
# emodiary

Command-line entry point for the emodiary diary backend.

## Usage

```text
emodiary [OPTIONS] <COMMAND>

Commands:
  serve    Start the HTTP server
  init-db  Create the database schema and exit

Options:
      --log-format <LOG_FORMAT>  Log output format: text or json
      --log-level <LOG_LEVEL>    Default log level when RUST_LOG is not set
  -h, --help                     Print help
  -V, --version                  Print version
```

Configuration comes from `EMODIARY_*` environment variables and
`OPENAI_API_KEY`; command-line flags take precedence.
*/

use clap::Parser;
use emodiary::ai::{ChatClient, TextAugmenter};
use emodiary::auth::TokenSigner;
use emodiary::cli::{CliArgs, Commands};
use emodiary::config::{expand_db_path, Config};
use emodiary::constants::APP_NAME;
use emodiary::db::Database;
use emodiary::errors::AppResult;
use emodiary::logging::init_tracing;
use emodiary::server::{self, AppState};
use std::sync::Arc;
use tracing::{debug, info};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Parses arguments, loads configuration, and dispatches the subcommand.
fn run() -> AppResult<()> {
    let args = CliArgs::parse();

    let mut config = Config::load()?;
    if let Some(format) = args.log_format {
        config.log_format = format;
    }
    if let Some(db) = args.db_override() {
        config.db_path = expand_db_path(&db.to_string_lossy())?;
    }

    init_tracing(config.log_format, &args.log_level)?;
    info!("Starting {}", APP_NAME);
    debug!("Configuration: {:?}", config);

    match args.command {
        Commands::InitDb { .. } => init_db(&config),
        Commands::Serve { bind, .. } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            serve(config)
        }
    }
}

fn init_db(config: &Config) -> AppResult<()> {
    config.validate_storage()?;

    let db = Database::open(&config.db_path)?;
    db.initialize_schema()?;

    println!("Initialized database at {}", config.db_path.display());
    Ok(())
}

fn serve(config: Config) -> AppResult<()> {
    config.validate()?;

    let db = Database::open(&config.db_path)?;
    db.initialize_schema()?;

    // The blocking HTTP client owns a runtime of its own, so it is built and
    // finally dropped here on the main thread, outside the server runtime.
    let client = Arc::new(ChatClient::new(&config.ai)?);
    let augmenter: Arc<dyn TextAugmenter> = client.clone();

    let tokens = TokenSigner::new(&config.token.secret, config.token.ttl_secs)?;
    let state = AppState::new(db, augmenter, tokens, config.token.require_token);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(server::serve(
        state,
        config.bind_addr,
        &config.cors_origins,
    ));

    drop(runtime);
    drop(client);
    result
}
