mod config;
mod graphql;
mod http;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use platform_db::RecordStore;
use platform_obs::{ObsConfig, init_tracing};
use products_recognition::{MessageGenerator, TemplateMessages};
use tracing::info;

use crate::{
    config::AppConfig,
    graphql::GraphqlData,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "kudos-server", version, about = "Employee recognition points ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP + GraphQL server.
    Serve(ServeCommand),
    /// Print the active seed (SEED_FILE or the demo fixture) as JSON.
    #[command(name = "seed:print")]
    SeedPrint,
    /// Print the GraphQL schema SDL.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::from_env()?)?;
    let cli = Cli::parse();
    let app_config = Arc::new(AppConfig::load()?);
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config).await,
        Command::SeedPrint => seed_print(&app_config),
        Command::SchemaPrint { output } => schema_print(&app_config, output),
    }
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let store = platform_db::open(&config.store).context("failed to load record store")?;
    let messages: Arc<dyn MessageGenerator> = Arc::new(TemplateMessages);
    let schema = graphql::build_schema(GraphqlData {
        store: store.clone(),
        messages: messages.clone(),
        leaderboard_size: config.leaderboard_size,
    });
    let state = AppState {
        store,
        schema,
        config,
        messages,
    };
    http::serve(cmd.into(), state).await
}

fn seed_print(config: &AppConfig) -> Result<()> {
    let seed = config.store.load_seed()?;
    let store = RecordStore::from_seed(seed).context("seed failed validation")?;
    println!("{}", store.snapshot().to_json_pretty()?);
    Ok(())
}

fn schema_print(config: &AppConfig, path: Option<PathBuf>) -> Result<()> {
    let sdl = graphql::build_schema(GraphqlData {
        store: RecordStore::default().into_shared(),
        messages: Arc::new(TemplateMessages),
        leaderboard_size: config.leaderboard_size,
    })
    .sdl();
    match path {
        Some(path) => {
            std::fs::write(&path, sdl)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "graphql schema written");
        }
        None => print!("{sdl}"),
    }
    Ok(())
}
