//! Infinite Craft CLI
//!
//! ```bash
//! craft serve                       # HTTP API on 127.0.0.1:3000
//! craft serve --memory              # same, without MongoDB
//! craft combine Fire Water          # ask the API, save the result locally
//! craft combine Fire Water --local  # resolve in-process
//! craft list --sort name
//! craft reset
//! craft play
//! ```

mod play;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use craft_client::{
    load_elements, Action, CombineClient, Controller, CraftState, FileStorage,
    HttpCombineClient, LocalCombineClient, Settings, SortMode,
};
use craft_config::{CraftConfig, StoreBackend};
use craft_resolver::Resolver;
use craft_web::AppState;

#[derive(Parser)]
#[command(name = "craft")]
#[command(about = "Infinite Craft - combine elements, discover new ones")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the combine API
    Serve {
        /// Address to bind, overrides config
        #[arg(long)]
        bind: Option<String>,

        /// Keep combinations in memory instead of MongoDB
        #[arg(long)]
        memory: bool,
    },

    /// Combine two elements and save the result locally
    Combine {
        first: String,
        second: String,

        /// Resolve in-process instead of calling the API
        #[arg(long)]
        local: bool,
    },

    /// Show discovered elements
    List {
        /// time, name or emoji
        #[arg(long, default_value = "time")]
        sort: String,
    },

    /// Forget discoveries and restore the starter elements
    Reset,

    /// Interactive session
    Play {
        /// Resolve in-process instead of calling the API
        #[arg(long)]
        local: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs, cli.verbose);

    let config = CraftConfig::load(cli.config.as_deref()).context("loading config")?;

    match cli.command {
        Commands::Serve { bind, memory } => cmd_serve(config, bind, memory).await,
        Commands::Combine {
            first,
            second,
            local,
        } => cmd_combine(&config, &first, &second, local).await,
        Commands::List { sort } => cmd_list(&config, &sort),
        Commands::Reset => cmd_reset(&config).await,
        Commands::Play { local } => {
            let controller = controller(&config, local).await?;
            play::run(controller).await
        }
    }
}

fn init_tracing(json: bool, verbose: bool) {
    let default = if verbose {
        "craft=debug,tower_http=debug"
    } else {
        "craft=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_target(false)))
        .init();
}

async fn build_resolver(config: &CraftConfig) -> Result<Resolver> {
    let store = craft_mongodb::open(&config.store)
        .await
        .with_context(|| format!("opening {} store", config.store.backend))?;
    let generator = craft_llm::from_config(&config.generator).context("configuring generator")?;

    tracing::info!(
        store = store.backend(),
        generator = generator.name(),
        model = generator.model(),
        pair_order = %config.resolver.pair_order,
        "resolver ready"
    );
    Ok(Resolver::new(store, generator).pair_order(config.resolver.pair_order))
}

async fn combine_client(config: &CraftConfig, local: bool) -> Result<Arc<dyn CombineClient>> {
    if local {
        let resolver = build_resolver(config).await?;
        Ok(Arc::new(LocalCombineClient::new(Arc::new(resolver))))
    } else {
        Ok(Arc::new(HttpCombineClient::new(config.client.api_url.clone())))
    }
}

fn open_storage(config: &CraftConfig) -> Result<FileStorage> {
    let path = config.client.storage_path();
    FileStorage::open(&path).with_context(|| format!("opening {}", path.display()))
}

async fn controller(config: &CraftConfig, local: bool) -> Result<Controller> {
    let client = combine_client(config, local).await?;
    let storage = open_storage(config)?;
    Ok(Controller::new(
        client,
        Box::new(storage),
        Settings::from(&config.client),
    )?)
}

async fn cmd_serve(mut config: CraftConfig, bind: Option<String>, memory: bool) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if memory {
        config.store.backend = StoreBackend::Memory;
    }

    let resolver = build_resolver(&config).await?;
    let state = Arc::new(AppState::new(resolver));
    craft_web::serve(state, &config.server.bind)
        .await
        .with_context(|| format!("serving on {}", config.server.bind))
}

async fn cmd_combine(config: &CraftConfig, first: &str, second: &str, local: bool) -> Result<()> {
    let client = combine_client(config, local).await?;
    let response = client.combine(first, second).await?;

    let storage = open_storage(config)?;
    let mut controller = Controller::new(
        client,
        Box::new(storage),
        Settings::from(&config.client),
    )?;
    controller
        .dispatch(Action::CombineSucceeded {
            inputs: [first.to_string(), second.to_string()],
            element: response.element(),
        })
        .await;
    if let Some(error) = controller.state().error() {
        anyhow::bail!("{}", error);
    }

    let marker = if response.new { "  (new!)" } else { "" };
    println!(
        "{} + {} = {} {}{}",
        first, second, response.emoji, response.name, marker
    );
    Ok(())
}

fn cmd_list(config: &CraftConfig, sort: &str) -> Result<()> {
    let sort = SortMode::from_str(sort)
        .with_context(|| format!("unknown sort '{}', expected time, name or emoji", sort))?;

    let storage = open_storage(config)?;
    let mut state = CraftState::new(Settings::from(&config.client));
    state.apply(Action::Load(load_elements(&storage)?));
    state.set_sort(sort);

    let view = state.sidebar_view();
    println!("{} elements (sorted by {})", view.len(), sort);
    for known in view {
        println!("  {}", known.element);
    }
    Ok(())
}

async fn cmd_reset(config: &CraftConfig) -> Result<()> {
    let client = Arc::new(HttpCombineClient::new(config.client.api_url.clone()));
    let storage = open_storage(config)?;
    let path = storage.path().to_path_buf();

    let mut controller = Controller::new(client, Box::new(storage), Settings::from(&config.client))?;
    controller.dispatch(Action::Reset).await;
    if let Some(error) = controller.state().error() {
        anyhow::bail!("{}", error);
    }

    println!("Reset to starter elements ({})", path.display());
    Ok(())
}
