use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{BufReader, Stdin};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use stock_tracker::commands::{Cli, Command, RemoveTarget};
use stock_tracker::config::{Backend, Config};
use stock_tracker::notify::TracingNotifier;
use stock_tracker::render::render_table;
use stock_tracker::storage::{InMemoryStorage, RestStorage, SqliteStorage, Storage};
use stock_tracker::terminal::{prompt, Terminal};
use stock_tracker::utils::http::create_client;
use stock_tracker::ProductListController;

type StdinTerminal = Terminal<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stock_tracker=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting Stock Tracker");

    // Load configuration
    let config = Config::load_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;

    let storage = build_storage(&config).await?;
    let terminal = Arc::new(Terminal::new(BufReader::new(tokio::io::stdin())));

    let mut controller =
        ProductListController::new(storage, Arc::new(TracingNotifier), terminal.clone());

    // Load failures are already reported; start with an empty table
    let _ = controller.refresh().await;
    print_table(&controller);
    println!("Type `help` for commands.");

    run(&mut controller, &terminal, config.auto_refresh_seconds).await;

    info!("Stock Tracker stopped");
    Ok(())
}

async fn build_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        Backend::Rest => {
            let client = create_client(config).context("Failed to build HTTP client")?;
            let url = config.rest.url.as_deref().context("rest.url is not set")?;
            let key = config.rest.key.as_deref().context("rest.key is not set")?;
            let storage = RestStorage::new(client, url, key, &config.rest.table)?;
            info!("Using REST store at {}", storage.endpoint());
            Arc::new(storage)
        }
        Backend::Sqlite => {
            let storage = SqliteStorage::new(&config.sqlite.path).await?;
            storage.migrate().await?;
            if let Some(path) = &config.sqlite.import_path {
                storage
                    .import_from_json(path)
                    .await
                    .with_context(|| format!("Failed to import {}", path))?;
            }
            info!("Using SQLite store at {}", config.sqlite.path);
            Arc::new(storage)
        }
        Backend::Memory => {
            warn!("Using in-memory store; nothing will be persisted");
            Arc::new(InMemoryStorage::new())
        }
    };

    Ok(storage)
}

async fn run(controller: &mut ProductListController, terminal: &StdinTerminal, auto_refresh: u64) {
    let mut ticker = interval(Duration::from_secs(auto_refresh.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        prompt("> ");

        let line = tokio::select! {
            line = terminal.next_line() => line,
            _ = ticker.tick(), if auto_refresh > 0 => {
                info!("Auto refresh at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
                if controller.refresh().await.is_ok() {
                    println!();
                    print_table(controller);
                }
                continue;
            }
        };

        let Some(line) = line else {
            break;
        };

        let command = match Command::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                // Help output and usage errors alike
                let _ = e.print();
                continue;
            }
        };

        if !execute(controller, command).await {
            break;
        }
    }
}

/// Run one command. Returns `false` when the loop should stop.
async fn execute(controller: &mut ProductListController, command: Command) -> bool {
    match command {
        Command::Add { url } => {
            if let Err(e) = controller.add_product(&url).await {
                error!("{}", e);
            }
        }
        Command::Url { text } => {
            controller.set_pending_url(text.unwrap_or_default());
            println!("Draft: {}", controller.pending_url());
            return true;
        }
        Command::Submit => {
            if let Err(e) = controller.submit_pending().await {
                error!("{}", e);
            }
        }
        Command::Rm { target } => {
            let url = match target {
                RemoveTarget::Url(url) => url,
                RemoveTarget::Row(row) => {
                    let visible = controller.visible_products();
                    match row.checked_sub(1).and_then(|i| visible.get(i)) {
                        Some(product) => product.url.clone(),
                        None => {
                            println!("No row {} in the table", row);
                            return true;
                        }
                    }
                }
            };
            if let Err(e) = controller.remove_product(&url).await {
                error!("{}", e);
            }
        }
        Command::Sort { column } => controller.set_sort(column),
        Command::Instock => controller.toggle_in_stock_only(),
        Command::Refresh => {
            let _ = controller.refresh().await;
        }
        Command::List => {}
        Command::Quit => return false,
    }

    print_table(controller);
    true
}

fn print_table(controller: &ProductListController) {
    let view = controller.view();
    let rows = controller.visible_products();
    print!("{}", render_table(&rows, &view, controller.last_refreshed()));
}
