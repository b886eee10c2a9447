//! Headless API server entrypoint.

use snippetbox_core::DEFAULT_PORT;
use snippetbox_server::{config::Config, db::Database, serve_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    reconcile: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            "--reconcile" => flags.reconcile = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

fn reconcile_tag_counts(database: &Database) -> anyhow::Result<()> {
    let report = database.reconcile_tag_counts()?;
    tracing::info!(
        checked = report.tags_checked,
        repaired = report.tags_repaired,
        "tag count reconcile finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snippetbox=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    let database = Database::new(&config.db_path)?;

    if cli_flags.reconcile {
        // Maintenance mode: repair counts and exit without serving.
        return reconcile_tag_counts(&database);
    }
    if config.reconcile_on_startup {
        if let Err(err) = reconcile_tag_counts(&database) {
            tracing::warn!("Startup tag count reconcile failed: {}", err);
        }
    }

    let state = AppState::new(config.clone(), database);

    let allow_public = snippetbox_server::config::env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = snippetbox_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("SnippetBox running at http://{}", actual_addr);

    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!("SnippetBox stopped");
    Ok(())
}

fn print_help() {
    println!("SnippetBox Server\n");
    println!("Usage: snippetbox [OPTIONS]\n");
    println!("Options:");
    println!("  --reconcile       Recompute tag snippet counts and exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH              Database directory (default: ~/.cache/snippetbox/db)");
    println!("  PORT                 Server port (default: {})", DEFAULT_PORT);
    println!("  MAX_SNIPPET_SIZE     Maximum snippet code size in bytes (default: 1MB)");
    println!("  DEFAULT_PAGE_LIMIT   Page size when a list request omits limit (default: 10)");
    println!("  MAX_PAGE_LIMIT       Upper bound for list page size (default: 100)");
    println!("  SNIPPETBOX_RECONCILE Recompute tag counts at startup");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!(
        "  BIND                 Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
