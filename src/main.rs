use moondust::build_info;
use moondust::config::{self, CliCommand, ServerConfig};
use moondust::persistence::{FileStore, PlayerStore};
use moondust::session::{GameLoop, SessionRegistry};
use moondust::web::{self, GameServer};
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = std::env::args().skip(1);
    let command = match config::parse_args(args, |key| std::env::var(key).ok()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Run 'moondust --help' for usage.");
            std::process::exit(1);
        }
    };

    match command {
        CliCommand::Help => {
            println!("{}", config::USAGE);
            Ok(())
        }
        CliCommand::Version => {
            println!("{}", build_info::version_line("moondust"));
            Ok(())
        }
        CliCommand::Serve(config) => {
            init_logging();
            run(config).await
        }
    }
}

async fn run(config: ServerConfig) -> io::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = build_info::BUILD_COMMIT,
        data_dir = %config.data_dir.display(),
        "starting moondust"
    );

    let store: Arc<dyn PlayerStore> = Arc::new(FileStore::open(&config.data_dir).map_err(io::Error::other)?);
    let registry = Arc::new(SessionRegistry::new());
    let server = Arc::new(GameServer::new(Arc::clone(&registry), store));

    let game_loop = GameLoop::new(
        Arc::clone(&registry),
        server.saver().clone(),
        config.autosave_ticks,
    );
    tokio::spawn(game_loop.run(config.tick_interval()));

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;

    tokio::select! {
        result = web::serve(listener, Arc::clone(&server)) => {
            if let Err(e) = &result {
                error!(error = %e, "server stopped");
            }
            result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutting down");
        }
    }

    let report = server.saver().save_all().await;
    info!(saved = report.saved, failed = report.failed, "final save complete");
    Ok(())
}
