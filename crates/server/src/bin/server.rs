use std::{
    fs,
    io::ErrorKind,
    net::{IpAddr, SocketAddr},
    str::FromStr,
    sync::Arc,
};

use clap::Parser;
use server::{auth::JwtVerifier, cli::Cli, db, routes::router, AppState};
use shared::{configure_tracing, load_dotenv};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    load_dotenv()?;
    configure_tracing();

    let args = Cli::parse();
    debug!(?args);

    if args.debug_delete_database {
        delete_database(&args.sqlite_connection_string)?;
    }

    // Run the migrations synchronously before creating the pool or launching the server
    let ran = db::run_migrations(&args.sqlite_connection_string)?;
    info!("Ran {ran} db migrations");

    let pool = db::create_pool(&args.sqlite_connection_string)?;
    if args.cron_secret.is_none() {
        warn!("CRON_SECRET is unset, weekly evaluation triggers will be refused");
    }

    let socket = SocketAddr::new(IpAddr::from_str(&args.bind_addr)?, args.port);
    let listener = TcpListener::bind(socket).await?;
    debug!("listening on {}", listener.local_addr()?);

    let state = AppState {
        pool,
        verifier: Arc::new(JwtVerifier::new(args.jwt_secret.as_bytes(), args.jwt_issuer.as_deref())),
        args: Arc::new(args),
    };

    axum::serve(listener, router(state)?)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Removes the database and its WAL side files
fn delete_database(path: &str) -> Result<(), anyhow::Error> {
    for file in [path.to_string(), format!("{path}-wal"), format!("{path}-shm")] {
        match fs::remove_file(&file) {
            Ok(()) => warn!("Deleted {file}"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => Err(e)?,
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {e}");
    }
}
