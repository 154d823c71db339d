//! Wires `hh-seats` and `hh-engine` into a running table process: the
//! [`SessionLoop`] driver, the [`Intent`] funnel transport handlers submit
//! into, and the `actix-web`/`actix-ws` [`Server`] exposing `/ws` and
//! `/spectate`.
mod config;
mod date;
mod intent;
mod server;
mod status;
mod table;

pub use config::HostConfig;
pub use intent::Intent;
pub use server::Server;
pub use table::SessionLoop;

/// Starts the table: builds the session loop from environment config,
/// spawns it, and serves `/ws` + `/spectate` until the process exits.
pub async fn run() -> anyhow::Result<()> {
    let config = HostConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    let session_loop = SessionLoop::new(config);
    tokio::spawn(session_loop.run(rx));

    Server::run(tx, bind_addr).await?;
    Ok(())
}
