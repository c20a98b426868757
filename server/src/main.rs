use clap::Parser;
use log::info;
use server::config::{RoomSettings, ServerConfig};
use server::network::Server;
use server::tally::TieBreak;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Maximum number of concurrent connections
    #[arg(short, long, default_value = "256")]
    max_clients: usize,

    /// Players needed before the host can start
    #[arg(long, default_value = "4")]
    min_players: usize,

    /// Room capacity
    #[arg(long, default_value = "12")]
    max_players: usize,

    /// How tied votes are settled
    #[arg(short, long, value_enum, default_value = "first-cast")]
    tie_break: TieBreak,

    /// Seconds a dropped player's seat is held mid-game
    #[arg(long, default_value = "60")]
    reconnect_grace_secs: u64,

    /// Seconds of silence before a connection is dropped
    #[arg(long, default_value = "30")]
    idle_timeout_secs: u64,

    /// Fixed RNG seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = ServerConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        max_clients: args.max_clients,
        idle_timeout: Duration::from_secs(args.idle_timeout_secs),
        rooms: RoomSettings {
            min_players: args.min_players,
            max_players: args.max_players,
            tie_break: args.tie_break,
            reconnect_grace: Duration::from_secs(args.reconnect_grace_secs),
        },
        seed: args.seed,
        ..ServerConfig::default()
    };

    info!(
        "Rooms: {}-{} players, tie break {:?}",
        config.rooms.min_players, config.rooms.max_players, config.rooms.tie_break
    );

    let mut server = Server::new(config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
