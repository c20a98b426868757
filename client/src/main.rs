use clap::Parser;
use client::network::Client;
use client::storage::{default_cache_dir, SessionCache};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Display name in the room
    #[arg(short = 'n', long)]
    name: String,

    /// Room code to join; a new room is created when omitted
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// Where the session cache is kept
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let cache = SessionCache::new(args.cache_dir.unwrap_or_else(default_cache_dir));

    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    info!("Session cache: {}", cache.dir().display());
    println!("Type /help for commands.");

    let mut client = Client::new(&args.server, args.name, args.room, cache).await?;
    client.run().await?;

    Ok(())
}
