//! # Uncoverles Room Server
//!
//! This library provides the authoritative server for Uncoverles, a party game
//! in which players share a medical case, discuss it, and vote each other out
//! until a handful of finalists remain. The server owns every room, validates
//! every action, and pushes the resulting room state to the players in it.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Rooms
//! Each room is a strict phase machine:
//!
//! ```text
//! LOBBY -> ROLE_ASSIGNMENT -> DISCUSSION <-> VOTING -> FINAL_ROUND -> VOTING_FINAL -> RESULTS
//! ```
//!
//! Clients never decide anything. They send intents, the room applies them
//! or rejects them, and every client conforms to the room snapshot it gets
//! back.
//!
//! ### Connection Management
//! Handles the lifecycle of client connections:
//! - Version handshake and connection id assignment
//! - Idle timeouts and per-address connection throttling
//! - Seat holding for players who drop mid-game and come back
//!
//! ### State Broadcasting
//! After every successful mutation the full room is sent to each connected
//! player. Until the game ends, a player only sees their own secret role.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Event Loop
//! Socket reads happen in per-connection tasks, but every decoded packet is
//! handed to one event loop that owns all rooms. Actions in a room are
//! therefore applied one at a time in arrival order, with no locks.
//!
//! ### TCP With Length-Prefixed Frames
//! Room actions must not be lost or reordered, so each client holds one TCP
//! connection carrying `[u32 length][bincode Packet]` frames.
//!
//! ## Module Organization
//!
//! - `game`: the per-room phase machine and scoring
//! - `tally`: vote counting with an explicit tie-break policy
//! - `assignment`: role buckets and disease draw
//! - `registry`: room codes and player membership
//! - `broadcast`: per-recipient room projection and delivery
//! - `gateway`: packet routing and error reporting
//! - `client_manager`: connection pool and throttling
//! - `network`: sockets and the event loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new(ServerConfig::default()).await?;
//!
//!     // Accepts connections, routes packets to rooms and expires
//!     // idle connections until the process is stopped.
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod assignment;
pub mod broadcast;
pub mod client_manager;
pub mod config;
pub mod error;
pub mod game;
pub mod gateway;
pub mod network;
pub mod registry;
pub mod tally;
