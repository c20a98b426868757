//! # Uncoverles Terminal Client
//!
//! This library provides the client side of Uncoverles: a line-based terminal
//! front end that talks to the room server, keeps a local view of the room,
//! and remembers enough about the current game to rejoin it after a restart.
//!
//! ## Architecture Overview
//!
//! ### Optimistic Actions
//! Votes, answers and final answers are shown as soon as they are typed.
//! They live in an overlay on top of the last room snapshot from the server
//! and never touch the snapshot itself.
//!
//! ### Server Reconciliation
//! Every `RoomUpdated` goes through `game::reconcile`, which installs the
//! server's room and throws the overlay away. Whatever the server accepted is
//! in the snapshot; whatever it refused is gone with the overlay.
//!
//! ### Vote Resends
//! A vote that has not shown up in the room after two seconds is sent again,
//! at most three times. The server rejects duplicates, so a late resend is
//! harmless.
//!
//! ### Session Cache
//! The room, the local player and the last results are stored as JSON. On
//! start the client rejoins the cached room by name, and the server hands the
//! held seat back if the game is still running.
//!
//! ## Module Organization
//!
//! - `network`: TCP connection, handshake and the main event loop
//! - `game`: confirmed room, overlay and reconciliation
//! - `resend`: unconfirmed vote tracking
//! - `storage`: JSON session cache
//! - `input`: command parsing
//! - `rendering`: plain-text output
//! - `error`: client error type
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//! use client::storage::{default_cache_dir, SessionCache};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = SessionCache::new(default_cache_dir());
//!     let mut client = Client::new("127.0.0.1:8080", "Alice".to_string(), None, cache).await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod resend;
pub mod storage;
