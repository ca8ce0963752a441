//! Parser for Quake Live demo files (`.dm_73`, `.dm_90`, `.dm_91`).
//!
//! A demo is the byte-accurate recording of the server-to-client
//! message stream for one session: length-prefixed blocks of
//! Huffman-coded, bit-packed messages carrying configstrings, entity
//! baselines, reliable server commands and delta-compressed snapshots.
//!
//! [`DemoReader`] decodes a stream pull-style, yielding one [`Event`]
//! at a time while folding every delta into a [`DemoState`] that can
//! be inspected between events:
//!
//! ```no_run
//! let file = std::fs::File::open("duel.dm_73")?;
//! let mut reader = vadrigar::DemoReader::new(std::io::BufReader::new(file));
//! while let Some(event) = reader.next_event()? {
//!     if let vadrigar::Event::Snapshot(snapshot) = event {
//!         println!("{}: {:?}", snapshot.server_time, reader.state().player.origin);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`parse`] drives the same machinery through per-event callbacks.

pub mod bits;
pub mod data;
pub mod delta;
pub mod entity;
pub mod error;
pub mod game;
pub mod huffman;
pub mod parse;
pub mod player;
pub mod state;

pub use entity::Entity;
pub use error::{Error, Result};
pub use game::Event;
pub use parse::{DemoReader, Handlers, parse};
pub use player::Player;
pub use state::DemoState;
