use serde::Serialize;

/// Opening synchronization of a session: delivered after the
/// configstrings and entity baselines have been folded into the demo
/// state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Gamestate {
	pub sequence: i32,
	pub client: i32,
	pub checksum: i32,
}

/// A reliable server command string (chat lines, configstring updates,
/// scores, ...). Configstring side effects have already been applied
/// when this is emitted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServerCommand {
	pub sequence: i32,
	pub command: String,
}

/// One server frame. The player and entity deltas it carried are in
/// the demo state by the time this is emitted; the area mask is passed
/// through opaque.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
	pub server_time: i32,
	pub delta: u8,
	pub flags: u8,
	pub areamask: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Event {
	Gamestate(Gamestate),
	ServerCommand(ServerCommand),
	Snapshot(Snapshot),
}
