use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace};

use super::data::DataReader;
use super::delta;
use super::entity::{ENTITYNUM_NONE, Entity, GENTITYNUM_BITS};
use super::error::{Error, Result};
use super::game::{Event, Gamestate, ServerCommand, Snapshot};
use super::state::DemoState;

/// Server message opcodes. Codes 3 and 4 are only valid inside the
/// gamestate; anything else unknown (including 6, download, which
/// never appears in demo streams) is fatal, since its payload length
/// cannot be known.
#[derive(Clone, Copy, Debug, PartialEq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
	Nop = 1,
	Gamestate = 2,
	ConfigString = 3,
	Baseline = 4,
	ServerCommand = 5,
	Snapshot = 7,
	Eof = 8,
}

/// Streaming decoder for a demo byte stream.
///
/// Events come back one at a time from [`DemoReader::next_event`]; the
/// shared [`DemoState`] is updated *before* each event is returned, so
/// the state observed between calls is always consistent with the last
/// event. After a fatal error the reader is finished: further calls
/// return `Ok(None)` and the state stays in place for post-mortem
/// inspection.
pub struct DemoReader<R> {
	source: R,
	state: DemoState,
	block: Option<DataReader>,
	nop_count: u64,
	done: bool,
}

enum Step {
	Event(Event),
	EndOfBlock,
}

impl<R: Read> DemoReader<R> {
	pub fn new(source: R) -> DemoReader<R> {
		DemoReader {
			source,
			state: DemoState::new(),
			block: None,
			nop_count: 0,
			done: false,
		}
	}

	pub fn state(&self) -> &DemoState {
		&self.state
	}

	pub fn into_state(self) -> DemoState {
		self.state
	}

	/// Number of no-op messages seen. Opcode 1 carries no payload and
	/// no documented meaning; occurrences are counted rather than
	/// dropped on the floor.
	pub fn nop_count(&self) -> u64 {
		self.nop_count
	}

	pub fn next_event(&mut self) -> Result<Option<Event>> {
		if self.done {
			return Ok(None);
		}
		let result = self.advance();
		if !matches!(result, Ok(Some(_))) {
			self.done = true;
			self.block = None;
		}
		result
	}

	fn advance(&mut self) -> Result<Option<Event>> {
		loop {
			let mut data = match self.block.take() {
				Some(data) => data,
				None => match self.read_block()? {
					Some(data) => data,
					None => return Ok(None),
				},
			};
			match message_step(&mut data, &mut self.state, &mut self.nop_count)? {
				Step::Event(event) => {
					self.block = Some(data);
					return Ok(Some(event));
				}
				Step::EndOfBlock => {}
			}
		}
	}

	/// Reads the next length-prefixed block and the message acknowledge
	/// that opens it. End of stream at the block boundary, or a length
	/// of -1, is the clean end of the demo.
	fn read_block(&mut self) -> Result<Option<DataReader>> {
		let mut header = [0; 4];
		match self.source.read(&mut header)? {
			0 => return Ok(None),
			n => self.source.read_exact(&mut header[n..])?,
		}
		let sequence = i32::from_le_bytes(header);

		let length = self.source.read_i32::<LittleEndian>()?;
		if length == -1 {
			return Ok(None);
		}
		let length = usize::try_from(length).map_err(|_| Error::InvalidBlockLength(length))?;

		let mut block = vec![0; length];
		self.source.read_exact(&mut block)?;
		debug!("block {}: {} bytes", sequence, length);

		let mut data = DataReader::new(block);
		let ack = data.read_int()?;
		trace!("message acknowledge: {}", ack);
		Ok(Some(data))
	}
}

impl<R: Read> Iterator for DemoReader<R> {
	type Item = Result<Event>;

	fn next(&mut self) -> Option<Result<Event>> {
		self.next_event().transpose()
	}
}

fn message_step(data: &mut DataReader, state: &mut DemoState, nop_count: &mut u64) -> Result<Step> {
	loop {
		let code = data.read_byte()?;
		trace!("opcode: {}", code);
		match Opcode::try_from(code) {
			Ok(Opcode::Nop) => *nop_count += 1,
			Ok(Opcode::Gamestate) => {
				let sequence = data.read_int()?;
				let (client, checksum) = read_gamestate(data, state)?;
				return Ok(Step::Event(Event::Gamestate(Gamestate { sequence, client, checksum })));
			}
			Ok(Opcode::ServerCommand) => {
				let sequence = data.read_int()?;
				let command = data.read_string()?;
				state.on_server_command(&command)?;
				return Ok(Step::Event(Event::ServerCommand(ServerCommand { sequence, command })));
			}
			Ok(Opcode::Snapshot) => return Ok(Step::Event(Event::Snapshot(read_snapshot(data, state)?))),
			Ok(Opcode::Eof) => return Ok(Step::EndOfBlock),
			Ok(_) | Err(_) => return Err(Error::InvalidMessageCode(code)),
		}
	}
}

fn read_gamestate(data: &mut DataReader, state: &mut DemoState) -> Result<(i32, i32)> {
	loop {
		let code = data.read_byte()?;
		match Opcode::try_from(code) {
			Ok(Opcode::ConfigString) => {
				let id = data.read_short()?;
				let string = data.read_string()?;
				state.on_baseline_config(id, string);
			}
			Ok(Opcode::Baseline) => {
				let id = data.read_bits(GENTITYNUM_BITS)? as u16;
				let mut entity = Entity::default();
				// A zero bit here means the baseline carries a delta
				// payload; a set bit leaves it at the zero record.
				if data.read_bit()? == 0 {
					delta::read_entity(data, &mut entity)?;
				}
				state.on_baseline_entity(id, entity);
			}
			Ok(Opcode::Eof) => {
				let client = data.read_int()?;
				let checksum = data.read_int()?;
				return Ok((client, checksum));
			}
			Ok(_) | Err(_) => return Err(Error::InvalidGamestateCode(code)),
		}
	}
}

fn read_snapshot(data: &mut DataReader, state: &mut DemoState) -> Result<Snapshot> {
	let server_time = data.read_int()?;
	let delta = data.read_byte()?;
	let flags = data.read_byte()?;
	let len = data.read_byte()?;
	let areamask = data.read_blob(len as usize)?;

	delta::read_player(data, &mut state.player)?;

	loop {
		let id = data.read_bits(GENTITYNUM_BITS)? as u16;
		if id == ENTITYNUM_NONE {
			break;
		}
		if data.read_bit()? == 1 {
			state.on_entity_removed(id);
		} else {
			delta::read_entity(data, state.on_entity_update(id))?;
		}
	}

	trace!("snapshot at {}", server_time);
	Ok(Snapshot { server_time, delta, flags, areamask })
}

/// Per-event callbacks for [`parse`]. Each receives the demo state as
/// already updated for the event it accompanies.
pub trait Handlers {
	fn gamestate(&mut self, _state: &DemoState, _gamestate: Gamestate) -> Result<()> {
		Ok(())
	}
	fn server_command(&mut self, _state: &DemoState, _command: ServerCommand) -> Result<()> {
		Ok(())
	}
	fn snapshot(&mut self, _state: &DemoState, _snapshot: Snapshot) -> Result<()> {
		Ok(())
	}
}

/// Decodes a whole demo from `r`, passing events to the callbacks in
/// `handlers` as they occur. Returns the final accumulated state.
pub fn parse<R: Read, H: Handlers>(r: R, handlers: &mut H) -> Result<DemoState> {
	let mut reader = DemoReader::new(r);
	while let Some(event) = reader.next_event()? {
		match event {
			Event::Gamestate(gamestate) => handlers.gamestate(reader.state(), gamestate)?,
			Event::ServerCommand(command) => handlers.server_command(reader.state(), command)?,
			Event::Snapshot(snapshot) => handlers.snapshot(reader.state(), snapshot)?,
		}
	}
	Ok(reader.into_state())
}
