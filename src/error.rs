use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal decoding conditions. Truncation at a block boundary is not an
/// error (the stream just ends); truncation anywhere else is, because
/// the block length is authoritative.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("demo stream i/o: {0}")]
	Io(#[from] io::Error),

	#[error("block ended in the middle of a read")]
	TruncatedBlock,

	#[error("invalid block length: {0}")]
	InvalidBlockLength(i32),

	#[error("invalid opcode in message loop: {0}")]
	InvalidMessageCode(u8),

	#[error("invalid opcode in gamestate loop: {0}")]
	InvalidGamestateCode(u8),

	#[error("delta field count {0} exceeds the field table")]
	InvalidFieldCount(usize),

	#[error("configstring fragment index out of range: {0}")]
	InvalidConfigFragment(u8),
}
