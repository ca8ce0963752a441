use std::collections::HashMap;

use serde::Serialize;

use super::entity::Entity;
use super::error::{Error, Result};
use super::player::Player;

/// Cumulative view of the session implied by the delta stream: the
/// latest player record, the live entities, the per-entity baselines
/// established during the gamestate, and the configstring table.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DemoState {
	pub player: Player,
	pub entities: HashMap<u16, Entity>,
	pub baselines: HashMap<u16, Entity>,
	pub config: HashMap<u16, String>,
	fragments: HashMap<u16, String>,
}

impl DemoState {
	pub fn new() -> DemoState {
		DemoState::default()
	}

	pub fn on_baseline_config(&mut self, id: u16, string: String) {
		self.config.insert(id, string);
	}

	/// Baselines are written once, during the gamestate, and retained
	/// for the rest of the session; the live entity starts as a copy.
	pub fn on_baseline_entity(&mut self, id: u16, entity: Entity) {
		self.entities.insert(id, entity.clone());
		self.baselines.insert(id, entity);
	}

	pub fn on_entity_removed(&mut self, id: u16) {
		self.entities.remove(&id);
	}

	/// Prepares `entities[id]` to receive a delta: a zeroed record when
	/// the id is new, reset to a copy of its baseline when one exists.
	pub fn on_entity_update(&mut self, id: u16) -> &mut Entity {
		let entity = self.entities.entry(id).or_default();
		if let Some(baseline) = self.baselines.get(&id) {
			*entity = baseline.clone();
		}
		entity
	}

	/// Applies the configstring side effects of a reliable server
	/// command. `cs` commits a whole string; `bcs0`..`bcs3` carry one
	/// broadcast in fragments, committed by fragment 3. Commands that
	/// match neither pattern are left to the consumer.
	pub fn on_server_command(&mut self, command: &str) -> Result<()> {
		match match_config_command(command) {
			Some(ConfigCommand::Commit { key, value }) => {
				self.config.insert(key, value.to_string());
			}
			Some(ConfigCommand::Fragment { index, key, value }) => {
				if index > 3 {
					return Err(Error::InvalidConfigFragment(index));
				}
				if index == 0 {
					self.fragments.insert(key, value.to_string());
				} else {
					self.fragments.entry(key).or_default().push_str(value);
				}
				if index == 3 {
					if let Some(string) = self.fragments.remove(&key) {
						self.config.insert(key, string);
					}
				}
			}
			None => {}
		}
		Ok(())
	}
}

enum ConfigCommand<'a> {
	Commit { key: u16, value: &'a str },
	Fragment { index: u8, key: u16, value: &'a str },
}

/// Scans the command for a configstring update, one candidate per
/// line. Text after the closing quote is ignored; the quoted payload
/// may span lines. `cs` wins over `bcs` wherever both appear.
fn match_config_command(command: &str) -> Option<ConfigCommand<'_>> {
	for start in line_starts(command) {
		if let Some((key, value)) = match_cs(&command[start..]) {
			return Some(ConfigCommand::Commit { key, value });
		}
	}
	for start in line_starts(command) {
		if let Some((index, key, value)) = match_bcs(&command[start..]) {
			return Some(ConfigCommand::Fragment { index, key, value });
		}
	}
	None
}

fn line_starts(s: &str) -> impl Iterator<Item = usize> + '_ {
	std::iter::once(0).chain(s.match_indices('\n').map(|(i, _)| i + 1))
}

/// `cs <key> "<value>"`; the value may be empty.
fn match_cs(s: &str) -> Option<(u16, &str)> {
	let s = s.strip_prefix("cs ")?;
	let (key, s) = split_number(s)?;
	let s = s.strip_prefix(" \"")?;
	let end = s.find('"')?;
	Some((key, &s[..end]))
}

/// `bcs<index> <key> "<value>"`; the value must be non-empty.
fn match_bcs(s: &str) -> Option<(u8, u16, &str)> {
	let s = s.strip_prefix("bcs")?;
	let index = match s.bytes().next() {
		Some(digit @ b'0'..=b'9') => digit - b'0',
		_ => return None,
	};
	let s = s[1..].strip_prefix(' ')?;
	let (key, s) = split_number(s)?;
	let s = s.strip_prefix(" \"")?;
	let end = s.find('"').filter(|&end| end > 0)?;
	Some((index, key, &s[..end]))
}

fn split_number(s: &str) -> Option<(u16, &str)> {
	let digits = s.bytes().take_while(u8::is_ascii_digit).count();
	if digits == 0 {
		return None;
	}
	let key = s[..digits].parse().ok()?;
	Some((key, &s[digits..]))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn cs_commits_a_configstring() {
		let mut state = DemoState::new();
		state.on_server_command("cs 4 \"duel1\"").unwrap();
		assert_eq!(state.config[&4], "duel1");
	}

	#[test]
	fn cs_value_may_be_empty_and_trailing_text_is_ignored() {
		let mut state = DemoState::new();
		state.on_server_command("cs 9 \"\" extra tokens\n").unwrap();
		assert_eq!(state.config[&9], "");
	}

	#[test]
	fn cs_matches_on_a_later_line() {
		let mut state = DemoState::new();
		state
			.on_server_command("print \"hello\"\ncs 12 \"\\capturelimit\\8\"")
			.unwrap();
		assert_eq!(state.config[&12], "\\capturelimit\\8");
	}

	#[test]
	fn chat_commands_touch_nothing() {
		let mut state = DemoState::new();
		state.on_server_command("chat \"player: cs is a nice command\"").unwrap();
		assert!(state.config.is_empty());
		assert!(state.fragments.is_empty());
	}

	#[test]
	fn bcs_fragments_assemble_and_commit() {
		let mut state = DemoState::new();
		state.on_server_command("bcs0 672 \"aaa\"").unwrap();
		state.on_server_command("bcs1 672 \"bbb\"").unwrap();
		state.on_server_command("bcs2 672 \"ccc\"").unwrap();
		assert!(!state.config.contains_key(&672));
		state.on_server_command("bcs3 672 \"ddd\"").unwrap();
		assert_eq!(state.config[&672], "aaabbbcccddd");
		assert!(!state.fragments.contains_key(&672));
	}

	#[test]
	fn bcs_zero_restarts_the_buffer() {
		let mut state = DemoState::new();
		state.on_server_command("bcs0 7 \"old\"").unwrap();
		state.on_server_command("bcs0 7 \"new\"").unwrap();
		state.on_server_command("bcs3 7 \"!\"").unwrap();
		assert_eq!(state.config[&7], "new!");
	}

	#[test]
	fn bcs_index_past_three_is_fatal_and_mutates_nothing() {
		let mut state = DemoState::new();
		state.on_server_command("bcs0 7 \"abc\"").unwrap();
		let err = state.on_server_command("bcs4 7 \"def\"").unwrap_err();
		assert!(matches!(err, Error::InvalidConfigFragment(4)));
		assert_eq!(state.fragments[&7], "abc");
	}

	#[test]
	fn update_of_a_new_entity_starts_from_zero() {
		let mut state = DemoState::new();
		let entity = state.on_entity_update(30);
		assert_eq!(*entity, Entity::default());
	}

	#[test]
	fn update_of_a_baselined_entity_starts_from_a_copy() {
		let mut state = DemoState::new();
		let baseline = Entity { entity_type: 2, weapon: 8, ..Entity::default() };
		state.on_baseline_entity(7, baseline.clone());

		state.entities.get_mut(&7).unwrap().weapon = 1;
		let entity = state.on_entity_update(7);
		assert_eq!(*entity, baseline);
		assert_eq!(state.baselines[&7], baseline);
	}

	#[test]
	fn removal_keeps_the_baseline() {
		let mut state = DemoState::new();
		state.on_baseline_entity(7, Entity::default());
		state.on_entity_removed(7);
		assert!(!state.entities.contains_key(&7));
		assert!(state.baselines.contains_key(&7));
	}
}
