use super::data::DataReader;
use super::entity::{Entity, GENTITYNUM_BITS};
use super::error::{Error, Result};
use super::player::Player;

/// How one slot of an entity delta comes off the wire, bound to its
/// destination field. Entity values are presence-wrapped: a zero bit
/// in front of each stands for the zero value.
#[derive(Clone, Copy)]
enum EntityField {
	Bits(u32, fn(&mut Entity) -> &mut i32),
	Byte(fn(&mut Entity) -> &mut i32),
	Short(fn(&mut Entity) -> &mut i32),
	Int(fn(&mut Entity) -> &mut i32),
	Float(fn(&mut Entity) -> &mut f32),
}

/// Wire order of entity fields. The slot order is the protocol
/// contract; it is not derivable from the field names.
const ENTITY_FIELDS: [EntityField; 53] = [
	EntityField::Int(|e| &mut e.pos.time),
	EntityField::Float(|e| &mut e.pos.base.x),
	EntityField::Float(|e| &mut e.pos.base.y),
	EntityField::Float(|e| &mut e.pos.delta.x),
	EntityField::Float(|e| &mut e.pos.delta.y),
	EntityField::Float(|e| &mut e.pos.base.z),
	EntityField::Float(|e| &mut e.apos.base.y),
	EntityField::Float(|e| &mut e.pos.delta.z),
	EntityField::Float(|e| &mut e.apos.base.x),
	EntityField::Int(|e| &mut e.pos.gravity),
	EntityField::Bits(GENTITYNUM_BITS, |e| &mut e.event),
	EntityField::Float(|e| &mut e.angles2.y),
	EntityField::Byte(|e| &mut e.entity_type),
	EntityField::Byte(|e| &mut e.torso_anim),
	EntityField::Byte(|e| &mut e.event_parm),
	EntityField::Byte(|e| &mut e.legs_anim),
	EntityField::Bits(GENTITYNUM_BITS, |e| &mut e.ground_entity),
	EntityField::Byte(|e| &mut e.pos.mode),
	EntityField::Bits(19, |e| &mut e.flags),
	EntityField::Bits(GENTITYNUM_BITS, |e| &mut e.other_entity),
	EntityField::Byte(|e| &mut e.weapon),
	EntityField::Byte(|e| &mut e.client),
	EntityField::Float(|e| &mut e.angles.y),
	EntityField::Int(|e| &mut e.pos.duration),
	EntityField::Byte(|e| &mut e.apos.mode),
	EntityField::Float(|e| &mut e.origin.x),
	EntityField::Float(|e| &mut e.origin.y),
	EntityField::Float(|e| &mut e.origin.z),
	EntityField::Bits(24, |e| &mut e.solid),
	EntityField::Short(|e| &mut e.powerups),
	EntityField::Byte(|e| &mut e.model),
	EntityField::Bits(GENTITYNUM_BITS, |e| &mut e.other_entity2),
	EntityField::Byte(|e| &mut e.loop_sound),
	EntityField::Byte(|e| &mut e.constant_light),
	EntityField::Float(|e| &mut e.origin2.z),
	EntityField::Float(|e| &mut e.origin2.x),
	EntityField::Float(|e| &mut e.origin2.y),
	EntityField::Byte(|e| &mut e.model2),
	EntityField::Float(|e| &mut e.angles.x),
	EntityField::Int(|e| &mut e.time),
	EntityField::Int(|e| &mut e.apos.time),
	EntityField::Int(|e| &mut e.apos.duration),
	EntityField::Float(|e| &mut e.apos.base.z),
	EntityField::Float(|e| &mut e.apos.delta.x),
	EntityField::Float(|e| &mut e.apos.delta.y),
	EntityField::Float(|e| &mut e.apos.delta.z),
	EntityField::Int(|e| &mut e.apos.gravity),
	EntityField::Int(|e| &mut e.time2),
	EntityField::Float(|e| &mut e.angles.z),
	EntityField::Float(|e| &mut e.angles2.x),
	EntityField::Float(|e| &mut e.angles2.z),
	EntityField::Int(|e| &mut e.generic1),
	EntityField::Short(|e| &mut e.frame),
];

/// Player fields are read directly, without the per-value presence
/// bit entity fields carry.
#[derive(Clone, Copy)]
enum PlayerField {
	Bits(u32, fn(&mut Player) -> &mut i32),
	Byte(fn(&mut Player) -> &mut i32),
	SignedByte(fn(&mut Player) -> &mut i32),
	Short(fn(&mut Player) -> &mut i32),
	SignedShort(fn(&mut Player) -> &mut i32),
	Int(fn(&mut Player) -> &mut i32),
	Float(fn(&mut Player) -> &mut f32),
}

const PLAYER_FIELDS: [PlayerField; 48] = [
	PlayerField::Int(|p| &mut p.command_time),
	PlayerField::Float(|p| &mut p.origin.x),
	PlayerField::Float(|p| &mut p.origin.y),
	PlayerField::Byte(|p| &mut p.bob_cycle),
	PlayerField::Float(|p| &mut p.velocity.x),
	PlayerField::Float(|p| &mut p.velocity.y),
	PlayerField::Float(|p| &mut p.view_angles.y),
	PlayerField::Float(|p| &mut p.view_angles.x),
	PlayerField::SignedShort(|p| &mut p.weapon_time),
	PlayerField::Float(|p| &mut p.origin.z),
	PlayerField::Float(|p| &mut p.velocity.z),
	PlayerField::Byte(|p| &mut p.legs_timer),
	PlayerField::SignedShort(|p| &mut p.pm_time),
	PlayerField::Short(|p| &mut p.event_sequence),
	PlayerField::Byte(|p| &mut p.torso_anim),
	PlayerField::Bits(4, |p| &mut p.movement_dir),
	PlayerField::Byte(|p| &mut p.events[0]),
	PlayerField::Byte(|p| &mut p.legs_anim),
	PlayerField::Byte(|p| &mut p.events[1]),
	PlayerField::Short(|p| &mut p.pm_flags),
	PlayerField::Bits(GENTITYNUM_BITS, |p| &mut p.ground_entity),
	PlayerField::Bits(4, |p| &mut p.weapon_state),
	PlayerField::Short(|p| &mut p.flags),
	PlayerField::Bits(GENTITYNUM_BITS, |p| &mut p.external_event),
	PlayerField::Short(|p| &mut p.gravity),
	PlayerField::Short(|p| &mut p.speed),
	PlayerField::Short(|p| &mut p.delta_angles[1]),
	PlayerField::Byte(|p| &mut p.external_event_parm),
	PlayerField::SignedByte(|p| &mut p.view_height),
	PlayerField::Byte(|p| &mut p.damage_event),
	PlayerField::Byte(|p| &mut p.damage_yaw),
	PlayerField::Byte(|p| &mut p.damage_pitch),
	PlayerField::Byte(|p| &mut p.damage_count),
	PlayerField::Byte(|p| &mut p.generic1),
	PlayerField::Byte(|p| &mut p.pm_type),
	PlayerField::Short(|p| &mut p.delta_angles[0]),
	PlayerField::Short(|p| &mut p.delta_angles[2]),
	PlayerField::Bits(12, |p| &mut p.torso_timer),
	PlayerField::Byte(|p| &mut p.event_parms[0]),
	PlayerField::Byte(|p| &mut p.event_parms[1]),
	PlayerField::Byte(|p| &mut p.client),
	PlayerField::Bits(5, |p| &mut p.weapon),
	PlayerField::Float(|p| &mut p.view_angles.z),
	PlayerField::Float(|p| &mut p.grapple_point.x),
	PlayerField::Float(|p| &mut p.grapple_point.y),
	PlayerField::Float(|p| &mut p.grapple_point.z),
	PlayerField::Bits(GENTITYNUM_BITS, |p| &mut p.jumppad_entity),
	PlayerField::Short(|p| &mut p.loop_sound),
];

/// Value width of one 16-slot stat group.
#[derive(Clone, Copy)]
enum Group {
	Short,
	SignedShort,
	Int,
}

fn read_optional<T: Default>(
	r: &mut DataReader,
	read: impl FnOnce(&mut DataReader) -> Result<T>,
) -> Result<T> {
	if r.read_bit()? == 0 { Ok(T::default()) } else { read(r) }
}

/// A 16-slot bitmap group: absent entirely when the presence bit is
/// clear, otherwise a 16-bit mask selects the slots that follow, in
/// ascending order.
fn read_group(r: &mut DataReader, dest: &mut [i32; 16], group: Group) -> Result<()> {
	if r.read_bit()? == 0 {
		return Ok(());
	}
	let mask = r.read_short()?;
	for (slot, value) in dest.iter_mut().enumerate() {
		if mask & (1 << slot) == 0 {
			continue;
		}
		*value = match group {
			Group::Short => r.read_short()? as i32,
			Group::SignedShort => r.read_signed_short()? as i32,
			Group::Int => r.read_int()?,
		};
	}
	Ok(())
}

/// Applies one entity delta to `entity`. A clear leading bit means the
/// record is unchanged; otherwise a count byte bounds the slots this
/// delta may touch, and untouched slots keep their current value.
pub fn read_entity(r: &mut DataReader, entity: &mut Entity) -> Result<()> {
	if r.read_bit()? == 0 {
		return Ok(());
	}
	let count = r.read_byte()? as usize;
	if count > ENTITY_FIELDS.len() {
		return Err(Error::InvalidFieldCount(count));
	}
	for field in &ENTITY_FIELDS[..count] {
		if r.read_bit()? == 0 {
			continue;
		}
		match *field {
			EntityField::Bits(width, dest) => {
				*dest(entity) = read_optional(r, |r| r.read_bits(width))? as i32
			}
			EntityField::Byte(dest) => {
				*dest(entity) = read_optional(r, DataReader::read_byte)? as i32
			}
			EntityField::Short(dest) => {
				*dest(entity) = read_optional(r, DataReader::read_short)? as i32
			}
			EntityField::Int(dest) => *dest(entity) = read_optional(r, DataReader::read_int)?,
			EntityField::Float(dest) => *dest(entity) = read_optional(r, DataReader::read_float)?,
		}
	}
	Ok(())
}

/// Applies one player delta to `player`: a count byte, per-slot
/// presence bits, then an optional trailing section of four stat
/// groups (stats, persistant, ammo, powerups).
pub fn read_player(r: &mut DataReader, player: &mut Player) -> Result<()> {
	let count = r.read_byte()? as usize;
	if count > PLAYER_FIELDS.len() {
		return Err(Error::InvalidFieldCount(count));
	}
	for field in &PLAYER_FIELDS[..count] {
		if r.read_bit()? == 0 {
			continue;
		}
		match *field {
			PlayerField::Bits(width, dest) => *dest(player) = r.read_bits(width)? as i32,
			PlayerField::Byte(dest) => *dest(player) = r.read_byte()? as i32,
			PlayerField::SignedByte(dest) => *dest(player) = r.read_signed_byte()? as i32,
			PlayerField::Short(dest) => *dest(player) = r.read_short()? as i32,
			PlayerField::SignedShort(dest) => *dest(player) = r.read_signed_short()? as i32,
			PlayerField::Int(dest) => *dest(player) = r.read_int()?,
			PlayerField::Float(dest) => *dest(player) = r.read_float()?,
		}
	}
	if r.read_bit()? == 1 {
		read_group(r, &mut player.stats, Group::SignedShort)?;
		read_group(r, &mut player.persistant, Group::Short)?;
		read_group(r, &mut player.ammo, Group::SignedShort)?;
		read_group(r, &mut player.powerups, Group::Int)?;
	}
	Ok(())
}
