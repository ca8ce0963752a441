use serde::Serialize;

use super::entity::Vector;

/// A client's full per-frame state: movement, view, weapon and damage
/// feedback, plus the four 16-slot stat tables (stats, persistant
/// counters, ammo, powerup timers).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Player {
	pub ammo: [i32; 16],
	pub bob_cycle: i32,
	pub client: i32,
	pub command_time: i32,
	pub damage_count: i32,
	pub damage_event: i32,
	pub damage_pitch: i32,
	pub damage_yaw: i32,
	pub delta_angles: [i32; 3],
	pub event_parms: [i32; 2],
	pub event_sequence: i32,
	pub events: [i32; 2],
	pub external_event: i32,
	pub external_event_parm: i32,
	pub flags: i32,
	pub generic1: i32,
	pub grapple_point: Vector,
	pub gravity: i32,
	pub ground_entity: i32,
	pub jumppad_entity: i32,
	pub legs_anim: i32,
	pub legs_timer: i32,
	pub loop_sound: i32,
	pub movement_dir: i32,
	pub origin: Vector,
	pub persistant: [i32; 16],
	pub pm_flags: i32,
	pub pm_time: i32,
	pub pm_type: i32,
	pub powerups: [i32; 16],
	pub speed: i32,
	pub stats: [i32; 16],
	pub torso_anim: i32,
	pub torso_timer: i32,
	pub velocity: Vector,
	pub view_angles: Vector,
	pub view_height: i32,
	pub weapon: i32,
	pub weapon_state: i32,
	pub weapon_time: i32,
}
