// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Numeric constants shared across the mapping, binder, and writer.

/// Minimum raw value reported for a thumbstick axis.
pub const STICK_MIN: i32 = -32768;
/// Maximum raw value reported for a thumbstick axis.
pub const STICK_MAX: i32 = 32767;
/// Minimum raw value reported for a trigger.
pub const TRIGGER_MIN: i32 = 0;
/// Maximum raw value reported for a trigger.
pub const TRIGGER_MAX: i32 = 255;
/// Raw trigger value above which the trigger is considered "pressed" when bound to a button.
pub const TRIGGER_BUTTON_THRESHOLD: i32 = 30;
/// Neutral (rest) raw value for a stick or trigger.
pub const NEUTRAL: i32 = 0;

/// Default axis output range, lower bound.
pub const DEFAULT_RANGE_MIN: i32 = -32768;
/// Default axis output range, upper bound.
pub const DEFAULT_RANGE_MAX: i32 = 32767;

/// Minimum logical deadzone value (fixed point, out of [`SAT_MAX`]).
pub const DZ_MIN: u32 = 0;
/// Maximum logical deadzone value (fixed point, out of [`SAT_MAX`]).
pub const DZ_MAX: u32 = 10_000;
/// Minimum logical saturation value (fixed point, out of [`SAT_MAX`]).
pub const SAT_MIN: u32 = 0;
/// Maximum logical saturation value (fixed point); also the scale all percentages are out of.
pub const SAT_MAX: u32 = 10_000;

/// Byte size of the packet a caller may request, in bytes.
pub const MAX_PACKET: u32 = 1024;

/// Byte width of a bound axis or POV slot.
pub const AXIS_SIZE: u32 = 4;
/// Byte width of a bound POV slot.
pub const POV_SIZE: u32 = 4;
/// Byte width of a bound button slot.
pub const BUTTON_SIZE: u32 = 1;

/// Hundredths-of-a-degree POV angles for the eight compass points.
pub const POV_NORTH: i32 = 0;
pub const POV_NORTHEAST: i32 = 4500;
pub const POV_EAST: i32 = 9000;
pub const POV_SOUTHEAST: i32 = 13500;
pub const POV_SOUTH: i32 = 18000;
pub const POV_SOUTHWEST: i32 = 22500;
pub const POV_WEST: i32 = 27000;
pub const POV_NORTHWEST: i32 = 31500;

/// Sentinel value for a centred POV, stored as an `i32` bit pattern of `u32::MAX`.
pub const POV_CENTERED: i32 = -1;

/// Byte offset sentinel meaning "this object has no slot in the caller's data format".
pub const OFFSET_UNUSED: u32 = 0xFFFF_FFFF;

/// Value written for a pressed digital button.
pub const BUTTON_PRESSED: u8 = 0x80;
/// Value written for a released digital button.
pub const BUTTON_RELEASED: u8 = 0x00;

/// `button_bits` bit positions, matching the host XInput API's `XINPUT_GAMEPAD_*` constants.
pub const BIT_DPAD_UP: u16 = 0x0001;
pub const BIT_DPAD_DOWN: u16 = 0x0002;
pub const BIT_DPAD_LEFT: u16 = 0x0004;
pub const BIT_DPAD_RIGHT: u16 = 0x0008;
pub const BIT_START: u16 = 0x0010;
pub const BIT_BACK: u16 = 0x0020;
pub const BIT_LEFT_THUMB: u16 = 0x0040;
pub const BIT_RIGHT_THUMB: u16 = 0x0080;
pub const BIT_LB: u16 = 0x0100;
pub const BIT_RB: u16 = 0x0200;
pub const BIT_A: u16 = 0x1000;
pub const BIT_B: u16 = 0x2000;
pub const BIT_X: u16 = 0x4000;
pub const BIT_Y: u16 = 0x8000;
