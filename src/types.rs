// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Core enumerations and the range-remap primitive that everything else is built on.

use vec_map::VecMap;

/// One of the physical elements a modern "XInput" pad reports: four face buttons, two
/// shoulder/bumper buttons, two stick-click buttons, back/start, the d-pad, two sticks (each
/// with a horizontal and vertical axis), and two triggers.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EPhysElem {
    ButtonA,
    ButtonB,
    ButtonX,
    ButtonY,
    ButtonLB,
    ButtonRB,
    ButtonBack,
    ButtonStart,
    ButtonLeftStick,
    ButtonRightStick,
    Dpad,
    StickLeftH,
    StickLeftV,
    StickRightH,
    StickRightV,
    TriggerLT,
    TriggerRT,
}

impl EPhysElem {
    /// All physical elements, in a stable order used for iteration and event ordering.
    pub const ALL: [EPhysElem; 17] = [
        EPhysElem::ButtonA,
        EPhysElem::ButtonB,
        EPhysElem::ButtonX,
        EPhysElem::ButtonY,
        EPhysElem::ButtonLB,
        EPhysElem::ButtonRB,
        EPhysElem::ButtonBack,
        EPhysElem::ButtonStart,
        EPhysElem::ButtonLeftStick,
        EPhysElem::ButtonRightStick,
        EPhysElem::Dpad,
        EPhysElem::StickLeftH,
        EPhysElem::StickLeftV,
        EPhysElem::StickRightH,
        EPhysElem::StickRightV,
        EPhysElem::TriggerLT,
        EPhysElem::TriggerRT,
    ];

    pub fn is_trigger(self) -> bool {
        matches!(self, EPhysElem::TriggerLT | EPhysElem::TriggerRT)
    }

    pub fn is_vertical_stick(self) -> bool {
        matches!(self, EPhysElem::StickLeftV | EPhysElem::StickRightV)
    }

    pub fn is_horizontal_stick(self) -> bool {
        matches!(self, EPhysElem::StickLeftH | EPhysElem::StickRightH)
    }

    /// The `button_bits` bit this element reads from, if it is a digital button.
    pub fn button_bit(self) -> Option<u16> {
        use crate::constants::*;
        match self {
            EPhysElem::ButtonA => Some(BIT_A),
            EPhysElem::ButtonB => Some(BIT_B),
            EPhysElem::ButtonX => Some(BIT_X),
            EPhysElem::ButtonY => Some(BIT_Y),
            EPhysElem::ButtonLB => Some(BIT_LB),
            EPhysElem::ButtonRB => Some(BIT_RB),
            EPhysElem::ButtonBack => Some(BIT_BACK),
            EPhysElem::ButtonStart => Some(BIT_START),
            EPhysElem::ButtonLeftStick => Some(BIT_LEFT_THUMB),
            EPhysElem::ButtonRightStick => Some(BIT_RIGHT_THUMB),
            _ => None,
        }
    }
}

/// Which of the three virtual-object families a [`VId`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EVKind {
    Axis,
    Button,
    Pov,
}

impl EVKind {
    pub(crate) fn byte_size(self) -> u32 {
        match self {
            EVKind::Axis => crate::constants::AXIS_SIZE,
            EVKind::Button => crate::constants::BUTTON_SIZE,
            EVKind::Pov => crate::constants::POV_SIZE,
        }
    }
}

/// Semantic identity carried by a virtual axis, independent of which physical stick or
/// trigger feeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisIdentity {
    X,
    Y,
    Z,
    RotX,
    RotY,
    RotZ,
}

impl AxisIdentity {
    /// The name the legacy API reports for an axis with this identity (see `enumerateObjects`).
    pub fn name(self) -> &'static str {
        match self {
            AxisIdentity::X => "X Axis",
            AxisIdentity::Y => "Y Axis",
            AxisIdentity::Z => "Z Axis",
            AxisIdentity::RotX => "RotX Axis",
            AxisIdentity::RotY => "RotY Axis",
            AxisIdentity::RotZ => "RotZ Axis",
        }
    }
}

/// Identifier of an abstract axis, button, or POV exposed by the mapping profile.
///
/// `index` is the dense, zero-based position within its `kind`. [`VId::ABSENT`] is the sentinel
/// used whenever a physical element maps to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VId {
    pub kind: EVKind,
    pub index: u16,
}

impl VId {
    pub fn new(kind: EVKind, index: u16) -> Self {
        VId { kind, index }
    }

    pub fn axis(index: u16) -> Self {
        VId::new(EVKind::Axis, index)
    }

    pub fn button(index: u16) -> Self {
        VId::new(EVKind::Button, index)
    }

    pub fn pov(index: u16) -> Self {
        VId::new(EVKind::Pov, index)
    }
}

/// Linear remap that preserves endpoints: `remap(a0, ..) == b0` and `remap(a1, ..) == b1`.
/// Either side may have the smaller endpoint. The intermediate product is carried in a 64-bit
/// accumulator because it ranges up to `2^31 * 2^16`, far past what `i32` can hold.
pub fn remap(v: i32, a0: i32, a1: i32, b0: i32, b1: i32) -> i32 {
    if a0 == a1 {
        return b0;
    }
    let v = v as i64;
    let a0 = a0 as i64;
    let a1 = a1 as i64;
    let b0 = b0 as i64;
    let b1 = b1 as i64;
    let num = (v - a0) * (b1 - b0);
    let den = a1 - a0;
    (b0 + num / den) as i32
}

/// Flips `v` about the midpoint of `[lo, hi]`: `invert(invert(v, lo, hi), lo, hi) == v`.
pub fn invert(v: i32, lo: i32, hi: i32) -> i32 {
    lo + hi - v
}

/// The full mapped state of a virtual controller at one instant: one entry per axis, button,
/// and POV the active profile exposes. Two `SState`s compare equal iff every axis, button, and
/// POV value matches, which is exactly the "did anything really change" test §4.7 needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SState {
    pub axis: VecMap<i32>,
    pub button: VecMap<bool>,
    pub pov: VecMap<i32>,
}

impl SState {
    pub fn new() -> Self {
        SState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn remap_preserves_endpoints() {
        assert_eq!(remap(STICK_MIN, STICK_MIN, STICK_MAX, 0, 100), 0);
        assert_eq!(remap(STICK_MAX, STICK_MIN, STICK_MAX, 0, 100), 100);
    }

    #[test]
    fn remap_is_direction_agnostic() {
        // Same endpoints, but swapped on the output side.
        assert_eq!(remap(STICK_MIN, STICK_MIN, STICK_MAX, 100, 0), 100);
        assert_eq!(remap(STICK_MAX, STICK_MIN, STICK_MAX, 100, 0), 0);
    }

    #[test]
    fn remap_does_not_overflow() {
        // Worst case product magnitude: (2^16) * (2^16), well past i32::MAX.
        let v = remap(i32::MIN / 2, i32::MIN, i32::MAX, i32::MIN, i32::MAX);
        assert!(v < 0);
    }

    #[test]
    fn invert_round_trips() {
        for v in [-32768, -1, 0, 1, 32767] {
            assert_eq!(invert(invert(v, -32768, 32767), -32768, 32767), v);
        }
    }
}
