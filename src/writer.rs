// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The State Writer: turns an `XInputSnapshot` into a mapped `SState`, and an `SState` into the
//! caller's byte buffer per a bound data format.

use crate::constants::*;
use crate::error::CoreError;
use crate::format::DataFormatBinding;
use crate::profile::MappingProfile;
use crate::properties::{self, AxisProperties};
use crate::source::XInputSnapshot;
use crate::types::{self, EPhysElem, EVKind, SState, VId};
use log::error;

/// Computes the full mapped state for one snapshot under `profile` and `properties`.
///
/// This is shared by the immediate path (feeds [`write_buffer`]) and the Virtual Controller's
/// refresh (§4.7), so both observe identical numbers for identical input.
pub fn compute_state(profile: &MappingProfile, properties: &mut AxisProperties, snapshot: &XInputSnapshot) -> Result<SState, CoreError> {
    let mut state = SState::new();

    write_triggers(profile, properties, snapshot, &mut state)?;
    write_stick(profile, properties, EPhysElem::StickLeftH, snapshot.lx as i32, &mut state)?;
    write_stick(profile, properties, EPhysElem::StickLeftV, snapshot.ly as i32, &mut state)?;
    write_stick(profile, properties, EPhysElem::StickRightH, snapshot.rx as i32, &mut state)?;
    write_stick(profile, properties, EPhysElem::StickRightV, snapshot.ry as i32, &mut state)?;
    write_dpad(profile, snapshot, &mut state)?;
    write_buttons(profile, snapshot, &mut state)?;

    Ok(state)
}

fn write_triggers(profile: &MappingProfile, properties: &mut AxisProperties, snapshot: &XInputSnapshot, state: &mut SState) -> Result<(), CoreError> {
    let v_lt = profile.virt(EPhysElem::TriggerLT);
    let v_rt = profile.virt(EPhysElem::TriggerRT);

    if let (Some(lt), Some(rt)) = (v_lt, v_rt) {
        if lt == rt {
            if lt.kind != EVKind::Axis {
                error!("mapping profile shares a trigger target that is not an axis");
                return Err(CoreError::Generic);
            }
            let m = profile.shared_dir(EPhysElem::TriggerLT).ok_or(CoreError::Generic)?;
            if m != 1 && m != -1 {
                error!("mapping profile shared-trigger direction is not +-1");
                return Err(CoreError::Generic);
            }
            let s = m * snapshot.lt as i32 + (-m) * snapshot.rt as i32;
            let p = properties.get(lt.index);
            let remapped = types::remap(s, -TRIGGER_MAX, TRIGGER_MAX, p.range_min, p.range_max);
            insert_axis(state, lt.index, properties::apply(remapped, p));
            return Ok(());
        }
    }

    write_solo_trigger(profile, properties, EPhysElem::TriggerLT, snapshot.lt as i32, state)?;
    write_solo_trigger(profile, properties, EPhysElem::TriggerRT, snapshot.rt as i32, state)?;
    Ok(())
}

fn write_solo_trigger(profile: &MappingProfile, properties: &mut AxisProperties, phys: EPhysElem, raw: i32, state: &mut SState) -> Result<(), CoreError> {
    let vid = match profile.virt(phys) {
        Some(vid) => vid,
        None => return Ok(()),
    };
    match vid.kind {
        EVKind::Axis => {
            let p = properties.get(vid.index);
            let remapped = types::remap(raw, TRIGGER_MIN, TRIGGER_MAX, p.range_min, p.range_max);
            insert_axis(state, vid.index, properties::apply(remapped, p));
        }
        EVKind::Button => {
            insert_button(state, vid.index, raw > TRIGGER_BUTTON_THRESHOLD);
        }
        EVKind::Pov => {
            error!("mapping profile binds a trigger to a POV");
            return Err(CoreError::Generic);
        }
    }
    Ok(())
}

fn write_stick(profile: &MappingProfile, properties: &mut AxisProperties, phys: EPhysElem, raw: i32, state: &mut SState) -> Result<(), CoreError> {
    let vid = match profile.virt(phys) {
        Some(vid) => vid,
        None => return Ok(()),
    };
    if vid.kind != EVKind::Axis {
        error!("mapping profile binds a stick to a non-axis object");
        return Err(CoreError::Generic);
    }
    let raw = if phys.is_vertical_stick() { types::invert(raw, STICK_MIN, STICK_MAX) } else { raw };
    let p = properties.get(vid.index);
    let remapped = types::remap(raw, STICK_MIN, STICK_MAX, p.range_min, p.range_max);
    insert_axis(state, vid.index, properties::apply(remapped, p));
    Ok(())
}

fn write_dpad(profile: &MappingProfile, snapshot: &XInputSnapshot, state: &mut SState) -> Result<(), CoreError> {
    let vid = match profile.virt(EPhysElem::Dpad) {
        Some(vid) => vid,
        None => return Ok(()),
    };
    if vid.kind != EVKind::Pov {
        error!("mapping profile binds the d-pad to a non-POV object");
        return Err(CoreError::Generic);
    }
    insert_pov(state, vid.index, dpad_to_pov(snapshot.button_bits));
    Ok(())
}

/// Converts the four d-pad bits into a POV angle in hundredths of a degree. Exactly the eight
/// compass points are representable; anything else (both opposing bits, or nothing) centres.
fn dpad_to_pov(button_bits: u16) -> i32 {
    let up = button_bits & BIT_DPAD_UP != 0;
    let down = button_bits & BIT_DPAD_DOWN != 0;
    let left = button_bits & BIT_DPAD_LEFT != 0;
    let right = button_bits & BIT_DPAD_RIGHT != 0;

    match (up, down, left, right) {
        (true, false, false, false) => POV_NORTH,
        (true, false, false, true) => POV_NORTHEAST,
        (false, false, false, true) => POV_EAST,
        (false, true, false, true) => POV_SOUTHEAST,
        (false, true, false, false) => POV_SOUTH,
        (false, true, true, false) => POV_SOUTHWEST,
        (false, false, true, false) => POV_WEST,
        (true, false, true, false) => POV_NORTHWEST,
        _ => POV_CENTERED,
    }
}

fn write_buttons(profile: &MappingProfile, snapshot: &XInputSnapshot, state: &mut SState) -> Result<(), CoreError> {
    for &phys in EPhysElem::ALL.iter() {
        let bit = match phys.button_bit() {
            Some(bit) => bit,
            None => continue,
        };
        let vid = match profile.virt(phys) {
            Some(vid) => vid,
            None => continue,
        };
        if vid.kind != EVKind::Button {
            error!("mapping profile binds a digital button to a non-button object");
            return Err(CoreError::Generic);
        }
        insert_button(state, vid.index, snapshot.button_bit(bit));
    }
    Ok(())
}

fn insert_axis(state: &mut SState, index: u16, value: i32) {
    state.axis.insert(index as usize, value);
}

fn insert_button(state: &mut SState, index: u16, pressed: bool) {
    state.button.insert(index as usize, pressed);
}

fn insert_pov(state: &mut SState, index: u16, angle: i32) {
    state.pov.insert(index as usize, angle);
}

/// Serialises `state` into `buf` per `binding`. Zeroes the buffer first (so every byte the
/// binding didn't claim reads as zero), then writes each bound object, then fills any
/// `unusedOffsets[Pov]` slot with the centred sentinel.
pub fn write_buffer(binding: &DataFormatBinding, state: &SState, buf: &mut [u8]) -> Result<(), CoreError> {
    let packet_size = binding.packet_size() as usize;
    if buf.len() < packet_size {
        return Err(CoreError::InvalidParam);
    }
    for byte in &mut buf[..packet_size] {
        *byte = 0;
    }

    for (index, &value) in state.axis.iter() {
        write_at(binding, buf, VId::axis(index as u16), &value.to_le_bytes());
    }
    for (index, &pressed) in state.button.iter() {
        let byte = if pressed { BUTTON_PRESSED } else { BUTTON_RELEASED };
        write_at(binding, buf, VId::button(index as u16), &[byte]);
    }
    for (index, &angle) in state.pov.iter() {
        write_at(binding, buf, VId::pov(index as u16), &(angle as u32).to_le_bytes());
    }

    for &offset in binding.unused_offsets(EVKind::Pov) {
        let bytes = (POV_CENTERED as u32).to_le_bytes();
        let start = offset as usize;
        buf[start..start + bytes.len()].copy_from_slice(&bytes);
    }

    Ok(())
}

fn write_at(binding: &DataFormatBinding, buf: &mut [u8], vid: VId, bytes: &[u8]) {
    let offset = binding.offset_of(vid);
    if offset == OFFSET_UNUSED {
        return;
    }
    let start = offset as usize;
    buf[start..start + bytes.len()].copy_from_slice(bytes);
}
