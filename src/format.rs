// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The Data Format Binder: turns a caller-supplied list of object requests into a
//! `DataFormatBinding` that maps virtual objects to byte offsets, or rejects the whole list.

use crate::constants::{MAX_PACKET, OFFSET_UNUSED};
use crate::error::CoreError;
use crate::profile::MappingProfile;
use crate::types::{AxisIdentity, EVKind, VId};
use log::trace;
use vec_map::VecMap;

bitflags::bitflags! {
    /// Which kinds a request is willing to accept. A request naming more than one bit is
    /// ambiguous and rejected outright, matching how the legacy API's object-type mask works.
    pub struct KindMask: u8 {
        const AXIS   = 0b001;
        const BUTTON = 0b010;
        const POV    = 0b100;
    }
}

impl KindMask {
    fn resolve(self) -> Result<EVKind, CoreError> {
        match self {
            KindMask::AXIS => Ok(EVKind::Axis),
            KindMask::BUTTON => Ok(EVKind::Button),
            KindMask::POV => Ok(EVKind::Pov),
            _ => Err(CoreError::InvalidParam),
        }
    }
}

/// Which object within a kind a request names, beyond its kind mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectIdentity {
    /// No identity constraint: any object of the request's kind will do.
    None,
    /// Axis request qualified by semantic identity (X, Y, Z, ...).
    Axis(AxisIdentity),
    /// The canonical button identity (there is only one).
    Button,
    /// The canonical POV identity (there is only one).
    Pov,
}

/// Which instance of the (possibly identity-qualified) object family a request wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceSelector {
    Any,
    Specific(u16),
}

/// One entry in a caller-supplied data format list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRequest {
    pub kind_mask: KindMask,
    pub identity: ObjectIdentity,
    pub instance: InstanceSelector,
    pub byte_offset: u32,
}

/// A successfully bound data format: byte offsets for every virtual object the caller asked
/// for, the inverse map, and the set of offsets the caller reserved but left unfilled.
#[derive(Debug, Clone, Default)]
pub struct DataFormatBinding {
    packet_size: u32,
    vid_to_offset: VecMap<u32>,
    offset_to_vid: VecMap<VId>,
    unused_axis: Vec<u32>,
    unused_button: Vec<u32>,
    unused_pov: Vec<u32>,
}

impl DataFormatBinding {
    pub fn packet_size(&self) -> u32 {
        self.packet_size
    }

    /// Byte offset bound to `vid`, or [`OFFSET_UNUSED`] if this format has no slot for it.
    pub fn offset_of(&self, vid: VId) -> u32 {
        self.vid_to_offset.get(Self::key(vid)).copied().unwrap_or(OFFSET_UNUSED)
    }

    pub fn vid_at_offset(&self, offset: u32) -> Option<VId> {
        self.offset_to_vid.get(offset as usize).copied()
    }

    pub fn unused_offsets(&self, kind: EVKind) -> &[u32] {
        match kind {
            EVKind::Axis => &self.unused_axis,
            EVKind::Button => &self.unused_button,
            EVKind::Pov => &self.unused_pov,
        }
    }

    fn key(vid: VId) -> usize {
        // Axes, buttons, and POVs each have their own dense index space; fold kind into the key
        // so all three can share one VecMap without colliding.
        let kind_tag = match vid.kind {
            EVKind::Axis => 0usize,
            EVKind::Button => 1,
            EVKind::Pov => 2,
        };
        (kind_tag << 16) | vid.index as usize
    }
}

struct NextFree {
    axis: u16,
    button: u16,
    pov: u16,
}

impl NextFree {
    fn counter_mut(&mut self, kind: EVKind) -> &mut u16 {
        match kind {
            EVKind::Axis => &mut self.axis,
            EVKind::Button => &mut self.button,
            EVKind::Pov => &mut self.pov,
        }
    }
}

/// Binds `requests` against `profile`, per §4.4. All-or-nothing: on any failure, no partial
/// binding is returned and the caller's previously installed binding (if any) is untouched.
pub fn bind(profile: &MappingProfile, requests: &[ObjectRequest], packet_size: u32) -> Result<DataFormatBinding, CoreError> {
    if packet_size % 4 != 0 || packet_size > MAX_PACKET {
        return Err(CoreError::InvalidParam);
    }

    trace!("setDataFormat: {} requests, packet_size={}", requests.len(), packet_size);

    let mut offset_used = vec![false; packet_size as usize];
    let mut axis_used = vec![false; profile.count_of(EVKind::Axis) as usize];
    let mut button_used = vec![false; profile.count_of(EVKind::Button) as usize];
    let mut pov_used = vec![false; profile.count_of(EVKind::Pov) as usize];
    let mut next = NextFree { axis: 0, button: 0, pov: 0 };

    let mut binding = DataFormatBinding {
        packet_size,
        ..Default::default()
    };

    for req in requests {
        let kind = req.kind_mask.resolve()?;
        let size = kind.byte_size();
        claim_offset_range(&mut offset_used, req.byte_offset, size)?;

        let used = match kind {
            EVKind::Axis => &mut axis_used,
            EVKind::Button => &mut button_used,
            EVKind::Pov => &mut pov_used,
        };

        let index = match (kind, req.identity) {
            (EVKind::Axis, ObjectIdentity::None) => select_index(used, &mut next, kind, req.instance)?,
            (EVKind::Axis, ObjectIdentity::Axis(identity)) => {
                select_by_identity(profile, used, identity, req.instance)?
            }
            (EVKind::Button, ObjectIdentity::None | ObjectIdentity::Button) => {
                select_index(used, &mut next, kind, req.instance)?
            }
            (EVKind::Pov, ObjectIdentity::None | ObjectIdentity::Pov) => {
                select_index(used, &mut next, kind, req.instance)?
            }
            _ => return Err(CoreError::InvalidParam),
        };

        let index = match index {
            Some(index) => index,
            None => {
                record_unused(&mut binding, kind, req.byte_offset);
                continue;
            }
        };

        used[index as usize] = true;
        let vid = VId::new(kind, index);
        binding.vid_to_offset.insert(DataFormatBinding::key(vid), req.byte_offset);
        binding.offset_to_vid.insert(req.byte_offset as usize, vid);
    }

    Ok(binding)
}

fn claim_offset_range(offset_used: &mut [bool], offset: u32, size: u32) -> Result<(), CoreError> {
    let start = offset as usize;
    let end = start.checked_add(size as usize).ok_or(CoreError::InvalidParam)?;
    if end > offset_used.len() {
        return Err(CoreError::InvalidParam);
    }
    if offset_used[start..end].iter().any(|&b| b) {
        return Err(CoreError::InvalidParam);
    }
    for slot in &mut offset_used[start..end] {
        *slot = true;
    }
    Ok(())
}

/// Selects a free index of `kind`, per §4.4.3c/d/e and the corrected instance-0 rule
/// (Open Question 1): instance `0` is a valid, selectable index, not an off-by-one sentinel.
fn select_index(
    used: &mut [bool],
    next: &mut NextFree,
    kind: EVKind,
    instance: InstanceSelector,
) -> Result<Option<u16>, CoreError> {
    match instance {
        InstanceSelector::Specific(i) => {
            if i as usize >= used.len() || used[i as usize] {
                return Err(CoreError::InvalidParam);
            }
            Ok(Some(i))
        }
        InstanceSelector::Any => {
            let counter = next.counter_mut(kind);
            while (*counter as usize) < used.len() && used[*counter as usize] {
                *counter += 1;
            }
            if (*counter as usize) >= used.len() {
                Ok(None)
            } else {
                let index = *counter;
                *counter += 1;
                Ok(Some(index))
            }
        }
    }
}

fn select_by_identity(
    profile: &MappingProfile,
    used: &mut [bool],
    identity: AxisIdentity,
    instance: InstanceSelector,
) -> Result<Option<u16>, CoreError> {
    match instance {
        InstanceSelector::Specific(_) => {
            let index = profile.axis_index_by_identity(identity, 0).ok_or(CoreError::InvalidParam)?;
            if used[index as usize] {
                return Err(CoreError::InvalidParam);
            }
            Ok(Some(index))
        }
        InstanceSelector::Any => {
            let mut nth = 0u16;
            loop {
                match profile.axis_index_by_identity(identity, nth) {
                    Some(index) if !used[index as usize] => return Ok(Some(index)),
                    Some(_) => nth += 1,
                    None => return Ok(None),
                }
            }
        }
    }
}

fn record_unused(binding: &mut DataFormatBinding, kind: EVKind, offset: u32) {
    match kind {
        EVKind::Axis => binding.unused_axis.push(offset),
        EVKind::Button => binding.unused_button.push(offset),
        EVKind::Pov => binding.unused_pov.push(offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileKind;

    fn axis_req(offset: u32, instance: InstanceSelector) -> ObjectRequest {
        ObjectRequest { kind_mask: KindMask::AXIS, identity: ObjectIdentity::None, instance, byte_offset: offset }
    }

    fn button_req(offset: u32, instance: InstanceSelector) -> ObjectRequest {
        ObjectRequest { kind_mask: KindMask::BUTTON, identity: ObjectIdentity::None, instance, byte_offset: offset }
    }

    #[test]
    fn rejects_overlapping_offsets() {
        let profile = ProfileKind::XInputNative.build();
        let requests = [axis_req(0, InstanceSelector::Any), axis_req(2, InstanceSelector::Any)];
        assert_eq!(bind(&profile, &requests, 8), Err(CoreError::InvalidParam));
    }

    #[test]
    fn instance_zero_is_selectable() {
        let profile = ProfileKind::XInputNative.build();
        let requests = [button_req(0, InstanceSelector::Specific(0))];
        let binding = bind(&profile, &requests, 4).unwrap();
        assert_eq!(binding.vid_at_offset(0), Some(VId::button(0)));
    }

    #[test]
    fn unused_any_axis_is_recorded_not_failed() {
        let profile = ProfileKind::StandardGamepad.build(); // 4 axes
        let requests: Vec<_> = (0..5).map(|i| axis_req(i * 4, InstanceSelector::Any)).collect();
        let binding = bind(&profile, &requests, 20).unwrap();
        assert_eq!(binding.unused_offsets(EVKind::Axis), &[16]);
    }

    #[test]
    fn rejects_packet_size_not_multiple_of_four() {
        let profile = ProfileKind::XInputNative.build();
        assert_eq!(bind(&profile, &[], 6), Err(CoreError::InvalidParam));
    }

    #[test]
    fn offset_and_vid_maps_are_mutual_inverses() {
        let profile = ProfileKind::XInputNative.build();
        let requests = [axis_req(0, InstanceSelector::Any), button_req(4, InstanceSelector::Any)];
        let binding = bind(&profile, &requests, 8).unwrap();
        for (offset, vid) in [(0u32, VId::axis(0)), (4, VId::button(0))] {
            assert_eq!(binding.vid_at_offset(offset), Some(vid));
            assert_eq!(binding.offset_of(vid), offset);
        }
    }
}
