// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The Virtual Controller: owns the latest mapped state for one XInput controller slot,
//! detects real changes on refresh, and serialises all access behind a single mutex.

use crate::error::CoreError;
use crate::event::{self, AppEvent, ReadMode, TriggerCache};
use crate::format::DataFormatBinding;
use crate::profile::MappingProfile;
use crate::properties::AxisProperties;
use crate::source::{SourceStatus, XInputSnapshot, XInputSource};
use crate::types::SState;
use crate::writer;
use log::info;
use std::sync::Mutex;

/// `{packetNumber, errorCode}`; two identifiers with the same `packet_number` and both-SUCCESS
/// (or both non-SUCCESS) statuses represent "no real change" (§4.7 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier {
    pub packet_number: u32,
    pub status: SourceStatus,
}

impl Default for Identifier {
    fn default() -> Self {
        Identifier { packet_number: 0, status: SourceStatus::DeviceNotConnected }
    }
}

struct Inner {
    latest_state: SState,
    identifier: Identifier,
    refresh_needed: bool,
    properties: AxisProperties,
    binding: Option<DataFormatBinding>,
    trigger_cache: TriggerCache,
}

/// Owns the mapped state of one controller slot. `source` is a borrowed capability that must
/// outlive the controller; the profile, properties, and binding are exclusively owned here.
pub struct VirtualController<'a> {
    source: &'a dyn XInputSource,
    controller_id: u32,
    profile: MappingProfile,
    inner: Mutex<Inner>,
}

impl<'a> VirtualController<'a> {
    pub fn new(source: &'a dyn XInputSource, controller_id: u32, profile: MappingProfile) -> Self {
        VirtualController {
            source,
            controller_id,
            profile,
            inner: Mutex::new(Inner {
                latest_state: SState::new(),
                identifier: Identifier::default(),
                refresh_needed: true,
                properties: AxisProperties::new(),
                binding: None,
                trigger_cache: TriggerCache::new(),
            }),
        }
    }

    pub fn profile(&self) -> &MappingProfile {
        &self.profile
    }

    pub fn set_data_format(&self, binding: DataFormatBinding) {
        self.inner.lock().unwrap().binding = Some(binding);
    }

    pub fn reset_data_format(&self) {
        self.inner.lock().unwrap().binding = None;
    }

    /// Polls the source, updates `latest_state`/`identifier` if anything real changed, and logs
    /// connect/disconnect transitions at `info!`. Returns whether the installed state changed.
    pub fn refresh_state(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        self.refresh_locked(&mut inner)
    }

    fn refresh_locked(&self, inner: &mut Inner) -> bool {
        let (status, packet_number, mut snapshot) = self.source.get_state(self.controller_id);
        if !status.is_success() {
            snapshot = XInputSnapshot::default();
        }

        let old_status = inner.identifier.status;
        if status.is_success() && !old_status.is_success() {
            info!("controller {}: connected", self.controller_id);
        } else if !status.is_success() && old_status.is_success() {
            info!("controller {}: disconnected", self.controller_id);
        } else if !status.is_success() && !old_status.is_success() && status != old_status {
            info!("controller {}: error changed ({:?} -> {:?})", self.controller_id, old_status, status);
        }

        let no_real_change = packet_number == inner.identifier.packet_number
            && (status.is_success() == old_status.is_success());
        if no_real_change {
            inner.identifier.status = status;
            return false;
        }

        let new_state = match writer::compute_state(&self.profile, &mut inner.properties, &snapshot) {
            Ok(state) => state,
            Err(_) => return false,
        };

        inner.identifier = Identifier { packet_number, status };
        if new_state == inner.latest_state {
            return false;
        }
        inner.latest_state = new_state;
        true
    }

    /// Refreshes if needed, returns a copy of the latest mapped state, and always leaves
    /// `refresh_needed` set so the next call refreshes again (§4.7, invariant 8).
    pub fn get_state(&self) -> SState {
        let mut inner = self.inner.lock().unwrap();
        if inner.refresh_needed {
            self.refresh_locked(&mut inner);
        }
        let out = inner.latest_state.clone();
        inner.refresh_needed = true;
        out
    }

    /// Writes the latest mapped state into `buf` per the installed data format.
    pub fn get_mapped_state(&self, buf: &mut [u8]) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.refresh_needed {
            self.refresh_locked(&mut inner);
        }
        inner.refresh_needed = true;
        let binding = inner.binding.clone().ok_or(CoreError::InvalidParam)?;
        let state = inner.latest_state.clone();
        writer::write_buffer(&binding, &state, buf)
    }

    /// Drains or peeks up to `max` buffered events through the controller's own profile,
    /// properties, data format, and persistent trigger cache (§4.6). Fails with
    /// [`CoreError::InvalidParam`] if no data format is installed.
    pub fn get_buffered_events(&self, max: u32, mode: ReadMode) -> Result<(Vec<AppEvent>, bool), CoreError> {
        let mut inner = self.inner.lock().unwrap();
        let binding = inner.binding.clone().ok_or(CoreError::InvalidParam)?;
        let Inner { properties, trigger_cache, .. } = &mut *inner;
        event::encode_batch(&self.profile, properties, &binding, self.source, trigger_cache, max, mode)
    }

    pub(crate) fn with_properties<R>(&self, f: impl FnOnce(&mut AxisProperties) -> R) -> R {
        let mut inner = self.inner.lock().unwrap();
        f(&mut inner.properties)
    }

    pub(crate) fn with_binding<R>(&self, f: impl FnOnce(Option<&DataFormatBinding>) -> R) -> R {
        let inner = self.inner.lock().unwrap();
        f(inner.binding.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{self, InstanceSelector, KindMask, ObjectIdentity, ObjectRequest};
    use crate::profile::ProfileKind;
    use crate::source::PhysEvent;
    use crate::testutil::FakeSource;

    #[test]
    fn packet_change_updates_state_s5() {
        let source = FakeSource::new();
        source.set_state(SourceStatus::Success, 7, XInputSnapshot::default());
        let controller = VirtualController::new(&source, 0, ProfileKind::XInputNative.build());
        assert!(controller.refresh_state());

        source.set_state(SourceStatus::Success, 8, XInputSnapshot { lx: 1000, ..Default::default() });
        assert!(controller.refresh_state());

        source.set_state(SourceStatus::Success, 8, XInputSnapshot { lx: 1000, ..Default::default() });
        assert!(!controller.refresh_state());
    }

    #[test]
    fn disconnect_zeroes_a_nonneutral_state() {
        let source = FakeSource::new();
        source.set_state(SourceStatus::Success, 8, XInputSnapshot { lx: 20000, ..Default::default() });
        let controller = VirtualController::new(&source, 0, ProfileKind::XInputNative.build());
        controller.refresh_state();

        // Same packet number, but the device drops: the snapshot is forced to neutral, which
        // differs from the non-neutral state just installed, so this is a real change even
        // though `packet_number` alone didn't move.
        source.set_state(SourceStatus::DeviceNotConnected, 8, XInputSnapshot { lx: 20000, ..Default::default() });
        assert!(controller.refresh_state());
    }

    #[test]
    fn get_state_always_refreshes_again_next_time() {
        let source = FakeSource::new();
        source.set_state(SourceStatus::Success, 1, XInputSnapshot::default());
        let controller = VirtualController::new(&source, 0, ProfileKind::XInputNative.build());

        controller.get_state();
        source.set_state(SourceStatus::Success, 2, XInputSnapshot { lx: 5000, ..Default::default() });
        assert!(controller.refresh_state());
    }

    #[test]
    fn get_buffered_events_requires_a_data_format() {
        let source = FakeSource::new();
        let controller = VirtualController::new(&source, 0, ProfileKind::XInputNative.build());
        assert_eq!(controller.get_buffered_events(10, ReadMode::Drain), Err(CoreError::InvalidParam));
    }

    #[test]
    fn get_buffered_events_uses_its_own_persistent_trigger_cache() {
        use crate::types::EPhysElem;

        let source = FakeSource::new();
        let controller = VirtualController::new(&source, 0, ProfileKind::XInputSharedTriggers.build());
        let req = |offset| ObjectRequest { kind_mask: KindMask::AXIS, identity: ObjectIdentity::None, instance: InstanceSelector::Any, byte_offset: offset };
        let binding = format::bind(controller.profile(), &(0..5).map(req).collect::<Vec<_>>(), 20).unwrap();
        controller.set_data_format(binding);

        // Only LT arrives in this batch; a persistent cache (not a fresh one per call) is what
        // lets the shared-trigger axis recompute without also having seen RT.
        source.push(PhysEvent { elem: EPhysElem::TriggerLT, value: 255, seq: 1, timestamp: 1 });
        let (events, overflowed) = controller.get_buffered_events(10, ReadMode::Drain).unwrap();
        assert!(!overflowed);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, 32767);

        source.push(PhysEvent { elem: EPhysElem::TriggerRT, value: 255, seq: 2, timestamp: 2 });
        let (events, _) = controller.get_buffered_events(10, ReadMode::Drain).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, 0);
    }
}
