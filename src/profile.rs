// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Mapping profiles: the immutable, per-process assignment from physical XInput elements to
//! abstract virtual objects.
//!
//! The original organised this as a base class with one subclass per profile, each overriding a
//! capability table. A profile here is nothing more than a plain, comparable record of lookup
//! tables; there is no behaviour to override, so there is no vtable to pay for.

use crate::types::{AxisIdentity, EPhysElem, EVKind, VId};
use vec_map::VecMap;

/// Names of the four predefined profiles, as used for configuration resolution (see
/// [`crate::config`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    StandardGamepad,
    ExtendedGamepad,
    XInputNative,
    XInputSharedTriggers,
}

impl ProfileKind {
    pub fn name(self) -> &'static str {
        match self {
            ProfileKind::StandardGamepad => "StandardGamepad",
            ProfileKind::ExtendedGamepad => "ExtendedGamepad",
            ProfileKind::XInputNative => "XInputNative",
            ProfileKind::XInputSharedTriggers => "XInputSharedTriggers",
        }
    }

    /// Builds the immutable profile table for this kind.
    pub fn build(self) -> MappingProfile {
        match self {
            ProfileKind::StandardGamepad => MappingProfile::standard_gamepad(),
            ProfileKind::ExtendedGamepad => MappingProfile::extended_gamepad(),
            ProfileKind::XInputNative => MappingProfile::xinput_native(),
            ProfileKind::XInputSharedTriggers => MappingProfile::xinput_shared_triggers(),
        }
    }
}

/// Read-only projection table from physical elements to virtual objects.
///
/// A profile never changes after construction; two profiles built from the same [`ProfileKind`]
/// compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingProfile {
    kind: ProfileKind,
    axis_count: u16,
    button_count: u16,
    pov_count: u16,
    axis_semantic: VecMap<AxisIdentity>,
    phys_to_virt: VecMap<VId>,
    shared_dir: Option<VecMap<i32>>,
}

impl MappingProfile {
    /// `StandardGamepad`: four axes (two sticks), independent triggers mapped to buttons, ten
    /// buttons, one POV for the d-pad. Mirrors the minimal DirectInput "gamepad" template.
    fn standard_gamepad() -> Self {
        let mut b = ProfileBuilder::new(ProfileKind::StandardGamepad, 4, 10, 1);
        b.axis(0, AxisIdentity::X, EPhysElem::StickLeftH);
        b.axis(1, AxisIdentity::Y, EPhysElem::StickLeftV);
        b.axis(2, AxisIdentity::RotX, EPhysElem::StickRightH);
        b.axis(3, AxisIdentity::RotY, EPhysElem::StickRightV);
        b.button(0, EPhysElem::ButtonA);
        b.button(1, EPhysElem::ButtonB);
        b.button(2, EPhysElem::ButtonX);
        b.button(3, EPhysElem::ButtonY);
        b.button(4, EPhysElem::ButtonLB);
        b.button(5, EPhysElem::ButtonRB);
        b.button(6, EPhysElem::ButtonBack);
        b.button(7, EPhysElem::ButtonStart);
        b.button(8, EPhysElem::ButtonLeftStick);
        b.button(9, EPhysElem::ButtonRightStick);
        b.phys(EPhysElem::Dpad, VId::pov(0));
        // Triggers are not exposed at all in this minimal profile: they are simply discarded.
        b.finish()
    }

    /// `ExtendedGamepad`: as `StandardGamepad`, but the triggers are exposed as independent axes
    /// (`Z`/`RotZ`) and the thumbstick-click/back/start buttons join the action pad.
    fn extended_gamepad() -> Self {
        let mut b = ProfileBuilder::new(ProfileKind::ExtendedGamepad, 6, 10, 1);
        b.axis(0, AxisIdentity::X, EPhysElem::StickLeftH);
        b.axis(1, AxisIdentity::Y, EPhysElem::StickLeftV);
        b.axis(2, AxisIdentity::RotX, EPhysElem::StickRightH);
        b.axis(3, AxisIdentity::RotY, EPhysElem::StickRightV);
        b.axis(4, AxisIdentity::Z, EPhysElem::TriggerLT);
        b.axis(5, AxisIdentity::RotZ, EPhysElem::TriggerRT);
        b.button(0, EPhysElem::ButtonA);
        b.button(1, EPhysElem::ButtonB);
        b.button(2, EPhysElem::ButtonX);
        b.button(3, EPhysElem::ButtonY);
        b.button(4, EPhysElem::ButtonLB);
        b.button(5, EPhysElem::ButtonRB);
        b.button(6, EPhysElem::ButtonBack);
        b.button(7, EPhysElem::ButtonStart);
        b.button(8, EPhysElem::ButtonLeftStick);
        b.button(9, EPhysElem::ButtonRightStick);
        b.phys(EPhysElem::Dpad, VId::pov(0));
        b.finish()
    }

    /// `XInputNative`: one axis per stick dimension plus one axis per trigger (4 sticks + 2
    /// triggers = 6 axes), independent of each other. Closest to the raw XInput report shape.
    fn xinput_native() -> Self {
        let mut b = ProfileBuilder::new(ProfileKind::XInputNative, 6, 10, 1);
        b.axis(0, AxisIdentity::X, EPhysElem::StickLeftH);
        b.axis(1, AxisIdentity::Y, EPhysElem::StickLeftV);
        b.axis(2, AxisIdentity::RotX, EPhysElem::StickRightH);
        b.axis(3, AxisIdentity::RotY, EPhysElem::StickRightV);
        b.axis(4, AxisIdentity::Z, EPhysElem::TriggerLT);
        b.axis(5, AxisIdentity::RotZ, EPhysElem::TriggerRT);
        b.button(0, EPhysElem::ButtonA);
        b.button(1, EPhysElem::ButtonB);
        b.button(2, EPhysElem::ButtonX);
        b.button(3, EPhysElem::ButtonY);
        b.button(4, EPhysElem::ButtonLB);
        b.button(5, EPhysElem::ButtonRB);
        b.button(6, EPhysElem::ButtonBack);
        b.button(7, EPhysElem::ButtonStart);
        b.button(8, EPhysElem::ButtonLeftStick);
        b.button(9, EPhysElem::ButtonRightStick);
        b.phys(EPhysElem::Dpad, VId::pov(0));
        b.finish()
    }

    /// `XInputSharedTriggers`: classic XInput convention — LT and RT are opposite directions of
    /// a single `Z` axis (§4.5's "shared axis" case).
    fn xinput_shared_triggers() -> Self {
        let mut b = ProfileBuilder::new(ProfileKind::XInputSharedTriggers, 5, 10, 1);
        b.axis(0, AxisIdentity::X, EPhysElem::StickLeftH);
        b.axis(1, AxisIdentity::Y, EPhysElem::StickLeftV);
        b.axis(2, AxisIdentity::RotX, EPhysElem::StickRightH);
        b.axis(3, AxisIdentity::RotY, EPhysElem::StickRightV);
        b.shared_trigger_axis(4, AxisIdentity::Z);
        b.button(0, EPhysElem::ButtonA);
        b.button(1, EPhysElem::ButtonB);
        b.button(2, EPhysElem::ButtonX);
        b.button(3, EPhysElem::ButtonY);
        b.button(4, EPhysElem::ButtonLB);
        b.button(5, EPhysElem::ButtonRB);
        b.button(6, EPhysElem::ButtonBack);
        b.button(7, EPhysElem::ButtonStart);
        b.button(8, EPhysElem::ButtonLeftStick);
        b.button(9, EPhysElem::ButtonRightStick);
        b.phys(EPhysElem::Dpad, VId::pov(0));
        b.finish()
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn count_of(&self, kind: EVKind) -> u16 {
        match kind {
            EVKind::Axis => self.axis_count,
            EVKind::Button => self.button_count,
            EVKind::Pov => self.pov_count,
        }
    }

    /// Semantic identity of axis `i`. Panics if `i >= count_of(Axis)`; callers are expected to
    /// have validated the index first (this mirrors how the binder only ever calls it with
    /// indices it has itself enumerated).
    pub fn axis_semantic(&self, index: u16) -> AxisIdentity {
        *self
            .axis_semantic
            .get(index as usize)
            .expect("axis index must be within count_of(Axis)")
    }

    pub fn virt(&self, phys: EPhysElem) -> Option<VId> {
        self.phys_to_virt.get(phys as usize).copied()
    }

    pub fn is_shared_trigger_axis(&self) -> bool {
        self.shared_dir.is_some()
    }

    /// Direction (`-1` or `+1`) the given trigger contributes to the shared axis. Returns `None`
    /// for profiles without a shared-trigger axis, or for a physical element that is not a
    /// trigger.
    pub fn shared_dir(&self, phys: EPhysElem) -> Option<i32> {
        if !phys.is_trigger() {
            return None;
        }
        self.shared_dir.as_ref()?.get(phys as usize).copied()
    }

    /// Returns the index of the `nth` (0-based) axis whose semantic identity equals `identity`,
    /// scanning in index order. Used by the data format binder to resolve identity-qualified
    /// object requests.
    pub fn axis_index_by_identity(&self, identity: AxisIdentity, nth: u16) -> Option<u16> {
        let mut seen = 0u16;
        for i in 0..self.axis_count {
            if self.axis_semantic(i) == identity {
                if seen == nth {
                    return Some(i);
                }
                seen += 1;
            }
        }
        None
    }
}

/// Builds a [`MappingProfile`] one physical-to-virtual assignment at a time, checking the
/// profile-validity rule as it goes: every target index must fit within its kind's declared
/// count, and only triggers may share a target.
struct ProfileBuilder {
    kind: ProfileKind,
    axis_count: u16,
    button_count: u16,
    pov_count: u16,
    axis_semantic: VecMap<AxisIdentity>,
    phys_to_virt: VecMap<VId>,
    shared_dir: Option<VecMap<i32>>,
}

impl ProfileBuilder {
    fn new(kind: ProfileKind, axis_count: u16, button_count: u16, pov_count: u16) -> Self {
        ProfileBuilder {
            kind,
            axis_count,
            button_count,
            pov_count,
            axis_semantic: VecMap::new(),
            phys_to_virt: VecMap::new(),
            shared_dir: None,
        }
    }

    fn axis(&mut self, index: u16, identity: AxisIdentity, phys: EPhysElem) {
        assert!(index < self.axis_count, "axis index out of range for profile");
        self.axis_semantic.insert(index as usize, identity);
        self.phys(phys, VId::axis(index));
    }

    fn shared_trigger_axis(&mut self, index: u16, identity: AxisIdentity) {
        assert!(index < self.axis_count, "axis index out of range for profile");
        self.axis_semantic.insert(index as usize, identity);
        let vid = VId::axis(index);
        self.phys_to_virt.insert(EPhysElem::TriggerLT as usize, vid);
        self.phys_to_virt.insert(EPhysElem::TriggerRT as usize, vid);
        let mut dir = VecMap::new();
        dir.insert(EPhysElem::TriggerLT as usize, 1);
        dir.insert(EPhysElem::TriggerRT as usize, -1);
        self.shared_dir = Some(dir);
    }

    fn button(&mut self, index: u16, phys: EPhysElem) {
        assert!(index < self.button_count, "button index out of range for profile");
        self.phys(phys, VId::button(index));
    }

    fn phys(&mut self, phys: EPhysElem, vid: VId) {
        self.phys_to_virt.insert(phys as usize, vid);
    }

    fn finish(self) -> MappingProfile {
        MappingProfile {
            kind: self.kind,
            axis_count: self.axis_count,
            button_count: self.button_count,
            pov_count: self.pov_count,
            axis_semantic: self.axis_semantic,
            phys_to_virt: self.phys_to_virt,
            shared_dir: self.shared_dir,
        }
    }
}
