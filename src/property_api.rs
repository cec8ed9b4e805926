// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The Property API façade: `Get`/`Set` over `{AxisMode, Range, Deadzone, Saturation}`, keyed
//! either by a whole-device target, a virtual id, or a bound byte offset.

use crate::constants::OFFSET_UNUSED;
use crate::controller::VirtualController;
use crate::error::CoreError;
use crate::format::KindMask;
use crate::types::{EVKind, VId};
use log::debug;

/// The only axis mode this crate implements. `Relative` is recognised but always rejected, per
/// §4.8's "write accepts only Absolute" rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisMode {
    Absolute,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    AxisMode,
    Range,
    Deadzone,
    Saturation,
}

/// How a `Get`/`Set` call identifies which object(s) it addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyTarget {
    /// All axes at once (`Set` only, for `Range`/`Deadzone`/`Saturation`); the sole valid target
    /// for `AxisMode`.
    WholeDevice,
    ByVirtualId(VId),
    ByByteOffset(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValue {
    AxisMode(AxisMode),
    Range(i32, i32),
    Deadzone(u32),
    Saturation(u32),
}

/// One object yielded by [`enumerate_objects`]: its handle, display name, and bound byte offset
/// ([`OFFSET_UNUSED`] if the installed data format has no slot for it, or none is installed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub vid: VId,
    pub name: String,
    pub offset: u32,
}

/// `axes, buttons, povs` exposed by the controller's active profile.
pub fn get_capabilities(controller: &VirtualController) -> (u16, u16, u16) {
    let profile = controller.profile();
    (profile.count_of(EVKind::Axis), profile.count_of(EVKind::Button), profile.count_of(EVKind::Pov))
}

/// Visits every virtual object of a kind named in `kind_mask`, in index order, with its name and
/// bound offset (per §6's `enumerateObjects`).
pub fn enumerate_objects(controller: &VirtualController, kind_mask: KindMask, mut visitor: impl FnMut(ObjectDescriptor)) {
    let profile = controller.profile();
    controller.with_binding(|binding| {
        let offset_of = |vid: VId| binding.map(|b| b.offset_of(vid)).unwrap_or(OFFSET_UNUSED);

        if kind_mask.contains(KindMask::AXIS) {
            for index in 0..profile.count_of(EVKind::Axis) {
                let vid = VId::axis(index);
                visitor(ObjectDescriptor { vid, name: profile.axis_semantic(index).name().to_string(), offset: offset_of(vid) });
            }
        }
        if kind_mask.contains(KindMask::BUTTON) {
            for index in 0..profile.count_of(EVKind::Button) {
                let vid = VId::button(index);
                visitor(ObjectDescriptor { vid, name: format!("Button {}", index + 1), offset: offset_of(vid) });
            }
        }
        if kind_mask.contains(KindMask::POV) {
            for index in 0..profile.count_of(EVKind::Pov) {
                let vid = VId::pov(index);
                visitor(ObjectDescriptor { vid, name: format!("POV {}", index + 1), offset: offset_of(vid) });
            }
        }
    });
}

fn resolve_axis_index(controller: &VirtualController, target: PropertyTarget) -> Result<u16, CoreError> {
    match target {
        PropertyTarget::WholeDevice => Err(CoreError::InvalidParam),
        PropertyTarget::ByVirtualId(vid) => {
            if vid.kind != EVKind::Axis {
                return Err(CoreError::Unsupported);
            }
            Ok(vid.index)
        }
        PropertyTarget::ByByteOffset(offset) => controller.with_binding(|binding| {
            let binding = binding.ok_or(CoreError::ObjectNotFound)?;
            let vid = binding.vid_at_offset(offset).ok_or(CoreError::ObjectNotFound)?;
            if vid.kind != EVKind::Axis {
                return Err(CoreError::Unsupported);
            }
            Ok(vid.index)
        }),
    }
}

/// Reads a property. `Range`/`Deadzone`/`Saturation` reject `WholeDevice` (§4.8: whole-device is
/// write-only for those three).
pub fn get_property(controller: &VirtualController, kind: PropertyKind, target: PropertyTarget) -> Result<PropertyValue, CoreError> {
    match kind {
        PropertyKind::AxisMode => match target {
            PropertyTarget::WholeDevice => Ok(PropertyValue::AxisMode(AxisMode::Absolute)),
            _ => Err(CoreError::InvalidParam),
        },
        PropertyKind::Range => {
            let index = resolve_axis_index(controller, target)?;
            let p = controller.with_properties(|props| props.peek(index));
            Ok(PropertyValue::Range(p.range_min, p.range_max))
        }
        PropertyKind::Deadzone => {
            let index = resolve_axis_index(controller, target)?;
            let p = controller.with_properties(|props| props.peek(index));
            Ok(PropertyValue::Deadzone(p.deadzone))
        }
        PropertyKind::Saturation => {
            let index = resolve_axis_index(controller, target)?;
            let p = controller.with_properties(|props| props.peek(index));
            Ok(PropertyValue::Saturation(p.saturation))
        }
    }
}

/// Writes a property. Validates the value against §4.3's bounds and commits under the
/// properties table's own lock (the `VirtualController`'s single mutex) on success.
pub fn set_property(
    controller: &VirtualController,
    kind: PropertyKind,
    target: PropertyTarget,
    value: PropertyValue,
) -> Result<(), CoreError> {
    match (kind, value) {
        (PropertyKind::AxisMode, PropertyValue::AxisMode(mode)) => {
            if target != PropertyTarget::WholeDevice {
                return Err(CoreError::InvalidParam);
            }
            match mode {
                // Always already true: every write of `Absolute` is, by definition, a no-op.
                AxisMode::Absolute => Err(CoreError::NoEffect),
                AxisMode::Relative => Err(CoreError::Unsupported),
            }
        }
        (PropertyKind::Range, PropertyValue::Range(lo, hi)) => {
            match target {
                PropertyTarget::WholeDevice => {
                    let axis_count = controller.profile().count_of(EVKind::Axis);
                    controller.with_properties(|p| p.set_range_all(axis_count, lo, hi))?;
                }
                _ => {
                    let index = resolve_axis_index(controller, target)?;
                    controller.with_properties(|p| p.set_range(index, lo, hi))?;
                }
            }
            debug!("SetProperty: Range target={:?} -> ({}, {})", target, lo, hi);
            Ok(())
        }
        (PropertyKind::Deadzone, PropertyValue::Deadzone(dz)) => {
            match target {
                PropertyTarget::WholeDevice => {
                    let axis_count = controller.profile().count_of(EVKind::Axis);
                    controller.with_properties(|p| p.set_deadzone_all(axis_count, dz))?;
                }
                _ => {
                    let index = resolve_axis_index(controller, target)?;
                    controller.with_properties(|p| p.set_deadzone(index, dz))?;
                }
            }
            debug!("SetProperty: Deadzone target={:?} -> {}", target, dz);
            Ok(())
        }
        (PropertyKind::Saturation, PropertyValue::Saturation(sat)) => {
            match target {
                PropertyTarget::WholeDevice => {
                    let axis_count = controller.profile().count_of(EVKind::Axis);
                    controller.with_properties(|p| p.set_saturation_all(axis_count, sat))?;
                }
                _ => {
                    let index = resolve_axis_index(controller, target)?;
                    controller.with_properties(|p| p.set_saturation(index, sat))?;
                }
            }
            debug!("SetProperty: Saturation target={:?} -> {}", target, sat);
            Ok(())
        }
        _ => Err(CoreError::InvalidParam),
    }
}
