// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Per-axis range/deadzone/saturation properties and the transform they drive.

use crate::constants::*;
use crate::error::CoreError;
use vec_map::VecMap;

/// `{rangeMin, rangeMax, deadzone, saturation}` for a single virtual axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisProperty {
    pub range_min: i32,
    pub range_max: i32,
    pub deadzone: u32,
    pub saturation: u32,
}

impl Default for AxisProperty {
    fn default() -> Self {
        AxisProperty {
            range_min: DEFAULT_RANGE_MIN,
            range_max: DEFAULT_RANGE_MAX,
            deadzone: DZ_MIN,
            saturation: SAT_MAX,
        }
    }
}

/// Table of [`AxisProperty`] entries, one per virtual axis, lazily initialised to defaults.
///
/// This mirrors the cached, index-addressed state `GamepadState` keeps for buttons and axes
/// (see `ev::state`): storage is a dense [`VecMap`] keyed by axis index rather than a `Vec`,
/// since axes may be queried out of order before every index has been touched.
#[derive(Debug, Clone, Default)]
pub struct AxisProperties {
    entries: VecMap<AxisProperty>,
}

impl AxisProperties {
    pub fn new() -> Self {
        AxisProperties { entries: VecMap::new() }
    }

    /// Returns the property for `axis`, materialising the default if this is the first touch.
    pub fn get(&mut self, axis: u16) -> AxisProperty {
        *self.entries.entry(axis as usize).or_insert_with(AxisProperty::default)
    }

    /// Read-only variant for callers that must not mutate (e.g. a read-only handle under a
    /// shared lock); returns defaults for an axis that has never been touched.
    pub fn peek(&self, axis: u16) -> AxisProperty {
        self.entries.get(axis as usize).copied().unwrap_or_default()
    }

    pub fn set_range(&mut self, axis: u16, lo: i32, hi: i32) -> Result<(), CoreError> {
        if lo >= hi {
            return Err(CoreError::InvalidParam);
        }
        let mut p = self.get(axis);
        p.range_min = lo;
        p.range_max = hi;
        self.entries.insert(axis as usize, p);
        Ok(())
    }

    pub fn set_deadzone(&mut self, axis: u16, deadzone: u32) -> Result<(), CoreError> {
        if !(DZ_MIN..=DZ_MAX).contains(&deadzone) {
            return Err(CoreError::InvalidParam);
        }
        let mut p = self.get(axis);
        p.deadzone = deadzone;
        self.entries.insert(axis as usize, p);
        Ok(())
    }

    pub fn set_saturation(&mut self, axis: u16, saturation: u32) -> Result<(), CoreError> {
        if !(SAT_MIN..=SAT_MAX).contains(&saturation) {
            return Err(CoreError::InvalidParam);
        }
        let mut p = self.get(axis);
        p.saturation = saturation;
        self.entries.insert(axis as usize, p);
        Ok(())
    }

    /// Applies `f` to every axis in `0..axis_count`, atomically: if `f` rejects any axis, no
    /// axis is mutated.
    fn set_bulk<F>(&mut self, axis_count: u16, mut f: F) -> Result<(), CoreError>
    where
        F: FnMut(&mut AxisProperty) -> Result<(), CoreError>,
    {
        let mut staged: Vec<(u16, AxisProperty)> = Vec::with_capacity(axis_count as usize);
        for axis in 0..axis_count {
            let mut p = self.get(axis);
            f(&mut p)?;
            staged.push((axis, p));
        }
        for (axis, p) in staged {
            self.entries.insert(axis as usize, p);
        }
        Ok(())
    }

    pub fn set_range_all(&mut self, axis_count: u16, lo: i32, hi: i32) -> Result<(), CoreError> {
        if lo >= hi {
            return Err(CoreError::InvalidParam);
        }
        self.set_bulk(axis_count, |p| {
            p.range_min = lo;
            p.range_max = hi;
            Ok(())
        })
    }

    pub fn set_deadzone_all(&mut self, axis_count: u16, deadzone: u32) -> Result<(), CoreError> {
        if !(DZ_MIN..=DZ_MAX).contains(&deadzone) {
            return Err(CoreError::InvalidParam);
        }
        self.set_bulk(axis_count, |p| {
            p.deadzone = deadzone;
            Ok(())
        })
    }

    pub fn set_saturation_all(&mut self, axis_count: u16, saturation: u32) -> Result<(), CoreError> {
        if !(SAT_MIN..=SAT_MAX).contains(&saturation) {
            return Err(CoreError::InvalidParam);
        }
        self.set_bulk(axis_count, |p| {
            p.saturation = saturation;
            Ok(())
        })
    }
}

/// Applies the deadzone/saturation transform to a value already expressed in the axis's own
/// output range, i.e. `v` has already been through [`crate::types::remap`] (and, for vertical
/// sticks, [`crate::types::invert`] first) into `[P.range_min, P.range_max]`. This is the
/// "axis transform" §4.5 calls out after its remap step, unified (per the project's own design
/// notes) so the immediate and buffered paths compute identical numbers.
pub fn apply(v: i32, p: AxisProperty) -> i32 {
    let mid = (p.range_min + p.range_max) / 2;
    let half = p.range_max - mid;
    let d = v - mid;

    if d == 0 {
        return mid;
    }

    let pct = (d.unsigned_abs() as u64 * SAT_MAX as u64) / half as u64;
    let pct = if pct <= p.deadzone as u64 {
        0
    } else if pct >= p.saturation as u64 {
        SAT_MAX as u64
    } else {
        crate::types::remap(pct as i32, p.deadzone as i32, p.saturation as i32, 0, SAT_MAX as i32) as u64
    };

    let sign: i32 = if d < 0 { -1 } else { 1 };
    mid + sign * ((half as i64 * pct as i64) / SAT_MAX as i64) as i32
}
