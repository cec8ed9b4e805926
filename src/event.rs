// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The Event Encoder: turns a physical-element event queue into the mapped-offset form
//! buffered consumers expect.

use crate::constants::*;
use crate::error::CoreError;
use crate::format::DataFormatBinding;
use crate::profile::MappingProfile;
use crate::properties::{self, AxisProperties};
use crate::source::{PhysEvent, XInputSource};
use crate::types::{self, EPhysElem, EVKind};
use log::{trace, warn};

/// One event in the caller's mapped-offset format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppEvent {
    pub seq: u64,
    pub timestamp: u64,
    pub offset: u32,
    pub data: i32,
}

/// Whether a batch consumes the events it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Peek,
    Drain,
}

/// Tracks the last-seen raw trigger value on each side so a shared-trigger axis can be
/// recomputed from a single updated trigger without needing the other trigger's event too.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerCache {
    lt: i32,
    rt: i32,
}

impl TriggerCache {
    pub fn new() -> Self {
        TriggerCache::default()
    }
}

/// Encodes up to `max` buffered events from `source` into the caller's mapped form.
///
/// Returns `(events, overflowed)`; `overflowed` is true exactly when the source's event buffer
/// was already overflowed at the moment the lock was acquired (§4.6). The source's
/// event-buffer lock is held for the duration of the call and released before returning.
pub fn encode_batch(
    profile: &MappingProfile,
    properties: &mut AxisProperties,
    binding: &DataFormatBinding,
    source: &dyn XInputSource,
    cache: &mut TriggerCache,
    max: u32,
    mode: ReadMode,
) -> Result<(Vec<AppEvent>, bool), CoreError> {
    source.lock_event_buffer();
    let result = (|| {
        let overflowed = source.is_overflowed();
        let available = source.buffered_count();
        let mut out = Vec::new();
        let mut consumed = 0u32;

        while consumed < available && out.len() < max as usize {
            let ev = source.peek(consumed);
            consumed += 1;
            if let Some(app_event) = encode_one(profile, properties, binding, cache, ev)? {
                out.push(app_event);
            }
        }

        if mode == ReadMode::Drain {
            for _ in 0..consumed {
                source.pop();
            }
        }

        trace!("getBufferedEvents: {} encoded, overflow={}", out.len(), overflowed);
        if overflowed {
            warn!("getBufferedEvents: source event buffer overflowed");
        }
        Ok((out, overflowed))
    })();
    source.unlock_event_buffer();
    result
}

fn encode_one(
    profile: &MappingProfile,
    properties: &mut AxisProperties,
    binding: &DataFormatBinding,
    cache: &mut TriggerCache,
    ev: PhysEvent,
) -> Result<Option<AppEvent>, CoreError> {
    let vid = match profile.virt(ev.elem) {
        Some(vid) => vid,
        None => return Ok(None),
    };
    let offset = binding.offset_of(vid);
    if offset == OFFSET_UNUSED {
        return Ok(None);
    }

    let data = match (ev.elem, vid.kind) {
        (EPhysElem::TriggerLT, EVKind::Axis) | (EPhysElem::TriggerRT, EVKind::Axis) => {
            if ev.elem == EPhysElem::TriggerLT {
                cache.lt = ev.value;
            } else {
                cache.rt = ev.value;
            }
            if profile.is_shared_trigger_axis() {
                let m = profile.shared_dir(ev.elem).ok_or(CoreError::Generic)?;
                let s = m * cache.lt + (-m) * cache.rt;
                let p = properties.get(vid.index);
                let remapped = types::remap(s, -TRIGGER_MAX, TRIGGER_MAX, p.range_min, p.range_max);
                properties::apply(remapped, p)
            } else {
                let p = properties.get(vid.index);
                let remapped = types::remap(ev.value, TRIGGER_MIN, TRIGGER_MAX, p.range_min, p.range_max);
                properties::apply(remapped, p)
            }
        }
        (EPhysElem::TriggerLT, EVKind::Button) | (EPhysElem::TriggerRT, EVKind::Button) => {
            if ev.value > TRIGGER_BUTTON_THRESHOLD { BUTTON_PRESSED as i32 } else { BUTTON_RELEASED as i32 }
        }
        (_, EVKind::Axis) => {
            let raw = if ev.elem.is_vertical_stick() { types::invert(ev.value, STICK_MIN, STICK_MAX) } else { ev.value };
            let p = properties.get(vid.index);
            let remapped = types::remap(raw, STICK_MIN, STICK_MAX, p.range_min, p.range_max);
            properties::apply(remapped, p)
        }
        (_, EVKind::Button) => {
            if ev.value != 0 { BUTTON_PRESSED as i32 } else { BUTTON_RELEASED as i32 }
        }
        (_, EVKind::Pov) => ev.value,
    };

    Ok(Some(AppEvent { seq: ev.seq, timestamp: ev.timestamp, offset, data }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{self, InstanceSelector, KindMask, ObjectIdentity, ObjectRequest};
    use crate::profile::ProfileKind;
    use crate::testutil::FakeSource;

    fn axis_req(offset: u32) -> ObjectRequest {
        ObjectRequest { kind_mask: KindMask::AXIS, identity: ObjectIdentity::None, instance: InstanceSelector::Any, byte_offset: offset }
    }

    #[test]
    fn peek_does_not_change_buffered_count() {
        let profile = ProfileKind::XInputNative.build();
        let binding = format::bind(&profile, &[axis_req(0)], 4).unwrap();
        let mut properties = AxisProperties::new();
        let mut cache = TriggerCache::new();
        let source = FakeSource::new();
        source.push(PhysEvent { elem: EPhysElem::StickLeftH, value: 100, seq: 1, timestamp: 1 });

        let before = source.buffered_count();
        let (events, _) = encode_batch(&profile, &mut properties, &binding, &source, &mut cache, 10, ReadMode::Peek).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(source.buffered_count(), before);
    }

    #[test]
    fn drain_consumes_unmapped_events_too() {
        let profile = ProfileKind::StandardGamepad.build(); // drops triggers
        let binding = format::bind(&profile, &[], 0).unwrap();
        let mut properties = AxisProperties::new();
        let mut cache = TriggerCache::new();
        let source = FakeSource::new();
        source.push(PhysEvent { elem: EPhysElem::TriggerLT, value: 200, seq: 1, timestamp: 1 });
        source.push(PhysEvent { elem: EPhysElem::TriggerLT, value: 210, seq: 2, timestamp: 2 });

        let (events, _) = encode_batch(&profile, &mut properties, &binding, &source, &mut cache, 10, ReadMode::Drain).unwrap();
        assert!(events.is_empty());
        assert_eq!(source.buffered_count(), 0);
    }

    #[test]
    fn shared_trigger_axis_recomputes_from_cache() {
        let profile = ProfileKind::XInputSharedTriggers.build();
        let requests = [axis_req(16)]; // axis index 4 is the shared trigger axis; bind offset 16
        let binding_requests: Vec<_> = (0..5).map(|i| axis_req(i * 4)).collect();
        let binding = format::bind(&profile, &binding_requests, 20).unwrap();
        let _ = requests;
        let mut properties = AxisProperties::new();
        let mut cache = TriggerCache::new();
        let source = FakeSource::new();
        source.push(PhysEvent { elem: EPhysElem::TriggerLT, value: 255, seq: 1, timestamp: 1 });

        let (events, _) = encode_batch(&profile, &mut properties, &binding, &source, &mut cache, 10, ReadMode::Drain).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, 32767);
        assert_eq!(events[0].offset, 16);
    }
}
