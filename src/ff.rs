// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Force-feedback passthrough: the envelope/replay math and effect table the core owns, up to
//! the point of handing a motor magnitude to a borrowed [`FfDevice`].

use crate::error::CoreError;
use vec_map::VecMap;

/// The two physical rumble motors XInput exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Magnitude {
    pub strong: u16,
    pub weak: u16,
}

impl Magnitude {
    pub const ZERO: Magnitude = Magnitude { strong: 0, weak: 0 };

    fn scale(self, weight: f32) -> Magnitude {
        Magnitude {
            strong: (self.strong as f32 * weight) as u16,
            weak: (self.weak as f32 * weight) as u16,
        }
    }
}

/// Attack/fade shaping around a `BaseEffect`'s sustained magnitude, in the shape the legacy
/// API's effect-parameter struct carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectEnvelope {
    pub attack_length_ms: u32,
    pub attack_level: u16,
    pub fade_length_ms: u32,
    pub fade_level: u16,
}

impl EffectEnvelope {
    /// Weight in `[0.0, 1.0]` at `elapsed_ms` into a replay of total `duration_ms`, ramping from
    /// `attack_level` up to full during the attack and down to `fade_level` during the fade.
    fn weight_at(&self, elapsed_ms: u32, duration_ms: u32) -> f32 {
        let full = u16::MAX as f32;

        if self.attack_length_ms > 0 && elapsed_ms < self.attack_length_ms {
            let t = elapsed_ms as f32 / self.attack_length_ms as f32;
            let start = self.attack_level as f32 / full;
            return start + (1.0 - start) * t;
        }

        if self.fade_length_ms > 0 && duration_ms >= self.fade_length_ms && elapsed_ms + self.fade_length_ms >= duration_ms {
            let remaining = duration_ms.saturating_sub(elapsed_ms);
            let t = remaining as f32 / self.fade_length_ms as f32;
            let end = self.fade_level as f32 / full;
            return end + (1.0 - end) * t;
        }

        1.0
    }
}

/// The scheduling window a `BaseEffect` plays within: starts `start_delay_ms` after the effect
/// is triggered and lasts `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replay {
    pub start_delay_ms: u32,
    pub duration_ms: u32,
}

/// A rumble effect's steady-state magnitude plus the envelope shaping applied around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseEffect {
    pub kind: Magnitude,
    pub envelope: EffectEnvelope,
}

/// Envelope-weighted instantaneous magnitude at `elapsed_ms` since the effect was triggered;
/// zero outside the replay window.
pub fn magnitude_at(effect: &BaseEffect, replay: &Replay, elapsed_ms: u32) -> Magnitude {
    if elapsed_ms < replay.start_delay_ms {
        return Magnitude::ZERO;
    }
    let local = elapsed_ms - replay.start_delay_ms;
    if local >= replay.duration_ms {
        return Magnitude::ZERO;
    }
    let weight = effect.envelope.weight_at(local, replay.duration_ms);
    effect.kind.scale(weight)
}

/// The borrowed capability that actually drives the motors. Never constructed or owned by this
/// crate, mirroring `XInputSource`.
pub trait FfDevice {
    fn set_ff_state(&self, strong: u16, weak: u16);
}

/// A small fixed-capacity registry of uploaded effects, keyed by a caller-assigned id.
#[derive(Debug, Clone)]
pub struct EffectTable {
    capacity: usize,
    entries: VecMap<(BaseEffect, Replay)>,
}

impl EffectTable {
    pub fn new(capacity: usize) -> Self {
        EffectTable { capacity, entries: VecMap::new() }
    }

    pub fn upload(&mut self, id: u32, effect: BaseEffect, replay: Replay) -> Result<(), CoreError> {
        if !self.entries.contains_key(id as usize) && self.entries.len() >= self.capacity {
            return Err(CoreError::NotEnoughSpace);
        }
        self.entries.insert(id as usize, (effect, replay));
        Ok(())
    }

    pub fn play(&self, id: u32, device: &dyn FfDevice, elapsed_ms: u32) -> Result<(), CoreError> {
        let (effect, replay) = self.entries.get(id as usize).ok_or(CoreError::InvalidId)?;
        let m = magnitude_at(effect, replay, elapsed_ms);
        device.set_ff_state(m.strong, m.weak);
        Ok(())
    }

    pub fn stop(&self, id: u32, device: &dyn FfDevice) -> Result<(), CoreError> {
        self.entries.get(id as usize).ok_or(CoreError::InvalidId)?;
        device.set_ff_state(0, 0);
        Ok(())
    }

    pub fn remove(&mut self, id: u32) -> Result<(), CoreError> {
        self.entries.remove(id as usize).ok_or(CoreError::InvalidId)?;
        Ok(())
    }
}
