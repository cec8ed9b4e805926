//! A controller translation engine: maps a polled XInput-shaped snapshot (button bitmask, two
//! analog sticks, two triggers) onto the data-format/property/event model legacy
//! DirectInput-style applications expect, per a named mapping profile.
//!
//! This crate never talks to real hardware. Callers supply an [`source::XInputSource`] (state
//! polling plus a buffered event queue) and, for force feedback, an [`ff::FfDevice`]; everything
//! else -- the mapper, the data format binder, the state writer, the event encoder, and the
//! virtual controller that ties them together -- lives here.

extern crate vec_map;

pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod event;
pub mod ff;
pub mod format;
pub mod profile;
pub mod properties;
pub mod property_api;
pub mod source;
pub mod types;
pub mod writer;

#[cfg(test)]
pub(crate) mod testutil;

pub use controller::VirtualController;
pub use error::CoreError;
pub use profile::{MappingProfile, ProfileKind};
