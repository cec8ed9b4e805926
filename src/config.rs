// Copyright 2016 GilRs Developers
// Copyright 2024 xidi-core Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Turns one already-fetched configuration string into a [`ProfileKind`], once per process.

use crate::profile::ProfileKind;
use log::{debug, warn};
use std::sync::OnceLock;

static RESOLVED: OnceLock<ProfileKind> = OnceLock::new();

/// Resolves `raw` to a [`ProfileKind`], memoising the first result for the rest of the
/// process's lifetime: later calls (even with different `raw` values) return that same answer.
/// This mirrors the "once-flag" the configuration this was ported from used for its own
/// process-global mapper type.
pub fn resolve_profile_kind(raw: Option<&str>) -> ProfileKind {
    *RESOLVED.get_or_init(|| {
        let kind = match raw {
            Some("StandardGamepad") => ProfileKind::StandardGamepad,
            Some("ExtendedGamepad") => ProfileKind::ExtendedGamepad,
            Some("XInputNative") => ProfileKind::XInputNative,
            Some("XInputSharedTriggers") => ProfileKind::XInputSharedTriggers,
            Some(other) => {
                warn!("unrecognised mapping profile {:?}, falling back to XInputNative", other);
                ProfileKind::XInputNative
            }
            None => {
                warn!("no mapping profile configured, falling back to XInputNative");
                ProfileKind::XInputNative
            }
        };
        debug!("resolved mapping profile: raw={:?} kind={}", raw, kind.name());
        kind
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // `resolve_profile_kind` memoises through a process-global `OnceLock`, so only the first
    // call in the whole test binary actually resolves anything -- every later call, with any
    // input, must echo that same answer back. That's the one property a unit test can pin down
    // without depending on call order.
    #[test]
    fn second_call_echoes_first_regardless_of_input() {
        let first = resolve_profile_kind(Some("XInputSharedTriggers"));
        let second = resolve_profile_kind(Some("StandardGamepad"));
        let third = resolve_profile_kind(None);
        assert_eq!(first, second);
        assert_eq!(second, third);
    }
}
