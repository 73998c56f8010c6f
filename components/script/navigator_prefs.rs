/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Preferences the navigator consults on hot paths. They are read from the store once and
//! then kept current by the store's change notifications, so reading them never touches
//! the store's lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::debug;
use servo_config::prefs::{Observer, PrefValue, PreferenceStore};

const DO_NOT_TRACK: &str = "privacy.donottrackheader.enabled";
const VIBRATOR_ENABLED: &str = "dom.vibrator.enabled";
const MAX_VIBRATE_MS: &str = "dom.vibrator.max_vibrate_ms";
const MAX_VIBRATE_LIST_LEN: &str = "dom.vibrator.max_vibrate_list_len";

pub struct NavigatorPrefCache {
    do_not_track: AtomicBool,
    vibrator_enabled: AtomicBool,
    max_vibrate_ms: AtomicU32,
    max_vibrate_list_len: AtomicU32,
}

/// Integer preferences are stored unsigned; negative values read as zero.
fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

impl NavigatorPrefCache {
    /// Snapshot the current values of `prefs` and subscribe to later changes.
    pub fn new(prefs: &PreferenceStore) -> Arc<NavigatorPrefCache> {
        let cache = {
            let current = prefs.get();
            Arc::new(NavigatorPrefCache {
                do_not_track: AtomicBool::new(current.privacy_donottrackheader_enabled),
                vibrator_enabled: AtomicBool::new(current.dom_vibrator_enabled),
                max_vibrate_ms: AtomicU32::new(to_u32(current.dom_vibrator_max_vibrate_ms)),
                max_vibrate_list_len: AtomicU32::new(to_u32(
                    current.dom_vibrator_max_vibrate_list_len,
                )),
            })
        };
        prefs.add_observer(cache.clone());
        cache
    }

    pub fn do_not_track_enabled(&self) -> bool {
        self.do_not_track.load(Ordering::Relaxed)
    }

    pub fn vibrator_enabled(&self) -> bool {
        self.vibrator_enabled.load(Ordering::Relaxed)
    }

    pub fn max_vibrate_ms(&self) -> u32 {
        self.max_vibrate_ms.load(Ordering::Relaxed)
    }

    pub fn max_vibrate_list_len(&self) -> u32 {
        self.max_vibrate_list_len.load(Ordering::Relaxed)
    }
}

impl Observer for NavigatorPrefCache {
    fn prefs_changed(&self, changes: &[(&'static str, PrefValue)]) {
        for (name, value) in changes {
            match (*name, value) {
                (DO_NOT_TRACK, PrefValue::Bool(enabled)) => {
                    self.do_not_track.store(*enabled, Ordering::Relaxed)
                },
                (VIBRATOR_ENABLED, PrefValue::Bool(enabled)) => {
                    self.vibrator_enabled.store(*enabled, Ordering::Relaxed)
                },
                (MAX_VIBRATE_MS, PrefValue::Int(value)) => {
                    self.max_vibrate_ms.store(to_u32(*value), Ordering::Relaxed)
                },
                (MAX_VIBRATE_LIST_LEN, PrefValue::Int(value)) => self
                    .max_vibrate_list_len
                    .store(to_u32(*value), Ordering::Relaxed),
                _ => continue,
            }
            debug!("Navigator preference {} is now {:?}", name, value);
        }
    }
}
