/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![deny(unsafe_code)]
#![doc = "The script crate contains the navigator object and the state it shares with the rest of the DOM."]

pub mod navigator_prefs;

/// The implementation of the DOM.
pub mod dom {
    pub mod bindings {
        pub mod cell;
    }

    pub mod navigator;
    pub mod navigatorinfo;
    pub mod vibration;
}
