/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use strum::{AsRefStr, Display};

use crate::window::Window;

/// The permission types that gate navigator features, named as the permission manager
/// stores them.
#[derive(AsRefStr, Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    Bluetooth,
    Camera,
    CellBroadcast,
    Idle,
    MobileConnection,
    MobileNetwork,
    Power,
    Sms,
    Telephony,
    Time,
    Voicemail,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PermissionAction {
    Unknown,
    Allow,
    Deny,
    Prompt,
}

/// Answers permission queries for a window's principal.
pub trait PermissionManager {
    fn test_permission_from_window(
        &self,
        window: &dyn Window,
        permission_type: &str,
    ) -> PermissionAction;
}
