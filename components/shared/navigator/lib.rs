/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Interfaces between the script navigator and the engine services it delegates to.
//! Script only ever talks to these traits; the embedder decides what implements them.

#![deny(unsafe_code)]

mod error;
pub mod features;
pub mod permissions;
pub mod services;
pub mod window;

pub use crate::error::{Error, ErrorResult, Fallible};
pub use crate::features::{
    CameraManager, DeviceStorage, FeatureFactory, FeatureKind, FeatureObject, MimeTypeArray,
    PluginArray, SystemMessageCallback, SystemMessageManager,
};
pub use crate::permissions::{Permission, PermissionAction, PermissionManager};
pub use crate::services::{
    AppInfo, CacheQuery, ContentHandlerRegistrar, CookieAccess, CookiePermission,
    HttpProtocolHandler, LoadFlags, MediaDevice, MediaDeviceKind, MediaManager, MediaStream,
    MediaStreamOptions, NetworkStatus, PowerManagerService, SiteSpecificUserAgent, Vibrator,
    WakeLock,
};
pub use crate::window::{
    Document, Gamepad, IdleObserver, ListenerId, VisibilityListener, Window, WindowId,
};
