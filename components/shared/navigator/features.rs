/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The objects the navigator creates on demand and the factory that builds them.

use std::rc::Rc;

use strum::Display;

use crate::window::{Window, WindowId};
use crate::{ErrorResult, Fallible};

/// The kinds of feature object that are created through [`FeatureFactory::create`].
/// Plugins, MIME types, cameras, system messages and device storage have richer
/// interfaces and their own factory methods.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum FeatureKind {
    Geolocation,
    DesktopNotification,
    Battery,
    Power,
    Sms,
    MobileMessage,
    CellBroadcast,
    Telephony,
    Voicemail,
    IccManager,
    Connection,
    MobileConnection,
    Bluetooth,
    AudioChannelManager,
    Time,
}

/// A feature object handed out by the navigator. Objects that hold timers, listeners
/// or native service handles release them in `shutdown`, which the navigator calls
/// when it is invalidated.
pub trait FeatureObject {
    fn kind(&self) -> FeatureKind;

    fn shutdown(&self) {}
}

/// <https://html.spec.whatwg.org/multipage/#pluginarray>
pub trait PluginArray {
    fn init(&self);
    fn refresh(&self);
    /// Drop every plugin and stop observing plugin changes.
    fn invalidate(&self);
}

/// <https://html.spec.whatwg.org/multipage/#mimetypearray>
pub trait MimeTypeArray {
    fn refresh(&self);
    /// Whether `mime_type` is known and handled by an enabled plugin.
    fn has_enabled_plugin(&self, mime_type: &str) -> bool;
}

pub trait CameraManager {
    /// Release the cameras held on behalf of `window` when it navigates away.
    fn on_navigation(&self, window: WindowId);
}

pub trait SystemMessageCallback {
    fn handle_message(&self, message: &str);
}

pub trait SystemMessageManager {
    fn has_pending_message(&self, message_type: &str) -> Fallible<bool>;

    fn set_message_handler(
        &self,
        message_type: &str,
        callback: Option<Rc<dyn SystemMessageCallback>>,
    ) -> ErrorResult;
}

pub trait DeviceStorage {
    fn storage_type(&self) -> String;
    fn shutdown(&self);
}

/// Builds the feature objects of a window. Every method may consult services that live
/// outside of script, and errors they report are passed to script unchanged.
pub trait FeatureFactory {
    /// Create a feature object of `kind` for `window`. `Ok(None)` means the backing
    /// service is not available.
    fn create(
        &self,
        kind: FeatureKind,
        window: &Rc<dyn Window>,
    ) -> Fallible<Option<Rc<dyn FeatureObject>>>;

    fn create_plugin_array(&self, window: &Rc<dyn Window>) -> Rc<dyn PluginArray>;

    fn create_mime_type_array(&self, window: &Rc<dyn Window>) -> Rc<dyn MimeTypeArray>;

    fn create_camera_manager(&self, window: &Rc<dyn Window>) -> Option<Rc<dyn CameraManager>>;

    fn create_system_message_manager(
        &self,
        window: &Rc<dyn Window>,
    ) -> Fallible<Rc<dyn SystemMessageManager>>;

    /// The default store of `storage_type` ("pictures", "music", "sdcard", ...).
    fn create_device_storage(
        &self,
        window: &Rc<dyn Window>,
        storage_type: &str,
    ) -> Option<Rc<dyn DeviceStorage>>;

    /// Every store of `storage_type`.
    fn create_device_storages(
        &self,
        window: &Rc<dyn Window>,
        storage_type: &str,
    ) -> Vec<Rc<dyn DeviceStorage>>;
}
