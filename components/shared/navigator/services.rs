/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Engine services the navigator forwards to.

use std::rc::Rc;

use bitflags::bitflags;
use url::Url;

use crate::window::{Window, WindowId};
use crate::{ErrorResult, Fallible};

/// The strings the HTTP protocol handler sends in requests and exposes to script.
pub trait HttpProtocolHandler {
    fn user_agent(&self) -> Fallible<String>;
    /// The application code name, "Mozilla".
    fn app_name(&self) -> Fallible<String>;
    fn app_version(&self) -> Fallible<String>;
    /// The windowing platform, e.g. "X11" or "Windows".
    fn platform(&self) -> Fallible<String>;
    /// The operating system and CPU, e.g. "Linux x86_64".
    fn oscpu(&self) -> Fallible<String>;
}

pub trait NetworkStatus {
    fn is_offline(&self) -> bool;
}

/// The hardware vibration backend.
pub trait Vibrator {
    /// Start playing `pattern` (alternating vibration and pause durations, in
    /// milliseconds) on behalf of `window`, replacing any pattern already playing.
    fn vibrate(&self, pattern: &[u32], window: WindowId);

    /// Stop the pattern started by `window`. Patterns started by other windows keep
    /// playing.
    fn cancel_vibrate(&self, window: WindowId);
}

bitflags! {
    /// Load flags understood by [`CacheQuery::is_available`].
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct LoadFlags: u32 {
        const LOAD_FROM_CACHE = 1 << 0;
        const INHIBIT_CACHING = 1 << 1;
        const LOAD_NO_NETWORK_IO = 1 << 2;
        const LOAD_ONLY_IF_MODIFIED = 1 << 3;
        const LOAD_BYPASS_LOCAL_CACHE_IF_BUSY = 1 << 4;
        const LOAD_CHECK_OFFLINE_CACHE = 1 << 5;
        const LOAD_ONLY_FROM_CACHE = 1 << 6;
    }
}

/// A synchronous query of the HTTP cache. The caller's thread waits for the answer.
pub trait CacheQuery {
    /// Whether `url` can be loaded from cache with a successful response, without
    /// touching the network.
    fn is_available(&self, url: &Url, flags: LoadFlags) -> Fallible<bool>;
}

pub trait WakeLock {
    fn topic(&self) -> String;
    fn unlock(&self) -> ErrorResult;
}

pub trait PowerManagerService {
    fn new_wake_lock(&self, topic: &str, window: &Rc<dyn Window>) -> Fallible<Rc<dyn WakeLock>>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaStreamOptions {
    pub audio: bool,
    pub video: bool,
    pub picture: bool,
    pub fake: bool,
    pub camera: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MediaDeviceKind {
    AudioInput,
    VideoInput,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MediaDevice {
    pub kind: MediaDeviceKind,
    pub name: String,
}

pub trait MediaStream {
    fn id(&self) -> String;
}

pub type GetUserMediaSuccessCallback = Box<dyn FnOnce(Rc<dyn MediaStream>)>;
pub type GetUserMediaErrorCallback = Box<dyn FnOnce(String)>;
pub type GetUserMediaDevicesSuccessCallback = Box<dyn FnOnce(Vec<MediaDevice>)>;

/// Grants access to cameras and microphones. Callbacks run later, on the script thread.
pub trait MediaManager {
    fn get_user_media(
        &self,
        privileged: bool,
        window: WindowId,
        options: MediaStreamOptions,
        on_success: GetUserMediaSuccessCallback,
        on_error: GetUserMediaErrorCallback,
    ) -> ErrorResult;

    fn get_user_media_devices(
        &self,
        window: WindowId,
        on_success: GetUserMediaDevicesSuccessCallback,
        on_error: GetUserMediaErrorCallback,
    ) -> ErrorResult;

    /// Stop streams and drop pending requests of `window`.
    fn on_navigation(&self, window: WindowId);
}

/// <https://html.spec.whatwg.org/multipage/#custom-handlers>
pub trait ContentHandlerRegistrar {
    fn register_content_handler(
        &self,
        mime_type: &str,
        uri: &str,
        title: &str,
        window: WindowId,
    ) -> ErrorResult;

    fn register_protocol_handler(
        &self,
        scheme: &str,
        uri: &str,
        title: &str,
        window: WindowId,
    ) -> ErrorResult;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CookieAccess {
    /// No exception is stored; the global cookie behavior applies.
    Default,
    Allow,
    Deny,
    Session,
}

/// Per-site exceptions to the global cookie behavior.
pub trait CookiePermission {
    fn can_access(&self, url: &Url) -> Fallible<CookieAccess>;
}

/// Per-site user agent overrides.
pub trait SiteSpecificUserAgent {
    fn user_agent_for_url(&self, url: &Url, window: WindowId, default: &str) -> Fallible<String>;
}

pub trait AppInfo {
    fn app_build_id(&self) -> Fallible<String>;
}
