/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use log::{debug, warn};
use navigator_traits::services::{
    GetUserMediaDevicesSuccessCallback, GetUserMediaErrorCallback, GetUserMediaSuccessCallback,
};
use navigator_traits::{
    AppInfo, CacheQuery, CameraManager, ContentHandlerRegistrar, CookieAccess, CookiePermission,
    DeviceStorage, Document, Error, ErrorResult, Fallible, FeatureFactory, FeatureKind,
    FeatureObject, Gamepad, HttpProtocolHandler, IdleObserver, LoadFlags, MediaManager,
    MediaStreamOptions, MimeTypeArray, NetworkStatus, Permission, PermissionAction,
    PermissionManager, PluginArray, PowerManagerService, SiteSpecificUserAgent,
    SystemMessageCallback, SystemMessageManager, Vibrator, WakeLock, Window,
};
use servo_config::prefs::PreferenceStore;
use strum::EnumIter;
use url::Url;

use crate::dom::bindings::cell::MutNullable;
use crate::dom::navigatorinfo;
use crate::dom::vibration::{self, VibratePattern};
use crate::navigator_prefs::NavigatorPrefCache;

/// Value of `network.cookie.cookieBehavior` that rejects all cookies.
const COOKIE_BEHAVIOR_REJECT: i64 = 2;

/// The engine services shared by the navigators of every window. Optional services may be
/// missing from some configurations; the features that need them then report themselves
/// as unavailable.
pub struct NavigatorServices {
    pub prefs: Arc<PreferenceStore>,
    pub pref_cache: Arc<NavigatorPrefCache>,
    pub protocol_handler: Rc<dyn HttpProtocolHandler>,
    pub network_status: Rc<dyn NetworkStatus>,
    pub factory: Rc<dyn FeatureFactory>,
    pub vibrator: Rc<dyn Vibrator>,
    pub cache_query: Rc<dyn CacheQuery>,
    pub permissions: Option<Rc<dyn PermissionManager>>,
    pub power_manager: Option<Rc<dyn PowerManagerService>>,
    pub media_manager: Option<Rc<dyn MediaManager>>,
    pub content_handler_registrar: Option<Rc<dyn ContentHandlerRegistrar>>,
    pub cookie_permission: Option<Rc<dyn CookiePermission>>,
    pub site_specific_user_agent: Option<Rc<dyn SiteSpecificUserAgent>>,
    pub app_info: Option<Rc<dyn AppInfo>>,
}

impl NavigatorServices {
    /// Whether the permission manager allows `permission` for `window`. Without a
    /// permission manager nothing is allowed.
    pub fn check_permission(&self, window: &dyn Window, permission: Permission) -> bool {
        self.permissions.as_ref().is_some_and(|permissions| {
            permissions.test_permission_from_window(window, permission.as_ref()) ==
                PermissionAction::Allow
        })
    }

    fn has_mobile_message_support(&self, window: Option<&dyn Window>) -> bool {
        if !self.prefs.get().dom_sms_enabled {
            return false;
        }
        window.is_some_and(|window| {
            window.has_doc_shell() && self.check_permission(window, Permission::Sms)
        })
    }
}

/// Navigator members that are only exposed to some windows.
#[derive(Clone, Copy, Debug, EnumIter, Eq, PartialEq)]
pub enum NavigatorFeature {
    Battery,
    DesktopNotification,
    Power,
    Idle,
    WakeLock,
    Sms,
    MobileMessage,
    Camera,
    Telephony,
    MobileConnection,
    CellBroadcast,
    Voicemail,
    IccManager,
    Bluetooth,
    Time,
    UserMedia,
}

/// <https://html.spec.whatwg.org/multipage/#the-navigator-object>
///
/// One navigator exists per inner window. Every feature object is created on first
/// access and kept until the navigator is invalidated, which shuts them all down.
pub struct Navigator {
    window: RefCell<Option<Weak<dyn Window>>>,
    /// Set when invalidation starts. Nothing is created afterwards.
    torn_down: Cell<bool>,
    services: Rc<NavigatorServices>,
    plugins: MutNullable<dyn PluginArray>,
    mime_types: MutNullable<dyn MimeTypeArray>,
    geolocation: MutNullable<dyn FeatureObject>,
    notification: MutNullable<dyn FeatureObject>,
    battery_manager: MutNullable<dyn FeatureObject>,
    power_manager: MutNullable<dyn FeatureObject>,
    sms_manager: MutNullable<dyn FeatureObject>,
    mobile_message_manager: MutNullable<dyn FeatureObject>,
    cell_broadcast: MutNullable<dyn FeatureObject>,
    telephony: MutNullable<dyn FeatureObject>,
    voicemail: MutNullable<dyn FeatureObject>,
    icc_manager: MutNullable<dyn FeatureObject>,
    connection: MutNullable<dyn FeatureObject>,
    mobile_connection: MutNullable<dyn FeatureObject>,
    bluetooth: MutNullable<dyn FeatureObject>,
    audio_channel_manager: MutNullable<dyn FeatureObject>,
    time_manager: MutNullable<dyn FeatureObject>,
    camera_manager: MutNullable<dyn CameraManager>,
    messages_manager: MutNullable<dyn SystemMessageManager>,
    device_storage_stores: RefCell<Vec<Rc<dyn DeviceStorage>>>,
}

impl Navigator {
    pub fn new(window: &Rc<dyn Window>, services: Rc<NavigatorServices>) -> Rc<Navigator> {
        Rc::new(Navigator {
            window: RefCell::new(Some(Rc::downgrade(window))),
            torn_down: Cell::new(false),
            services,
            plugins: Default::default(),
            mime_types: Default::default(),
            geolocation: Default::default(),
            notification: Default::default(),
            battery_manager: Default::default(),
            power_manager: Default::default(),
            sms_manager: Default::default(),
            mobile_message_manager: Default::default(),
            cell_broadcast: Default::default(),
            telephony: Default::default(),
            voicemail: Default::default(),
            icc_manager: Default::default(),
            connection: Default::default(),
            mobile_connection: Default::default(),
            bluetooth: Default::default(),
            audio_channel_manager: Default::default(),
            time_manager: Default::default(),
            camera_manager: Default::default(),
            messages_manager: Default::default(),
            device_storage_stores: Default::default(),
        })
    }

    /// The owning window, as long as it is alive and the navigator has not been
    /// invalidated completely.
    fn window(&self) -> Option<Rc<dyn Window>> {
        self.window.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// The owning window, for paths that create something on its behalf.
    fn live_window(&self) -> Option<Rc<dyn Window>> {
        if self.torn_down.get() {
            return None;
        }
        self.window()
    }

    fn is_caller_chrome(&self) -> bool {
        self.window().is_some_and(|window| window.is_caller_chrome())
    }

    fn check_permission(&self, permission: Permission) -> bool {
        self.window()
            .is_some_and(|window| self.services.check_permission(&*window, permission))
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }

    fn slot(&self, kind: FeatureKind) -> &MutNullable<dyn FeatureObject> {
        match kind {
            FeatureKind::Geolocation => &self.geolocation,
            FeatureKind::DesktopNotification => &self.notification,
            FeatureKind::Battery => &self.battery_manager,
            FeatureKind::Power => &self.power_manager,
            FeatureKind::Sms => &self.sms_manager,
            FeatureKind::MobileMessage => &self.mobile_message_manager,
            FeatureKind::CellBroadcast => &self.cell_broadcast,
            FeatureKind::Telephony => &self.telephony,
            FeatureKind::Voicemail => &self.voicemail,
            FeatureKind::IccManager => &self.icc_manager,
            FeatureKind::Connection => &self.connection,
            FeatureKind::MobileConnection => &self.mobile_connection,
            FeatureKind::Bluetooth => &self.bluetooth,
            FeatureKind::AudioChannelManager => &self.audio_channel_manager,
            FeatureKind::Time => &self.time_manager,
        }
    }

    /// The cached feature object of `kind`, created through the factory on first use.
    fn feature(
        &self,
        kind: FeatureKind,
        window: &Rc<dyn Window>,
    ) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        self.slot(kind).or_try_init(|| {
            let object = self.services.factory.create(kind, window)?;
            if object.is_some() {
                debug!("Created {} for {:?}", kind, window.window_id());
            }
            Ok(object)
        })
    }

    /// Drop every feature object and release the window. Objects that need it are shut
    /// down first. Invalidating twice is harmless.
    pub fn invalidate(&self) {
        self.torn_down.set(true);

        if let Some(plugins) = self.plugins.take() {
            plugins.invalidate();
        }
        self.mime_types.take();

        // If there is a page transition, make sure to shut down geolocation.
        self.shut_down(FeatureKind::Geolocation);
        self.shut_down(FeatureKind::DesktopNotification);
        self.shut_down(FeatureKind::Battery);
        self.shut_down(FeatureKind::Power);
        self.shut_down(FeatureKind::Sms);
        self.shut_down(FeatureKind::MobileMessage);
        self.release(FeatureKind::Telephony);
        self.release(FeatureKind::Voicemail);
        self.shut_down(FeatureKind::Connection);
        self.shut_down(FeatureKind::MobileConnection);
        self.release(FeatureKind::CellBroadcast);
        self.shut_down(FeatureKind::IccManager);
        self.release(FeatureKind::Bluetooth);
        self.camera_manager.take();
        self.messages_manager.take();
        self.release(FeatureKind::AudioChannelManager);

        let stores = mem::take(&mut *self.device_storage_stores.borrow_mut());
        for store in stores {
            store.shutdown();
        }

        self.release(FeatureKind::Time);

        *self.window.borrow_mut() = None;
    }

    fn shut_down(&self, kind: FeatureKind) {
        if let Some(object) = self.slot(kind).take() {
            debug!("Shutting down {}", kind);
            object.shutdown();
        }
    }

    fn release(&self, kind: FeatureKind) {
        self.slot(kind).take();
    }

    /// Tell the services holding per-window state that the window navigated away.
    pub fn on_navigation(&self) {
        let Some(window) = self.window() else {
            return;
        };
        let window_id = window.window_id();

        // Live streams and pending callbacks have to go.
        if let Some(ref media_manager) = self.services.media_manager {
            media_manager.on_navigation(window_id);
        }
        if let Some(camera_manager) = self.camera_manager.get() {
            camera_manager.on_navigation(window_id);
        }
    }

    /// Whether `feature` is exposed to `window`.
    pub fn has_feature_support(
        services: &NavigatorServices,
        window: Option<&dyn Window>,
        feature: NavigatorFeature,
    ) -> bool {
        let permitted =
            |permission| window.is_some_and(|window| services.check_permission(window, permission));
        match feature {
            NavigatorFeature::Battery => services.prefs.get().dom_battery_enabled,
            NavigatorFeature::DesktopNotification => {
                services.prefs.get().notification_feature_enabled
            },
            NavigatorFeature::Power => permitted(Permission::Power),
            NavigatorFeature::Idle => {
                services.prefs.get().dom_idle_observers_api_enabled && permitted(Permission::Idle)
            },
            NavigatorFeature::WakeLock => services.power_manager.is_some(),
            NavigatorFeature::Sms | NavigatorFeature::MobileMessage => {
                services.has_mobile_message_support(window)
            },
            NavigatorFeature::Camera => permitted(Permission::Camera),
            NavigatorFeature::Telephony => permitted(Permission::Telephony),
            NavigatorFeature::MobileConnection => {
                permitted(Permission::MobileConnection) || permitted(Permission::MobileNetwork)
            },
            NavigatorFeature::CellBroadcast => permitted(Permission::CellBroadcast),
            NavigatorFeature::Voicemail => permitted(Permission::Voicemail),
            NavigatorFeature::IccManager => permitted(Permission::MobileConnection),
            NavigatorFeature::Bluetooth => permitted(Permission::Bluetooth),
            NavigatorFeature::Time => permitted(Permission::Time),
            NavigatorFeature::UserMedia => {
                let prefs = services.prefs.get();
                prefs.media_navigator_enabled || prefs.media_peerconnection_enabled
            },
        }
    }

    pub fn has_support(&self, feature: NavigatorFeature) -> bool {
        let window = self.window();
        Navigator::has_feature_support(&self.services, window.as_deref(), feature)
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        self.invalidate();
    }
}

// Identification strings.
impl Navigator {
    // https://html.spec.whatwg.org/multipage/#dom-navigator-useragent
    pub fn user_agent(&self) -> Fallible<String> {
        let user_agent = navigatorinfo::user_agent(&*self.services.protocol_handler)?;

        let Some(window) = self.window().filter(|window| window.has_doc_shell()) else {
            return Ok(user_agent);
        };
        let Some(url) = window.extant_document().and_then(|document| document.url()) else {
            return Ok(user_agent);
        };
        let Some(ref site_specific) = self.services.site_specific_user_agent else {
            return Ok(user_agent);
        };
        site_specific.user_agent_for_url(&url, window.window_id(), &user_agent)
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-appcodename
    pub fn app_code_name(&self) -> Fallible<String> {
        navigatorinfo::app_code_name(&*self.services.protocol_handler)
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-appname
    pub fn app_name(&self) -> String {
        let is_caller_chrome = self.is_caller_chrome();
        navigatorinfo::app_name(&self.services.prefs.get(), is_caller_chrome)
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-appversion
    pub fn app_version(&self) -> Fallible<String> {
        let is_caller_chrome = self.is_caller_chrome();
        let prefs = self.services.prefs.get().clone();
        navigatorinfo::app_version(&*self.services.protocol_handler, &prefs, is_caller_chrome)
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-platform
    pub fn platform(&self) -> Fallible<String> {
        let is_caller_chrome = self.is_caller_chrome();
        let prefs = self.services.prefs.get().clone();
        navigatorinfo::platform(&*self.services.protocol_handler, &prefs, is_caller_chrome)
    }

    pub fn oscpu(&self) -> Fallible<String> {
        let is_caller_chrome = self.is_caller_chrome();
        let prefs = self.services.prefs.get().clone();
        navigatorinfo::oscpu(&*self.services.protocol_handler, &prefs, is_caller_chrome)
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-language
    pub fn language(&self) -> String {
        navigatorinfo::language(&self.services.prefs.get().intl_accept_languages)
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-vendor
    pub fn vendor(&self) -> String {
        navigatorinfo::vendor()
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-vendorsub
    pub fn vendor_sub(&self) -> String {
        navigatorinfo::vendor_sub()
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-product
    pub fn product(&self) -> String {
        navigatorinfo::product()
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-productsub
    pub fn product_sub(&self) -> String {
        navigatorinfo::product_sub()
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-taintenabled
    pub fn taint_enabled(&self) -> bool {
        navigatorinfo::taint_enabled()
    }

    pub fn build_id(&self) -> Fallible<String> {
        let is_caller_chrome = self.is_caller_chrome();
        let prefs = self.services.prefs.get().clone();
        navigatorinfo::build_id(self.services.app_info.as_deref(), &prefs, is_caller_chrome)
    }

    pub fn do_not_track(&self) -> String {
        if self.services.pref_cache.do_not_track_enabled() {
            "yes".to_owned()
        } else {
            "unspecified".to_owned()
        }
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-cookieenabled
    pub fn cookie_enabled(&self) -> bool {
        let cookie_enabled =
            self.services.prefs.get().network_cookie_cookie_behavior != COOKIE_BEHAVIOR_REJECT;

        // A per-site exception overrides the global cookie behavior.
        let Some(window) = self.window().filter(|window| window.has_doc_shell()) else {
            return cookie_enabled;
        };
        let Some(url) = window.extant_document().and_then(|document| document.url()) else {
            return cookie_enabled;
        };
        let Some(ref cookie_permission) = self.services.cookie_permission else {
            return cookie_enabled;
        };
        match cookie_permission.can_access(&url) {
            Ok(CookieAccess::Default) | Err(_) => cookie_enabled,
            Ok(access) => access != CookieAccess::Deny,
        }
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-online
    pub fn on_line(&self) -> bool {
        !self.services.network_status.is_offline()
    }
}

// Plugins and MIME types.
impl Navigator {
    // https://html.spec.whatwg.org/multipage/#dom-navigator-plugins
    pub fn plugins(&self) -> Fallible<Rc<dyn PluginArray>> {
        if let Some(plugins) = self.plugins.get() {
            return Ok(plugins);
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        Ok(self.plugins.or_init(|| {
            let plugins = self.services.factory.create_plugin_array(&window);
            plugins.init();
            plugins
        }))
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-mimetypes
    pub fn mime_types(&self) -> Fallible<Rc<dyn MimeTypeArray>> {
        if let Some(mime_types) = self.mime_types.get() {
            return Ok(mime_types);
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        Ok(self
            .mime_types
            .or_init(|| self.services.factory.create_mime_type_array(&window)))
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-javaenabled
    pub fn java_enabled(&self) -> Fallible<bool> {
        let mime_types = self.mime_types()?;
        mime_types.refresh();
        Ok(mime_types.has_enabled_plugin("application/x-java-vm"))
    }

    pub fn refresh_mime_array(&self) {
        if let Some(mime_types) = self.mime_types.get() {
            mime_types.refresh();
        }
    }
}

// Vibration.
impl Navigator {
    /// The window and document a vibration would be played for, or `None` when the
    /// document is hidden. Hidden documents can neither start nor stop a vibration.
    fn vibration_target(&self) -> Fallible<Option<(Rc<dyn Window>, Rc<dyn Document>)>> {
        let window = self.window().ok_or(Error::Unexpected)?;
        let document = window.extant_document().ok_or(Error::Failure)?;
        if document.hidden() {
            return Ok(None);
        }
        Ok(Some((window, document)))
    }

    // https://w3c.github.io/vibration/#dom-navigator-vibrate
    pub fn vibrate(&self, pattern: VibratePattern) -> ErrorResult {
        // Script values are converted first, so a bad pattern throws even from a hidden
        // document.
        let pref_cache = &self.services.pref_cache;
        let pattern =
            pattern.to_durations(pref_cache.max_vibrate_ms(), pref_cache.max_vibrate_list_len())?;
        self.vibrate_pattern(&pattern)
    }

    pub fn vibrate_pattern(&self, pattern: &[u32]) -> ErrorResult {
        let Some((window, document)) = self.vibration_target()? else {
            return Ok(());
        };
        let pref_cache = &self.services.pref_cache;
        if pattern.len() > pref_cache.max_vibrate_list_len() as usize {
            return Err(Error::NotSupported);
        }
        let max_vibrate_ms = pref_cache.max_vibrate_ms();
        if pattern.iter().any(|&duration| duration > max_vibrate_ms) {
            return Err(Error::NotSupported);
        }
        self.start_vibration(&*window, &document, pattern);
        Ok(())
    }

    fn start_vibration(&self, window: &dyn Window, document: &Rc<dyn Document>, pattern: &[u32]) {
        // The pattern is validated even when vibration is disabled.
        if !self.services.pref_cache.vibrator_enabled() {
            return;
        }
        vibration::vibrate(
            window.window_id(),
            document,
            &self.services.vibrator,
            pattern,
        );
    }
}

// Content and protocol handlers, and the local cache.
impl Navigator {
    fn handler_registration_target(
        &self,
    ) -> Option<(Rc<dyn Window>, &dyn ContentHandlerRegistrar)> {
        let window = self
            .window()
            .filter(|window| window.has_outer_window() && window.has_doc_shell())?;
        let registrar = self.services.content_handler_registrar.as_deref()?;
        Some((window, registrar))
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-registercontenthandler
    pub fn register_content_handler(&self, mime_type: &str, uri: &str, title: &str) -> ErrorResult {
        let Some((window, registrar)) = self.handler_registration_target() else {
            return Ok(());
        };
        registrar.register_content_handler(mime_type, uri, title, window.window_id())
    }

    // https://html.spec.whatwg.org/multipage/#dom-navigator-registerprotocolhandler
    pub fn register_protocol_handler(&self, scheme: &str, uri: &str, title: &str) -> ErrorResult {
        let Some((window, registrar)) = self.handler_registration_target() else {
            return Ok(());
        };
        registrar.register_protocol_handler(scheme, uri, title, window.window_id())
    }

    /// Whether `uri` can be loaded from the HTTP cache without touching the network. With
    /// `when_offline`, resources stored for offline use count too.
    pub fn moz_is_locally_available(&self, uri: &str, when_offline: bool) -> Fallible<bool> {
        let url = Url::parse(uri).map_err(|_| Error::Syntax)?;

        // Only the HTTP cache is consulted.
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::BadUri);
        }

        let window = self.window().ok_or(Error::Unexpected)?;
        let document_url = window.extant_document().and_then(|document| document.url());
        if document_url.is_none_or(|document_url| document_url.origin() != url.origin()) {
            return Err(Error::Security);
        }

        // Fail if there is no valid cache entry rather than loading, and do not wait
        // for a busy cache.
        let mut flags = LoadFlags::INHIBIT_CACHING |
            LoadFlags::LOAD_NO_NETWORK_IO |
            LoadFlags::LOAD_ONLY_IF_MODIFIED |
            LoadFlags::LOAD_BYPASS_LOCAL_CACHE_IF_BUSY;
        if when_offline {
            flags |= LoadFlags::LOAD_CHECK_OFFLINE_CACHE |
                LoadFlags::LOAD_ONLY_FROM_CACHE |
                LoadFlags::LOAD_FROM_CACHE;
        }

        self.services.cache_query.is_available(&url, flags)
    }
}

// Device storage.
impl Navigator {
    fn device_storage_window(&self) -> Fallible<Rc<dyn Window>> {
        self.live_window()
            .filter(|window| window.has_outer_window() && window.has_doc_shell())
            .ok_or(Error::Failure)
    }

    pub fn device_storage(&self, storage_type: &str) -> Fallible<Option<Rc<dyn DeviceStorage>>> {
        if !self.services.prefs.get().device_storage_enabled {
            return Ok(None);
        }
        let window = self.device_storage_window()?;
        let Some(storage) = self
            .services
            .factory
            .create_device_storage(&window, storage_type)
        else {
            return Ok(None);
        };
        self.device_storage_stores
            .borrow_mut()
            .push(storage.clone());
        Ok(Some(storage))
    }

    pub fn device_storages(&self, storage_type: &str) -> Fallible<Vec<Rc<dyn DeviceStorage>>> {
        if !self.services.prefs.get().device_storage_enabled {
            return Ok(Vec::new());
        }
        let window = self.device_storage_window()?;
        let stores = self
            .services
            .factory
            .create_device_storages(&window, storage_type);
        self.device_storage_stores
            .borrow_mut()
            .extend(stores.iter().cloned());
        Ok(stores)
    }
}

// Feature objects.
impl Navigator {
    // https://w3c.github.io/geolocation-api/#navigator_interface
    pub fn geolocation(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if !self.services.prefs.get().geo_enabled {
            return Ok(None);
        }
        if let Some(geolocation) = self.geolocation.get() {
            return Ok(Some(geolocation));
        }
        let window = self
            .live_window()
            .filter(|window| window.has_outer_window() && window.has_doc_shell())
            .ok_or(Error::Failure)?;
        match self.feature(FeatureKind::Geolocation, &window) {
            Ok(Some(geolocation)) => Ok(Some(geolocation)),
            Ok(None) | Err(_) => Err(Error::Failure),
        }
    }

    pub fn moz_notification(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(notification) = self.notification.get() {
            return Ok(Some(notification));
        }
        let window = self
            .live_window()
            .filter(|window| window.has_doc_shell())
            .ok_or(Error::Failure)?;
        self.feature(FeatureKind::DesktopNotification, &window)
    }

    // https://w3c.github.io/battery/#the-navigator-interface-extensions
    pub fn battery(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(battery_manager) = self.battery_manager.get() {
            return Ok(Some(battery_manager));
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        if !window.has_doc_shell() {
            return Ok(None);
        }
        self.feature(FeatureKind::Battery, &window)
    }

    pub fn moz_power(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if !self.check_permission(Permission::Power) {
            return Ok(None);
        }
        if let Some(power_manager) = self.power_manager.get() {
            return Ok(Some(power_manager));
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        // No power manager service means no power manager.
        self.feature(FeatureKind::Power, &window)?
            .ok_or(Error::Unexpected)
            .map(Some)
    }

    pub fn request_wake_lock(&self, topic: &str) -> Fallible<Option<Rc<dyn WakeLock>>> {
        let window = self.live_window().ok_or(Error::Unexpected)?;
        let Some(ref power_manager) = self.services.power_manager else {
            return Ok(None);
        };
        power_manager.new_wake_lock(topic, &window).map(Some)
    }

    pub fn moz_sms(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(sms_manager) = self.sms_manager.get() {
            return Ok(Some(sms_manager));
        }
        let window = self.live_window();
        if !self.services.has_mobile_message_support(window.as_deref()) {
            return Ok(None);
        }
        match window {
            Some(window) => self.feature(FeatureKind::Sms, &window),
            None => Ok(None),
        }
    }

    pub fn moz_mobile_message(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        let window = self.window();
        if !self.services.has_mobile_message_support(window.as_deref()) {
            return Ok(None);
        }
        if let Some(mobile_message_manager) = self.mobile_message_manager.get() {
            return Ok(Some(mobile_message_manager));
        }
        match self.live_window() {
            Some(window) => self.feature(FeatureKind::MobileMessage, &window),
            None => Ok(None),
        }
    }

    pub fn moz_cell_broadcast(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(cell_broadcast) = self.cell_broadcast.get() {
            return Ok(Some(cell_broadcast));
        }
        if !self.check_permission(Permission::CellBroadcast) {
            return Ok(None);
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        self.feature(FeatureKind::CellBroadcast, &window)
    }

    pub fn moz_telephony(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(telephony) = self.telephony.get() {
            return Ok(Some(telephony));
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        if !self.services.check_permission(&*window, Permission::Telephony) {
            return Ok(None);
        }
        self.feature(FeatureKind::Telephony, &window)
    }

    pub fn moz_voicemail(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(voicemail) = self.voicemail.get() {
            return Ok(Some(voicemail));
        }
        if !self.check_permission(Permission::Voicemail) {
            return Ok(None);
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        self.feature(FeatureKind::Voicemail, &window)
    }

    pub fn moz_icc_manager(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(icc_manager) = self.icc_manager.get() {
            return Ok(Some(icc_manager));
        }
        if !self.check_permission(Permission::MobileConnection) {
            return Ok(None);
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        if !window.has_doc_shell() {
            return Ok(None);
        }
        self.feature(FeatureKind::IccManager, &window)
    }

    // https://gamepad.w3c.io/#navigator-interface-extension
    pub fn gamepads(&self) -> Fallible<Vec<Rc<dyn Gamepad>>> {
        let window = self.window().ok_or(Error::Unexpected)?;
        if !window.has_doc_shell() {
            return Ok(Vec::new());
        }
        Ok(window.gamepads())
    }

    pub fn moz_connection(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(connection) = self.connection.get() {
            return Ok(Some(connection));
        }
        match self.live_window().filter(|window| window.has_doc_shell()) {
            Some(window) => self.feature(FeatureKind::Connection, &window),
            None => Ok(None),
        }
    }

    pub fn moz_mobile_connection(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(mobile_connection) = self.mobile_connection.get() {
            return Ok(Some(mobile_connection));
        }
        if !self.check_permission(Permission::MobileConnection) &&
            !self.check_permission(Permission::MobileNetwork)
        {
            return Ok(None);
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        self.feature(FeatureKind::MobileConnection, &window)
    }

    pub fn moz_bluetooth(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(bluetooth) = self.bluetooth.get() {
            return Ok(Some(bluetooth));
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        if !self.services.check_permission(&*window, Permission::Bluetooth) {
            return Ok(None);
        }
        self.feature(FeatureKind::Bluetooth, &window)
    }

    pub fn moz_cameras(&self) -> Fallible<Option<Rc<dyn CameraManager>>> {
        if let Some(camera_manager) = self.camera_manager.get() {
            return Ok(Some(camera_manager));
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        if !self.services.check_permission(&*window, Permission::Camera) {
            return Ok(None);
        }
        if !window.has_outer_window() || !window.is_current_inner_window() {
            return Err(Error::NotAvailable);
        }
        self.camera_manager
            .or_try_init(|| Ok(self.services.factory.create_camera_manager(&window)))
    }

    pub fn moz_audio_channel_manager(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if let Some(audio_channel_manager) = self.audio_channel_manager.get() {
            return Ok(Some(audio_channel_manager));
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        self.feature(FeatureKind::AudioChannelManager, &window)
    }

    pub fn moz_time(&self) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if !self.check_permission(Permission::Time) {
            return Ok(None);
        }
        if let Some(time_manager) = self.time_manager.get() {
            return Ok(Some(time_manager));
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        self.feature(FeatureKind::Time, &window)
    }
}

// System messages.
impl Navigator {
    fn ensure_messages_manager(&self) -> Fallible<Rc<dyn SystemMessageManager>> {
        if let Some(messages_manager) = self.messages_manager.get() {
            return Ok(messages_manager);
        }
        let window = self.live_window().ok_or(Error::Unexpected)?;
        self.messages_manager
            .or_try_init(|| {
                self.services
                    .factory
                    .create_system_message_manager(&window)
                    .map(Some)
            })?
            .ok_or(Error::Failure)
    }

    pub fn moz_has_pending_message(&self, message_type: &str) -> Fallible<bool> {
        if !self.services.prefs.get().dom_sysmsg_enabled {
            return Err(Error::NotImplemented);
        }
        self.ensure_messages_manager()?
            .has_pending_message(message_type)
    }

    pub fn moz_set_message_handler(
        &self,
        message_type: &str,
        callback: Option<Rc<dyn SystemMessageCallback>>,
    ) -> ErrorResult {
        if !self.services.prefs.get().dom_sysmsg_enabled {
            return Err(Error::NotImplemented);
        }
        self.ensure_messages_manager()?
            .set_message_handler(message_type, callback)
    }
}

// Idle observers.
impl Navigator {
    pub fn add_idle_observer(&self, observer: Rc<dyn IdleObserver>) -> ErrorResult {
        let window = self.window().ok_or(Error::Unexpected)?;
        if !self.services.prefs.get().dom_idle_observers_api_enabled {
            warn!("The IdleObserver API has been disabled.");
            return Ok(());
        }
        if !self.services.check_permission(&*window, Permission::Idle) {
            return Err(Error::Security);
        }
        if let Err(error) = window.register_idle_observer(observer) {
            warn!("Failed to add idle observer: {}", error);
        }
        Ok(())
    }

    pub fn remove_idle_observer(&self, observer: &Rc<dyn IdleObserver>) -> ErrorResult {
        let window = self.window().ok_or(Error::Unexpected)?;
        if !self.services.prefs.get().dom_idle_observers_api_enabled {
            warn!("The IdleObserver API has been disabled.");
            return Ok(());
        }
        if let Err(error) = window.unregister_idle_observer(observer) {
            warn!("Failed to remove idle observer: {}", error);
        }
        Ok(())
    }
}

// User media.
impl Navigator {
    fn user_media_window(&self) -> Fallible<Rc<dyn Window>> {
        self.window()
            .filter(|window| window.has_outer_window() && window.is_current_inner_window())
            .ok_or(Error::NotAvailable)
    }

    pub fn moz_get_user_media(
        &self,
        options: MediaStreamOptions,
        on_success: GetUserMediaSuccessCallback,
        on_error: GetUserMediaErrorCallback,
    ) -> ErrorResult {
        // Enabling peer connections enables getUserMedia() too.
        let enabled = {
            let prefs = self.services.prefs.get();
            prefs.media_navigator_enabled || prefs.media_peerconnection_enabled
        };
        if !enabled {
            return Ok(());
        }

        let window = self.user_media_window()?;
        let privileged = window
            .extant_document()
            .is_some_and(|document| document.is_chrome_document());
        let media_manager = self
            .services
            .media_manager
            .as_ref()
            .ok_or(Error::NotAvailable)?;
        media_manager.get_user_media(
            privileged,
            window.window_id(),
            options,
            on_success,
            on_error,
        )
    }

    pub fn moz_get_user_media_devices(
        &self,
        on_success: GetUserMediaDevicesSuccessCallback,
        on_error: GetUserMediaErrorCallback,
    ) -> ErrorResult {
        if !self.is_caller_chrome() {
            return Err(Error::Failure);
        }
        let window = self.user_media_window()?;
        let media_manager = self
            .services
            .media_manager
            .as_ref()
            .ok_or(Error::NotAvailable)?;
        media_manager.get_user_media_devices(window.window_id(), on_success, on_error)
    }
}
