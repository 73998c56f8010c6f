/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Recording stand-ins for the window, its document and the services behind the
//! navigator.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use navigator_traits::services::{
    GetUserMediaDevicesSuccessCallback, GetUserMediaErrorCallback, GetUserMediaSuccessCallback,
};
use navigator_traits::{
    AppInfo, CameraManager, ContentHandlerRegistrar, CookieAccess, CookiePermission,
    DeviceStorage, Document, Error, ErrorResult, Fallible, FeatureFactory, FeatureKind,
    FeatureObject, Gamepad, IdleObserver, ListenerId, MediaDevice, MediaDeviceKind, MediaManager,
    MediaStream, MediaStreamOptions, MimeTypeArray, PermissionAction, PermissionManager,
    PluginArray, PowerManagerService, SiteSpecificUserAgent, SystemMessageCallback,
    SystemMessageManager, Vibrator, VisibilityListener, WakeLock, Window, WindowId,
};
use net::http_cache::{HttpCache, LocalCacheQuery};
use net::io_service::IOService;
use parking_lot::Mutex;
use script::dom::navigator::{Navigator, NavigatorServices};
use script::navigator_prefs::NavigatorPrefCache;
use servo_config::prefs::{PrefValue, PreferenceStore};
use url::Url;

pub struct MockDocument {
    pub hidden: Cell<bool>,
    pub url: RefCell<Option<Url>>,
    pub chrome: Cell<bool>,
    listeners: RefCell<Vec<(ListenerId, Rc<dyn VisibilityListener>)>>,
    next_listener_id: Cell<u64>,
}

impl MockDocument {
    pub fn new(url: &str) -> Rc<MockDocument> {
        Rc::new(MockDocument {
            hidden: Cell::new(false),
            url: RefCell::new(Url::parse(url).ok()),
            chrome: Cell::new(false),
            listeners: Default::default(),
            next_listener_id: Cell::new(0),
        })
    }

    /// Change visibility and fire `visibilitychange`.
    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
        let listeners: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener.visibility_changed();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl Document for MockDocument {
    fn hidden(&self) -> bool {
        self.hidden.get()
    }

    fn url(&self) -> Option<Url> {
        self.url.borrow().clone()
    }

    fn is_chrome_document(&self) -> bool {
        self.chrome.get()
    }

    fn add_visibility_listener(&self, listener: Rc<dyn VisibilityListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id.get());
        self.next_listener_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_visibility_listener(&self, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id);
    }
}

pub struct MockGamepad(pub u32);

impl Gamepad for MockGamepad {
    fn id(&self) -> String {
        format!("gamepad {}", self.0)
    }

    fn index(&self) -> u32 {
        self.0
    }
}

pub struct MockWindow {
    pub id: WindowId,
    pub doc_shell: Cell<bool>,
    pub outer_window: Cell<bool>,
    pub current_inner: Cell<bool>,
    pub caller_chrome: Cell<bool>,
    pub document: RefCell<Option<Rc<MockDocument>>>,
    pub idle_observers: RefCell<Vec<Rc<dyn IdleObserver>>>,
    pub gamepads: RefCell<Vec<Rc<dyn Gamepad>>>,
}

impl MockWindow {
    pub fn new(id: u64, document: Rc<MockDocument>) -> Rc<MockWindow> {
        Rc::new(MockWindow {
            id: WindowId(id),
            doc_shell: Cell::new(true),
            outer_window: Cell::new(true),
            current_inner: Cell::new(true),
            caller_chrome: Cell::new(false),
            document: RefCell::new(Some(document)),
            idle_observers: Default::default(),
            gamepads: Default::default(),
        })
    }
}

impl Window for MockWindow {
    fn window_id(&self) -> WindowId {
        self.id
    }

    fn has_doc_shell(&self) -> bool {
        self.doc_shell.get()
    }

    fn has_outer_window(&self) -> bool {
        self.outer_window.get()
    }

    fn is_current_inner_window(&self) -> bool {
        self.current_inner.get()
    }

    fn extant_document(&self) -> Option<Rc<dyn Document>> {
        self.document
            .borrow()
            .clone()
            .map(|document| document as Rc<dyn Document>)
    }

    fn is_caller_chrome(&self) -> bool {
        self.caller_chrome.get()
    }

    fn register_idle_observer(&self, observer: Rc<dyn IdleObserver>) -> ErrorResult {
        self.idle_observers.borrow_mut().push(observer);
        Ok(())
    }

    fn unregister_idle_observer(&self, observer: &Rc<dyn IdleObserver>) -> ErrorResult {
        self.idle_observers
            .borrow_mut()
            .retain(|registered| !Rc::ptr_eq(registered, observer));
        Ok(())
    }

    fn gamepads(&self) -> Vec<Rc<dyn Gamepad>> {
        self.gamepads.borrow().clone()
    }
}

pub struct MockIdleObserver;

impl IdleObserver for MockIdleObserver {
    fn time(&self) -> u32 {
        60
    }

    fn on_idle(&self) {}

    fn on_active(&self) {}
}

#[derive(Default)]
pub struct MockPermissions {
    allowed: RefCell<HashSet<String>>,
}

impl MockPermissions {
    pub fn allow(&self, permission: &str) {
        self.allowed.borrow_mut().insert(permission.to_owned());
    }

    pub fn deny(&self, permission: &str) {
        self.allowed.borrow_mut().remove(permission);
    }
}

impl PermissionManager for MockPermissions {
    fn test_permission_from_window(
        &self,
        _window: &dyn Window,
        permission_type: &str,
    ) -> PermissionAction {
        if self.allowed.borrow().contains(permission_type) {
            PermissionAction::Allow
        } else {
            PermissionAction::Deny
        }
    }
}

/// Runs when a feature object is shut down.
pub type ShutdownHook = Rc<dyn Fn(FeatureKind)>;

pub struct MockFeature {
    kind: FeatureKind,
    shutdowns: Rc<RefCell<Vec<FeatureKind>>>,
    on_shutdown: Option<ShutdownHook>,
}

impl FeatureObject for MockFeature {
    fn kind(&self) -> FeatureKind {
        self.kind
    }

    fn shutdown(&self) {
        self.shutdowns.borrow_mut().push(self.kind);
        if let Some(ref on_shutdown) = self.on_shutdown {
            on_shutdown(self.kind);
        }
    }
}

#[derive(Default)]
pub struct MockPluginArray {
    pub inits: Cell<usize>,
    pub refreshes: Cell<usize>,
    pub invalidated: Cell<bool>,
}

impl PluginArray for MockPluginArray {
    fn init(&self) {
        self.inits.set(self.inits.get() + 1);
    }

    fn refresh(&self) {
        self.refreshes.set(self.refreshes.get() + 1);
    }

    fn invalidate(&self) {
        self.invalidated.set(true);
    }
}

#[derive(Default)]
pub struct MockMimeTypeArray {
    pub enabled: RefCell<Vec<String>>,
    pub refreshes: Cell<usize>,
}

impl MimeTypeArray for MockMimeTypeArray {
    fn refresh(&self) {
        self.refreshes.set(self.refreshes.get() + 1);
    }

    fn has_enabled_plugin(&self, mime_type: &str) -> bool {
        self.enabled.borrow().iter().any(|enabled| enabled == mime_type)
    }
}

#[derive(Default)]
pub struct MockCameraManager {
    pub navigations: RefCell<Vec<WindowId>>,
}

impl CameraManager for MockCameraManager {
    fn on_navigation(&self, window: WindowId) {
        self.navigations.borrow_mut().push(window);
    }
}

#[derive(Default)]
pub struct MockSystemMessageManager {
    pub pending: RefCell<HashSet<String>>,
    pub handlers: RefCell<Vec<(String, bool)>>,
}

impl SystemMessageManager for MockSystemMessageManager {
    fn has_pending_message(&self, message_type: &str) -> Fallible<bool> {
        Ok(self.pending.borrow().contains(message_type))
    }

    fn set_message_handler(
        &self,
        message_type: &str,
        callback: Option<Rc<dyn SystemMessageCallback>>,
    ) -> ErrorResult {
        self.handlers
            .borrow_mut()
            .push((message_type.to_owned(), callback.is_some()));
        Ok(())
    }
}

pub struct MockDeviceStorage {
    storage_type: String,
    pub shut_down: Cell<bool>,
}

impl DeviceStorage for MockDeviceStorage {
    fn storage_type(&self) -> String {
        self.storage_type.clone()
    }

    fn shutdown(&self) {
        self.shut_down.set(true);
    }
}

/// Creates recording objects and remembers everything it created.
#[derive(Default)]
pub struct MockFactory {
    pub created: RefCell<Vec<FeatureKind>>,
    pub shutdowns: Rc<RefCell<Vec<FeatureKind>>>,
    pub on_shutdown: RefCell<Option<ShutdownHook>>,
    pub unavailable: RefCell<HashSet<FeatureKind>>,
    pub plugin_arrays: RefCell<Vec<Rc<MockPluginArray>>>,
    pub mime_type_arrays: RefCell<Vec<Rc<MockMimeTypeArray>>>,
    pub camera_managers: RefCell<Vec<Rc<MockCameraManager>>>,
    pub message_managers: RefCell<Vec<Rc<MockSystemMessageManager>>>,
    pub device_storages: RefCell<Vec<Rc<MockDeviceStorage>>>,
    pub enabled_mime_types: RefCell<Vec<String>>,
}

impl MockFactory {
    pub fn created_count(&self, kind: FeatureKind) -> usize {
        self.created
            .borrow()
            .iter()
            .filter(|created| **created == kind)
            .count()
    }

    fn new_device_storage(&self, storage_type: &str) -> Rc<MockDeviceStorage> {
        let storage = Rc::new(MockDeviceStorage {
            storage_type: storage_type.to_owned(),
            shut_down: Cell::new(false),
        });
        self.device_storages.borrow_mut().push(storage.clone());
        storage
    }
}

impl FeatureFactory for MockFactory {
    fn create(
        &self,
        kind: FeatureKind,
        _window: &Rc<dyn Window>,
    ) -> Fallible<Option<Rc<dyn FeatureObject>>> {
        if self.unavailable.borrow().contains(&kind) {
            return Ok(None);
        }
        self.created.borrow_mut().push(kind);
        Ok(Some(Rc::new(MockFeature {
            kind,
            shutdowns: self.shutdowns.clone(),
            on_shutdown: self.on_shutdown.borrow().clone(),
        })))
    }

    fn create_plugin_array(&self, _window: &Rc<dyn Window>) -> Rc<dyn PluginArray> {
        let plugins = Rc::new(MockPluginArray::default());
        self.plugin_arrays.borrow_mut().push(plugins.clone());
        plugins
    }

    fn create_mime_type_array(&self, _window: &Rc<dyn Window>) -> Rc<dyn MimeTypeArray> {
        let mime_types = Rc::new(MockMimeTypeArray {
            enabled: RefCell::new(self.enabled_mime_types.borrow().clone()),
            refreshes: Cell::new(0),
        });
        self.mime_type_arrays.borrow_mut().push(mime_types.clone());
        mime_types
    }

    fn create_camera_manager(&self, _window: &Rc<dyn Window>) -> Option<Rc<dyn CameraManager>> {
        let camera_manager = Rc::new(MockCameraManager::default());
        self.camera_managers
            .borrow_mut()
            .push(camera_manager.clone());
        Some(camera_manager)
    }

    fn create_system_message_manager(
        &self,
        _window: &Rc<dyn Window>,
    ) -> Fallible<Rc<dyn SystemMessageManager>> {
        let messages_manager = Rc::new(MockSystemMessageManager::default());
        self.message_managers
            .borrow_mut()
            .push(messages_manager.clone());
        Ok(messages_manager)
    }

    fn create_device_storage(
        &self,
        _window: &Rc<dyn Window>,
        storage_type: &str,
    ) -> Option<Rc<dyn DeviceStorage>> {
        if storage_type.is_empty() {
            return None;
        }
        Some(self.new_device_storage(storage_type))
    }

    fn create_device_storages(
        &self,
        _window: &Rc<dyn Window>,
        storage_type: &str,
    ) -> Vec<Rc<dyn DeviceStorage>> {
        (0..2)
            .map(|_| self.new_device_storage(storage_type) as Rc<dyn DeviceStorage>)
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum VibratorCall {
    Vibrate(Vec<u32>, WindowId),
    Cancel(WindowId),
}

#[derive(Default)]
pub struct MockVibrator {
    pub calls: RefCell<Vec<VibratorCall>>,
}

impl Vibrator for MockVibrator {
    fn vibrate(&self, pattern: &[u32], window: WindowId) {
        self.calls
            .borrow_mut()
            .push(VibratorCall::Vibrate(pattern.to_vec(), window));
    }

    fn cancel_vibrate(&self, window: WindowId) {
        self.calls.borrow_mut().push(VibratorCall::Cancel(window));
    }
}

pub struct MockWakeLock(String);

impl WakeLock for MockWakeLock {
    fn topic(&self) -> String {
        self.0.clone()
    }

    fn unlock(&self) -> ErrorResult {
        Ok(())
    }
}

pub struct MockPowerManager;

impl PowerManagerService for MockPowerManager {
    fn new_wake_lock(&self, topic: &str, _window: &Rc<dyn Window>) -> Fallible<Rc<dyn WakeLock>> {
        if topic.is_empty() {
            return Err(Error::Failure);
        }
        Ok(Rc::new(MockWakeLock(topic.to_owned())))
    }
}

pub struct MockStream;

impl MediaStream for MockStream {
    fn id(&self) -> String {
        "stream".to_owned()
    }
}

#[derive(Default)]
pub struct MockMediaManager {
    pub requests: RefCell<Vec<(bool, WindowId, MediaStreamOptions)>>,
    pub navigations: RefCell<Vec<WindowId>>,
}

impl MediaManager for MockMediaManager {
    fn get_user_media(
        &self,
        privileged: bool,
        window: WindowId,
        options: MediaStreamOptions,
        on_success: GetUserMediaSuccessCallback,
        _on_error: GetUserMediaErrorCallback,
    ) -> ErrorResult {
        self.requests
            .borrow_mut()
            .push((privileged, window, options));
        on_success(Rc::new(MockStream));
        Ok(())
    }

    fn get_user_media_devices(
        &self,
        _window: WindowId,
        on_success: GetUserMediaDevicesSuccessCallback,
        _on_error: GetUserMediaErrorCallback,
    ) -> ErrorResult {
        on_success(vec![MediaDevice {
            kind: MediaDeviceKind::VideoInput,
            name: "Front camera".to_owned(),
        }]);
        Ok(())
    }

    fn on_navigation(&self, window: WindowId) {
        self.navigations.borrow_mut().push(window);
    }
}

#[derive(Default)]
pub struct MockRegistrar {
    pub registrations: RefCell<Vec<(String, String, String, WindowId)>>,
}

impl ContentHandlerRegistrar for MockRegistrar {
    fn register_content_handler(
        &self,
        mime_type: &str,
        uri: &str,
        title: &str,
        window: WindowId,
    ) -> ErrorResult {
        self.registrations.borrow_mut().push((
            mime_type.to_owned(),
            uri.to_owned(),
            title.to_owned(),
            window,
        ));
        Ok(())
    }

    fn register_protocol_handler(
        &self,
        scheme: &str,
        uri: &str,
        title: &str,
        window: WindowId,
    ) -> ErrorResult {
        if !uri.contains("%s") {
            return Err(Error::Syntax);
        }
        self.registrations.borrow_mut().push((
            scheme.to_owned(),
            uri.to_owned(),
            title.to_owned(),
            window,
        ));
        Ok(())
    }
}

pub struct MockCookiePermission(pub Cell<CookieAccess>);

impl CookiePermission for MockCookiePermission {
    fn can_access(&self, _url: &Url) -> Fallible<CookieAccess> {
        Ok(self.0.get())
    }
}

pub struct MockSiteSpecificUserAgent;

impl SiteSpecificUserAgent for MockSiteSpecificUserAgent {
    fn user_agent_for_url(
        &self,
        url: &Url,
        _window: WindowId,
        default_user_agent: &str,
    ) -> Fallible<String> {
        if url.host_str() == Some("legacy.example") {
            return Ok("LegacyBrowser/1.0".to_owned());
        }
        Ok(default_user_agent.to_owned())
    }
}

pub struct MockAppInfo;

impl AppInfo for MockAppInfo {
    fn app_build_id(&self) -> Fallible<String> {
        Ok("20240101000000".to_owned())
    }
}

/// A window showing `https://servo.org/`, every service a navigator can use, and the
/// recorders behind them.
pub struct TestEnv {
    pub prefs: Arc<PreferenceStore>,
    pub document: Rc<MockDocument>,
    pub window: Rc<MockWindow>,
    pub permissions: Rc<MockPermissions>,
    pub factory: Rc<MockFactory>,
    pub vibrator: Rc<MockVibrator>,
    pub io_service: Rc<IOService>,
    pub cache: Arc<Mutex<HttpCache>>,
    pub media_manager: Rc<MockMediaManager>,
    pub registrar: Rc<MockRegistrar>,
    pub cookie_permission: Rc<MockCookiePermission>,
}

impl TestEnv {
    pub fn new() -> TestEnv {
        let prefs = Arc::new(PreferenceStore::default());
        let document = MockDocument::new("https://servo.org/");
        let window = MockWindow::new(1, document.clone());
        TestEnv {
            io_service: Rc::new(IOService::new(prefs.clone())),
            prefs,
            document,
            window,
            permissions: Default::default(),
            factory: Default::default(),
            vibrator: Default::default(),
            cache: Default::default(),
            media_manager: Default::default(),
            registrar: Default::default(),
            cookie_permission: Rc::new(MockCookiePermission(Cell::new(CookieAccess::Default))),
        }
    }

    pub fn set_pref(&self, name: &str, value: PrefValue) {
        self.prefs
            .set_value(name, value)
            .expect("known preference");
    }

    pub fn services(&self) -> NavigatorServices {
        NavigatorServices {
            pref_cache: NavigatorPrefCache::new(&self.prefs),
            prefs: self.prefs.clone(),
            protocol_handler: self.io_service.clone(),
            network_status: self.io_service.clone(),
            factory: self.factory.clone(),
            vibrator: self.vibrator.clone(),
            cache_query: Rc::new(LocalCacheQuery::new(self.cache.clone())),
            permissions: Some(self.permissions.clone()),
            power_manager: Some(Rc::new(MockPowerManager)),
            media_manager: Some(self.media_manager.clone()),
            content_handler_registrar: Some(self.registrar.clone()),
            cookie_permission: Some(self.cookie_permission.clone()),
            site_specific_user_agent: Some(Rc::new(MockSiteSpecificUserAgent)),
            app_info: Some(Rc::new(MockAppInfo)),
        }
    }

    pub fn window(&self) -> Rc<dyn Window> {
        self.window.clone()
    }

    pub fn navigator(&self) -> Rc<Navigator> {
        self.navigator_with(self.services())
    }

    pub fn navigator_with(&self, services: NavigatorServices) -> Rc<Navigator> {
        Navigator::new(&self.window(), Rc::new(services))
    }

    /// A navigator for another window sharing this environment's services.
    pub fn navigator_with_window(&self, window: &Rc<MockWindow>) -> Rc<Navigator> {
        let window: Rc<dyn Window> = window.clone();
        Navigator::new(&window, Rc::new(self.services()))
    }
}
