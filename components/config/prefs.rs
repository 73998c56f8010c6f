/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::path::Path;
use std::sync::Arc;
use std::{fmt, fs, io};

use log::{debug, warn};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use servo_config_macro::ServoPreferences;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl PrefValue {
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            PrefValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            PrefValue::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            PrefValue::Str(ref value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}

impl From<i64> for PrefValue {
    fn from(value: i64) -> Self {
        PrefValue::Int(value)
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::Str(value)
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::Str(value.to_owned())
    }
}

impl TryFrom<PrefValue> for bool {
    type Error = PrefValue;

    fn try_from(value: PrefValue) -> Result<Self, Self::Error> {
        match value {
            PrefValue::Bool(value) => Ok(value),
            other => Err(other),
        }
    }
}

impl TryFrom<PrefValue> for i64 {
    type Error = PrefValue;

    fn try_from(value: PrefValue) -> Result<Self, Self::Error> {
        match value {
            PrefValue::Int(value) => Ok(value),
            other => Err(other),
        }
    }
}

impl TryFrom<PrefValue> for String {
    type Error = PrefValue;

    fn try_from(value: PrefValue) -> Result<Self, Self::Error> {
        match value {
            PrefValue::Str(value) => Ok(value),
            other => Err(other),
        }
    }
}

#[derive(Debug)]
pub enum PrefError {
    UnknownPreference(String),
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
    Json(serde_json::Error),
    Io(io::Error),
}

impl fmt::Display for PrefError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PrefError::UnknownPreference(ref name) => write!(f, "Unknown preference: {:?}", name),
            PrefError::TypeMismatch {
                ref name,
                expected,
            } => write!(f, "Preference {:?} expects a value of type {}", name, expected),
            PrefError::Json(ref error) => write!(f, "Invalid preferences JSON: {}", error),
            PrefError::Io(ref error) => write!(f, "Error reading preferences: {}", error),
        }
    }
}

impl std::error::Error for PrefError {}

impl From<serde_json::Error> for PrefError {
    fn from(error: serde_json::Error) -> Self {
        PrefError::Json(error)
    }
}

impl From<io::Error> for PrefError {
    fn from(error: io::Error) -> Self {
        PrefError::Io(error)
    }
}

/// Preferences read by the navigator and the services it hands out. Override strings are
/// ignored while empty.
#[derive(Clone, Debug, PartialEq, ServoPreferences)]
pub struct Preferences {
    #[pref(name = "privacy.donottrackheader.enabled")]
    pub privacy_donottrackheader_enabled: bool,
    #[pref(name = "dom.vibrator.enabled")]
    pub dom_vibrator_enabled: bool,
    /// The longest single vibration, in milliseconds.
    #[pref(name = "dom.vibrator.max_vibrate_ms")]
    pub dom_vibrator_max_vibrate_ms: i64,
    /// The maximum number of entries in a vibration pattern.
    #[pref(name = "dom.vibrator.max_vibrate_list_len")]
    pub dom_vibrator_max_vibrate_list_len: i64,
    #[pref(name = "dom.battery.enabled")]
    pub dom_battery_enabled: bool,
    #[pref(name = "geo.enabled")]
    pub geo_enabled: bool,
    #[pref(name = "device.storage.enabled")]
    pub device_storage_enabled: bool,
    #[pref(name = "dom.sms.enabled")]
    pub dom_sms_enabled: bool,
    #[pref(name = "dom.sysmsg.enabled")]
    pub dom_sysmsg_enabled: bool,
    #[pref(name = "dom.idle-observers-api.enabled")]
    pub dom_idle_observers_api_enabled: bool,
    #[pref(name = "media.navigator.enabled")]
    pub media_navigator_enabled: bool,
    #[pref(name = "media.peerconnection.enabled")]
    pub media_peerconnection_enabled: bool,
    #[pref(name = "notification.feature.enabled")]
    pub notification_feature_enabled: bool,
    /// 0 accepts all cookies, 1 only first-party cookies and 2 rejects them all.
    #[pref(name = "network.cookie.cookieBehavior")]
    pub network_cookie_cookie_behavior: i64,
    /// The user's content languages, e.g. "de-de, en-us,en".
    #[pref(name = "intl.accept_languages")]
    pub intl_accept_languages: String,
    #[pref(name = "general.appname.override")]
    pub general_appname_override: String,
    #[pref(name = "general.appversion.override")]
    pub general_appversion_override: String,
    #[pref(name = "general.platform.override")]
    pub general_platform_override: String,
    #[pref(name = "general.oscpu.override")]
    pub general_oscpu_override: String,
    #[pref(name = "general.buildID.override")]
    pub general_build_id_override: String,
    #[pref(name = "general.useragent.override")]
    pub general_useragent_override: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            privacy_donottrackheader_enabled: false,
            dom_vibrator_enabled: true,
            dom_vibrator_max_vibrate_ms: 10000,
            dom_vibrator_max_vibrate_list_len: 128,
            dom_battery_enabled: true,
            geo_enabled: true,
            device_storage_enabled: false,
            dom_sms_enabled: false,
            dom_sysmsg_enabled: false,
            dom_idle_observers_api_enabled: true,
            media_navigator_enabled: false,
            media_peerconnection_enabled: false,
            notification_feature_enabled: false,
            network_cookie_cookie_behavior: 0,
            intl_accept_languages: "en-US, en".to_owned(),
            general_appname_override: String::new(),
            general_appversion_override: String::new(),
            general_platform_override: String::new(),
            general_oscpu_override: String::new(),
            general_build_id_override: String::new(),
            general_useragent_override: String::new(),
        }
    }
}

/// Something that wants to hear about preference changes. Observers are called after the
/// store has been updated, outside of any lock, with the new value of every preference
/// that changed.
pub trait Observer: Send + Sync {
    fn prefs_changed(&self, changes: &[(&'static str, PrefValue)]);
}

/// The process-wide preference store. It is created once by the embedder and handed to
/// every component that reads preferences.
pub struct PreferenceStore {
    preferences: RwLock<Preferences>,
    defaults: Preferences,
    observers: RwLock<Vec<Arc<dyn Observer>>>,
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

impl PreferenceStore {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences: RwLock::new(preferences),
            defaults: Preferences::default(),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn get(&self) -> RwLockReadGuard<'_, Preferences> {
        self.preferences.read()
    }

    pub fn get_value(&self, name: &str) -> Option<PrefValue> {
        self.get().get_value(name)
    }

    pub fn set(&self, preferences: Preferences) {
        let changes = {
            let mut current = self.preferences.write();
            let changes = preferences.diff(&current);
            *current = preferences;
            changes
        };
        self.notify_observers(&changes);
    }

    pub fn set_value(&self, name: &str, value: PrefValue) -> Result<(), PrefError> {
        self.update(|preferences| preferences.set_value(name, value))
    }

    /// Restore a single preference to its built-in default.
    pub fn reset_value(&self, name: &str) -> Result<(), PrefError> {
        let value = self
            .defaults
            .get_value(name)
            .ok_or_else(|| PrefError::UnknownPreference(name.to_owned()))?;
        self.set_value(name, value)
    }

    pub fn reset_all(&self) {
        self.set(self.defaults.clone());
    }

    /// Apply a JSON object of `"pref.name": value` pairs. Entries with unknown names or
    /// values of the wrong type are skipped with a warning; a document that is not a JSON
    /// object is an error.
    pub fn apply_json(&self, json: &str) -> Result<(), PrefError> {
        let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        self.update(|preferences| {
            for (name, value) in entries {
                let value = match PrefValue::deserialize(value) {
                    Ok(value) => value,
                    Err(_) => {
                        warn!("Ignoring non-boolean/integer/string preference value for {:?}", name);
                        continue;
                    },
                };
                if let Err(error) = preferences.set_value(&name, value) {
                    warn!("Ignoring preference: {}", error);
                }
            }
            Ok(())
        })
    }

    /// Set a preference from a command line style `name=value` assignment. A bare name
    /// sets a boolean preference to true.
    pub fn parse_pref_assignment(&self, assignment: &str) -> Result<(), PrefError> {
        let (name, value) = match assignment.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (assignment.trim(), "true"),
        };
        let value = match value {
            "true" => PrefValue::Bool(true),
            "false" => PrefValue::Bool(false),
            _ => match value.parse::<i64>() {
                Ok(number) => PrefValue::Int(number),
                Err(_) => PrefValue::Str(value.to_owned()),
            },
        };
        self.set_value(name, value)
    }

    pub fn read_prefs_from_file(&self, path: &Path) -> Result<(), PrefError> {
        let json = fs::read_to_string(path)?;
        debug!("Reading preferences from {}", path.display());
        self.apply_json(&json)
    }

    pub fn add_observer(&self, observer: Arc<dyn Observer>) {
        self.observers.write().push(observer);
    }

    fn update<F>(&self, mutate: F) -> Result<(), PrefError>
    where
        F: FnOnce(&mut Preferences) -> Result<(), PrefError>,
    {
        let changes = {
            let mut current = self.preferences.write();
            let mut updated = current.clone();
            mutate(&mut updated)?;
            let changes = updated.diff(&current);
            *current = updated;
            changes
        };
        self.notify_observers(&changes);
        Ok(())
    }

    fn notify_observers(&self, changes: &[(&'static str, PrefValue)]) {
        if changes.is_empty() {
            return;
        }
        let observers = self.observers.read().clone();
        for observer in observers {
            observer.prefs_changed(changes);
        }
    }
}
