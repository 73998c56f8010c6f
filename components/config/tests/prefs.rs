/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

use parking_lot::Mutex;
use servo_config::prefs::{Observer, PrefError, PrefValue, PreferenceStore, Preferences};

#[derive(Default)]
struct RecordingObserver {
    changes: Mutex<Vec<(&'static str, PrefValue)>>,
}

impl Observer for RecordingObserver {
    fn prefs_changed(&self, changes: &[(&'static str, PrefValue)]) {
        self.changes.lock().extend_from_slice(changes);
    }
}

#[test]
fn test_default_values() {
    let store = PreferenceStore::default();
    let prefs = store.get();
    assert!(prefs.dom_vibrator_enabled);
    assert_eq!(prefs.dom_vibrator_max_vibrate_ms, 10000);
    assert_eq!(prefs.dom_vibrator_max_vibrate_list_len, 128);
    assert!(!prefs.privacy_donottrackheader_enabled);
    assert!(prefs.geo_enabled);
    assert_eq!(prefs.intl_accept_languages, "en-US, en");
}

#[test]
fn test_lookup_by_dotted_name() {
    assert!(Preferences::exists("dom.vibrator.enabled"));
    assert!(Preferences::exists("dom.idle-observers-api.enabled"));
    assert!(!Preferences::exists("dom_vibrator_enabled"));
    assert!(Preferences::all_prefs().contains(&"general.buildID.override"));

    let store = PreferenceStore::default();
    assert_eq!(
        store.get_value("dom.vibrator.max_vibrate_ms"),
        Some(PrefValue::Int(10000))
    );
    assert_eq!(store.get_value("doesntexist"), None);
    assert_eq!(Preferences::type_of("geo.enabled"), Some("bool"));
}

#[test]
fn test_set_value() {
    let store = PreferenceStore::default();
    store
        .set_value("dom.vibrator.max_vibrate_ms", PrefValue::Int(500))
        .unwrap();
    assert_eq!(store.get().dom_vibrator_max_vibrate_ms, 500);

    store.set_value("general.platform.override", "Amiga".into()).unwrap();
    assert_eq!(store.get().general_platform_override, "Amiga");
}

#[test]
fn test_set_value_rejects_unknown_and_mistyped() {
    let store = PreferenceStore::default();
    match store.set_value("doesntexist", PrefValue::Bool(true)) {
        Err(PrefError::UnknownPreference(name)) => assert_eq!(name, "doesntexist"),
        other => panic!("unexpected result {:?}", other),
    }
    match store.set_value("dom.vibrator.enabled", PrefValue::Int(1)) {
        Err(PrefError::TypeMismatch { name, .. }) => assert_eq!(name, "dom.vibrator.enabled"),
        other => panic!("unexpected result {:?}", other),
    }
    assert!(store.get().dom_vibrator_enabled);
}

#[test]
fn test_observers_see_only_changes() {
    let store = PreferenceStore::default();
    let observer = Arc::new(RecordingObserver::default());
    store.add_observer(observer.clone());

    // Setting a preference to its current value is not a change.
    store.set_value("dom.vibrator.enabled", PrefValue::Bool(true)).unwrap();
    assert!(observer.changes.lock().is_empty());

    store.set_value("dom.vibrator.enabled", PrefValue::Bool(false)).unwrap();
    assert_eq!(
        *observer.changes.lock(),
        vec![("dom.vibrator.enabled", PrefValue::Bool(false))]
    );
}

#[test]
fn test_reset_value() {
    let store = PreferenceStore::default();
    store.set_value("geo.enabled", PrefValue::Bool(false)).unwrap();
    store.reset_value("geo.enabled").unwrap();
    assert!(store.get().geo_enabled);
    assert!(store.reset_value("doesntexist").is_err());

    store.set_value("dom.sms.enabled", PrefValue::Bool(true)).unwrap();
    store.reset_all();
    assert_eq!(*store.get(), Preferences::default());
}

#[test]
fn test_apply_json() {
    let store = PreferenceStore::default();
    let observer = Arc::new(RecordingObserver::default());
    store.add_observer(observer.clone());

    store
        .apply_json(
            r#"{
                "dom.vibrator.max_vibrate_list_len": 4,
                "privacy.donottrackheader.enabled": true,
                "intl.accept_languages": "fr-fr, fr",
                "doesntexist": true,
                "geo.enabled": 1.5
            }"#,
        )
        .unwrap();

    let prefs = store.get();
    assert_eq!(prefs.dom_vibrator_max_vibrate_list_len, 4);
    assert!(prefs.privacy_donottrackheader_enabled);
    assert_eq!(prefs.intl_accept_languages, "fr-fr, fr");
    assert!(prefs.geo_enabled);
    assert_eq!(observer.changes.lock().len(), 3);
}

#[test]
fn test_apply_json_requires_an_object() {
    let store = PreferenceStore::default();
    assert!(matches!(store.apply_json("[1, 2]"), Err(PrefError::Json(_))));
}

#[test]
fn test_parse_pref_assignment() {
    let store = PreferenceStore::default();

    store.parse_pref_assignment("dom.sms.enabled=true").unwrap();
    assert!(store.get().dom_sms_enabled);

    store.parse_pref_assignment("dom.vibrator.max_vibrate_ms=42").unwrap();
    assert_eq!(store.get().dom_vibrator_max_vibrate_ms, 42);

    store.parse_pref_assignment("general.oscpu.override=str").unwrap();
    assert_eq!(store.get().general_oscpu_override, "str");

    // Test with no value (defaults to true).
    store.set_value("dom.sysmsg.enabled", PrefValue::Bool(false)).unwrap();
    store.parse_pref_assignment("dom.sysmsg.enabled").unwrap();
    assert!(store.get().dom_sysmsg_enabled);

    assert!(store.parse_pref_assignment("doesntexist=true").is_err());
}

#[test]
fn test_read_prefs_from_missing_file() {
    let store = PreferenceStore::default();
    let path = std::env::temp_dir().join("servo-config-test-prefs-that-do-not-exist.json");
    assert!(matches!(store.read_prefs_from_file(&path), Err(PrefError::Io(_))));
}
