/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The IO service: URI construction, the application identity strings sent with HTTP
//! requests and the global online/offline state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use navigator_traits::{Error, Fallible, HttpProtocolHandler, NetworkStatus};
use servo_config::prefs::PreferenceStore;
use url::Url;

const APP_CODE_NAME: &str = "Mozilla";
const APP_VERSION: &str = "5.0";
const GECKO_VERSION: &str = "128.0";

#[cfg(target_os = "windows")]
const PLATFORM: &str = "Windows";
#[cfg(target_os = "macos")]
const PLATFORM: &str = "Macintosh";
#[cfg(target_os = "android")]
const PLATFORM: &str = "Android";
#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "android")))]
const PLATFORM: &str = "X11";

#[cfg(all(target_os = "windows", target_pointer_width = "64"))]
fn default_oscpu() -> String {
    "Windows NT 10.0; Win64; x64".to_owned()
}
#[cfg(all(target_os = "windows", not(target_pointer_width = "64")))]
fn default_oscpu() -> String {
    "Windows NT 10.0".to_owned()
}
#[cfg(target_os = "macos")]
fn default_oscpu() -> String {
    "Intel Mac OS X 10.15".to_owned()
}
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_oscpu() -> String {
    format!("Linux {}", std::env::consts::ARCH)
}

/// Extract the scheme of `input`, lowercased. Leading whitespace is skipped; the scheme
/// must start with a letter, continue with letters, digits, `+`, `-` or `.`, and be
/// terminated by a colon.
pub fn extract_scheme(input: &str) -> Option<String> {
    let input = input.trim_start();
    let (scheme, _) = input.split_once(':')?;
    let mut chars = scheme.chars();
    if !chars.next()?.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some(scheme.to_ascii_lowercase())
}

pub struct IOService {
    prefs: Arc<PreferenceStore>,
    offline: AtomicBool,
}

impl IOService {
    pub fn new(prefs: Arc<PreferenceStore>) -> IOService {
        IOService {
            prefs,
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        if self.offline.swap(offline, Ordering::SeqCst) != offline {
            debug!("Network is now {}", if offline { "offline" } else { "online" });
        }
    }

    /// Parse `input` as an absolute URI, or relative to `base` when it has no scheme.
    pub fn new_uri(&self, input: &str, base: Option<&Url>) -> Fallible<Url> {
        if extract_scheme(input).is_some() {
            return Url::parse(input.trim()).map_err(|_| Error::Syntax);
        }
        let base = base.ok_or(Error::Syntax)?;
        base.join(input.trim()).map_err(|_| Error::Syntax)
    }

    /// Resolve `input` against `base`. Inputs that already carry a scheme are returned
    /// unchanged, and no input at all yields the base itself.
    pub fn make_absolute(&self, input: Option<&str>, base: &Url) -> Fallible<String> {
        let Some(input) = input else {
            return Ok(base.as_str().to_owned());
        };
        if extract_scheme(input).is_some() {
            return Ok(input.to_owned());
        }
        base.join(input.trim())
            .map(String::from)
            .map_err(|_| Error::Syntax)
    }
}

impl HttpProtocolHandler for IOService {
    fn user_agent(&self) -> Fallible<String> {
        let user_agent_override = self.prefs.get().general_useragent_override.clone();
        if !user_agent_override.is_empty() {
            return Ok(user_agent_override);
        }
        Ok(format!(
            "{APP_CODE_NAME}/{APP_VERSION} ({PLATFORM}; {}; rv:{GECKO_VERSION}) Servo/{} Firefox/{GECKO_VERSION}",
            default_oscpu(),
            env!("CARGO_PKG_VERSION"),
        ))
    }

    fn app_name(&self) -> Fallible<String> {
        Ok(APP_CODE_NAME.to_owned())
    }

    fn app_version(&self) -> Fallible<String> {
        Ok(APP_VERSION.to_owned())
    }

    fn platform(&self) -> Fallible<String> {
        Ok(PLATFORM.to_owned())
    }

    fn oscpu(&self) -> Fallible<String> {
        Ok(default_oscpu())
    }
}

impl NetworkStatus for IOService {
    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}
