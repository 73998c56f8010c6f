/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use navigator_traits::{AppInfo, Error, Fallible, HttpProtocolHandler};
use servo_config::prefs::Preferences;

/// An override preference applies to content callers only, and only once it is set.
fn content_override(value: &str, is_caller_chrome: bool) -> Option<String> {
    if is_caller_chrome || value.is_empty() {
        return None;
    }
    Some(value.to_owned())
}

pub fn product() -> String {
    "Gecko".to_owned()
}

pub fn product_sub() -> String {
    // Legacy build ID hardcoded for backward compatibility.
    "20100101".to_owned()
}

pub fn vendor() -> String {
    String::new()
}

pub fn vendor_sub() -> String {
    String::new()
}

pub fn taint_enabled() -> bool {
    false
}

pub fn app_code_name(handler: &dyn HttpProtocolHandler) -> Fallible<String> {
    handler.app_name()
}

pub fn app_name(prefs: &Preferences, is_caller_chrome: bool) -> String {
    content_override(&prefs.general_appname_override, is_caller_chrome)
        .unwrap_or_else(|| "Netscape".to_owned()) // Like Gecko/Webkit
}

pub fn user_agent(handler: &dyn HttpProtocolHandler) -> Fallible<String> {
    handler.user_agent()
}

pub fn app_version(
    handler: &dyn HttpProtocolHandler,
    prefs: &Preferences,
    is_caller_chrome: bool,
) -> Fallible<String> {
    if let Some(app_version) =
        content_override(&prefs.general_appversion_override, is_caller_chrome)
    {
        return Ok(app_version);
    }
    Ok(format!("{} ({})", handler.app_version()?, handler.platform()?))
}

pub fn platform(
    handler: &dyn HttpProtocolHandler,
    prefs: &Preferences,
    is_caller_chrome: bool,
) -> Fallible<String> {
    if let Some(platform) = content_override(&prefs.general_platform_override, is_caller_chrome) {
        return Ok(platform);
    }
    // Pages sniff these exact values, so they are fixed at build time.
    if cfg!(all(target_os = "windows", target_pointer_width = "64")) {
        Ok("Win64".to_owned())
    } else if cfg!(target_os = "windows") {
        Ok("Win32".to_owned())
    } else if cfg!(target_os = "macos") {
        Ok("MacIntel".to_owned())
    } else {
        handler.oscpu()
    }
}

pub fn oscpu(
    handler: &dyn HttpProtocolHandler,
    prefs: &Preferences,
    is_caller_chrome: bool,
) -> Fallible<String> {
    if let Some(oscpu) = content_override(&prefs.general_oscpu_override, is_caller_chrome) {
        return Ok(oscpu);
    }
    handler.oscpu()
}

pub fn build_id(
    app_info: Option<&dyn AppInfo>,
    prefs: &Preferences,
    is_caller_chrome: bool,
) -> Fallible<String> {
    if let Some(build_id) = content_override(&prefs.general_build_id_override, is_caller_chrome)
    {
        return Ok(build_id);
    }
    app_info.ok_or(Error::NotImplemented)?.app_build_id()
}

/// The first of the user's content languages, e.g. "en-US" for "en-us, de;q=0.5".
/// Invalid values are passed through so that pages can fall back to their own default.
pub fn language(accept_languages: &str) -> String {
    let first = accept_languages.split(',').next().unwrap_or_default();
    let language = first.split(';').next().unwrap_or_default().trim();

    let mut language = language.to_owned();
    // Avoid the POSIX/Windows "en_US" notation.
    if language.len() > 2 && language.as_bytes()[2] == b'_' {
        language.replace_range(2..3, "-");
    }
    if language.len() <= 2 {
        return language;
    }

    // Upper case two letter country codes ("en-US"), but not longer subtags such as
    // "zh-Hant" or "de-DE-x-goethe".
    language
        .split('-')
        .enumerate()
        .map(|(index, code)| {
            if index > 0 && code.len() == 2 {
                code.to_ascii_uppercase()
            } else {
                code.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
