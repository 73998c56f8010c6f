/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The view of a script window and its document that the navigator needs.

use std::rc::Rc;

use url::Url;

use crate::ErrorResult;

/// Identifies an inner window for services that track per-window state, such as active
/// vibrations or live media streams.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WindowId(pub u64);

/// Identifies a registered event listener so that it can be removed again.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ListenerId(pub u64);

/// An inner window as seen by the navigator.
pub trait Window {
    fn window_id(&self) -> WindowId;

    /// Whether the window is still attached to a doc shell. Windows lose their doc shell
    /// when they are being torn down.
    fn has_doc_shell(&self) -> bool;

    fn has_outer_window(&self) -> bool;

    /// Whether this is the inner window currently displayed by its outer window.
    fn is_current_inner_window(&self) -> bool;

    fn extant_document(&self) -> Option<Rc<dyn Document>>;

    /// Whether the script calling into this window runs with chrome privileges.
    /// Privileged callers see the real values of overridable navigator strings.
    fn is_caller_chrome(&self) -> bool;

    fn register_idle_observer(&self, observer: Rc<dyn IdleObserver>) -> ErrorResult;

    fn unregister_idle_observer(&self, observer: &Rc<dyn IdleObserver>) -> ErrorResult;

    fn gamepads(&self) -> Vec<Rc<dyn Gamepad>>;
}

pub trait Document {
    /// <https://html.spec.whatwg.org/multipage/#dom-document-hidden>
    fn hidden(&self) -> bool;

    /// The URL of the document's principal, if it has one.
    fn url(&self) -> Option<Url>;

    fn is_chrome_document(&self) -> bool;

    /// Register a system listener for `visibilitychange` events, in the capture phase.
    fn add_visibility_listener(&self, listener: Rc<dyn VisibilityListener>) -> ListenerId;

    fn remove_visibility_listener(&self, id: ListenerId);
}

pub trait VisibilityListener {
    /// Called for every `visibilitychange` event fired at the document.
    fn visibility_changed(&self);
}

/// A script-provided observer of user idleness.
pub trait IdleObserver {
    /// Seconds of inactivity after which the observer wants to be notified.
    fn time(&self) -> u32;
    fn on_idle(&self);
    fn on_active(&self);
}

pub trait Gamepad {
    fn id(&self) -> String;
    fn index(&self) -> u32;
}
