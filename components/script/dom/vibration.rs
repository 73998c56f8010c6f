/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! <https://w3c.github.io/vibration/>

use std::cell::{Cell, RefCell};
use std::ptr;
use std::rc::{Rc, Weak};

use log::debug;
use navigator_traits::{
    Document, Error, Fallible, ListenerId, Vibrator, VisibilityListener, WindowId,
};

/// The argument of `navigator.vibrate()`, as passed by script.
#[derive(Clone, Debug, PartialEq)]
pub enum VibratePattern {
    Duration(i64),
    Pattern(Vec<i64>),
}

impl From<i64> for VibratePattern {
    fn from(duration: i64) -> Self {
        VibratePattern::Duration(duration)
    }
}

impl From<Vec<i64>> for VibratePattern {
    fn from(pattern: Vec<i64>) -> Self {
        VibratePattern::Pattern(pattern)
    }
}

fn vibration_duration(value: i64, max_vibrate_ms: u32) -> Fallible<u32> {
    match u32::try_from(value) {
        Ok(duration) if duration <= max_vibrate_ms => Ok(duration),
        _ => Err(Error::NotSupported),
    }
}

impl VibratePattern {
    /// Convert to the durations handed to the vibrator. Negative entries, entries longer
    /// than `max_vibrate_ms` and patterns with more than `max_list_len` entries are
    /// rejected, never clamped.
    pub fn to_durations(&self, max_vibrate_ms: u32, max_list_len: u32) -> Fallible<Vec<u32>> {
        match *self {
            VibratePattern::Duration(duration) => {
                Ok(vec![vibration_duration(duration, max_vibrate_ms)?])
            },
            VibratePattern::Pattern(ref pattern) => {
                if pattern.len() > max_list_len as usize {
                    return Err(Error::NotSupported);
                }
                pattern
                    .iter()
                    .map(|&duration| vibration_duration(duration, max_vibrate_ms))
                    .collect()
            },
        }
    }
}

thread_local! {
    /// The listener of the window whose vibration is playing. There is at most one.
    static VIBRATE_WINDOW_LISTENER: RefCell<Option<Rc<VibrateWindowListener>>> =
        const { RefCell::new(None) };
}

/// Cancels the vibration of a window once its document is hidden.
struct VibrateWindowListener {
    window: WindowId,
    document: Weak<dyn Document>,
    vibrator: Rc<dyn Vibrator>,
    listener_id: Cell<Option<ListenerId>>,
}

impl VibrateWindowListener {
    fn register(
        window: WindowId,
        document: &Rc<dyn Document>,
        vibrator: Rc<dyn Vibrator>,
    ) -> Rc<VibrateWindowListener> {
        let listener = Rc::new(VibrateWindowListener {
            window,
            document: Rc::downgrade(document),
            vibrator,
            listener_id: Cell::new(None),
        });
        let id = document.add_visibility_listener(listener.clone());
        listener.listener_id.set(Some(id));
        listener
    }

    fn remove_listener(&self) {
        let Some(id) = self.listener_id.take() else {
            return;
        };
        if let Some(document) = self.document.upgrade() {
            document.remove_visibility_listener(id);
        }
    }
}

impl VisibilityListener for VibrateWindowListener {
    fn visibility_changed(&self) {
        if !self.document.upgrade().is_none_or(|document| document.hidden()) {
            return;
        }

        // Cancelling only stops our own pattern; a vibration started meanwhile by
        // another window keeps playing.
        debug!("Document hidden, cancelling vibration of {:?}", self.window);
        self.vibrator.cancel_vibrate(self.window);
        self.remove_listener();

        let current = VIBRATE_WINDOW_LISTENER.with(|listener| {
            listener
                .borrow_mut()
                .take_if(|current| ptr::eq(Rc::as_ptr(current), self))
        });
        // `self` may be freed once this goes away.
        drop(current);
    }
}

/// Play `pattern` on behalf of `window`, whose document is `document`, and watch the
/// document so that the vibration stops when it is hidden. The listener of any earlier
/// vibration is removed first.
pub(crate) fn vibrate(
    window: WindowId,
    document: &Rc<dyn Document>,
    vibrator: &Rc<dyn Vibrator>,
    pattern: &[u32],
) {
    let previous = VIBRATE_WINDOW_LISTENER.with(|listener| listener.borrow_mut().take());
    if let Some(previous) = previous {
        previous.remove_listener();
    }

    let listener = VibrateWindowListener::register(window, document, vibrator.clone());
    VIBRATE_WINDOW_LISTENER.with(|current| *current.borrow_mut() = Some(listener));

    debug!("Vibrating {:?} with pattern {:?}", window, pattern);
    vibrator.vibrate(pattern, window);
}

/// The window whose vibration is being watched, if any.
pub fn vibrating_window() -> Option<WindowId> {
    VIBRATE_WINDOW_LISTENER.with(|listener| listener.borrow().as_ref().map(|l| l.window))
}

/// Remove the visibility listener of the current vibration without cancelling it. Called
/// when the script thread shuts down.
pub fn clear_vibrate_window_listener() {
    let listener = VIBRATE_WINDOW_LISTENER.with(|listener| listener.borrow_mut().take());
    if let Some(listener) = listener {
        listener.remove_listener();
    }
}
