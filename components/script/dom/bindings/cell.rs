/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::cell::RefCell;
use std::rc::Rc;

use navigator_traits::Fallible;

/// A nullable, mutable slot holding a reference-counted object, for members that are
/// created lazily and dropped on teardown.
///
/// No borrow of the slot is held while an initialization callback runs, so callbacks may
/// freely reenter the owner. If a callback fills the slot itself, that value wins and
/// the one the callback returned is discarded, so the slot never hands out two
/// different objects.
pub struct MutNullable<T: ?Sized> {
    ptr: RefCell<Option<Rc<T>>>,
}

impl<T: ?Sized> MutNullable<T> {
    pub fn new(initial: Option<Rc<T>>) -> MutNullable<T> {
        MutNullable {
            ptr: RefCell::new(initial),
        }
    }

    /// Retrieve a copy of the current inner value.
    pub fn get(&self) -> Option<Rc<T>> {
        self.ptr.borrow().clone()
    }

    pub fn set(&self, value: Option<Rc<T>>) {
        // Drop the old value outside of the borrow.
        let _old = self.ptr.replace(value);
    }

    /// Take the value out of the slot, leaving it empty.
    pub fn take(&self) -> Option<Rc<T>> {
        self.ptr.borrow_mut().take()
    }

    pub fn is_some(&self) -> bool {
        self.ptr.borrow().is_some()
    }

    /// Retrieve a copy of the current inner value. If it is `None`, it is initialized
    /// with the result of `cb` first.
    pub fn or_init<F>(&self, cb: F) -> Rc<T>
    where
        F: FnOnce() -> Rc<T>,
    {
        if let Some(value) = self.get() {
            return value;
        }
        let value = cb();
        self.fill(value)
    }

    /// Like `or_init`, for initializers that can fail or produce nothing. Errors and
    /// `None` leave the slot empty.
    pub fn or_try_init<F>(&self, cb: F) -> Fallible<Option<Rc<T>>>
    where
        F: FnOnce() -> Fallible<Option<Rc<T>>>,
    {
        if let Some(value) = self.get() {
            return Ok(Some(value));
        }
        Ok(cb()?.map(|value| self.fill(value)))
    }

    fn fill(&self, value: Rc<T>) -> Rc<T> {
        let mut ptr = self.ptr.borrow_mut();
        match *ptr {
            Some(ref existing) => existing.clone(),
            None => {
                *ptr = Some(value.clone());
                value
            },
        }
    }
}

impl<T: ?Sized> Default for MutNullable<T> {
    fn default() -> MutNullable<T> {
        MutNullable::new(None)
    }
}
