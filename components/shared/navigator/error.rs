/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Errors reported to script by the navigator and the services behind it.

use std::fmt;

/// DOM exceptions and engine failures that can be thrown at script.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// NotSupportedError DOMException
    NotSupported,
    /// SyntaxError DOMException
    Syntax,
    /// SecurityError DOMException
    Security,
    /// The object the operation was invoked on is no longer attached to a live window.
    Unexpected,
    /// A generic failure of the operation.
    Failure,
    /// The window is not the one currently displayed in its browsing context.
    NotAvailable,
    /// The feature is switched off.
    NotImplemented,
    /// The URL cannot be used for this operation.
    BadUri,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::NotSupported => f.write_str("The operation is not supported."),
            Error::Syntax => f.write_str("The string did not match the expected pattern."),
            Error::Security => f.write_str("The operation is insecure."),
            Error::Unexpected => f.write_str("The window has gone away."),
            Error::Failure => f.write_str("The operation failed."),
            Error::NotAvailable => f.write_str("The window is not the current inner window."),
            Error::NotImplemented => f.write_str("The feature is not enabled."),
            Error::BadUri => f.write_str("The URI is not valid for this operation."),
        }
    }
}

impl std::error::Error for Error {}

/// The return type for IDL operations that can throw DOM exceptions.
pub type Fallible<T> = Result<T, Error>;

/// The return type for IDL operations that can throw DOM exceptions and
/// return `()`.
pub type ErrorResult = Fallible<()>;
