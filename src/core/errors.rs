/*!
 * Error Taxonomy
 * Closed set of semantic result codes with platform message lookup
 *
 * Every code is an alias for a platform errno, so message lookup goes
 * straight through the platform's own error-string table. Some codes alias
 * the same errno on purpose (NO_MEMORY and RESOURCE_LIMIT are both ENOMEM).
 */

use miette::Diagnostic;
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Result code returned by the synchronization primitives
///
/// `NONE` is success and is always zero. All other codes are non-zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct SysReturn(i32);

impl SysReturn {
    pub const NONE: Self = Self(0);
    pub const TIMED_OUT: Self = Self(Errno::ETIMEDOUT as i32);
    pub const TRY_AGAIN: Self = Self(Errno::EAGAIN as i32);
    pub const NOT_FOUND: Self = Self(Errno::ENOENT as i32);
    pub const EXISTS: Self = Self(Errno::EEXIST as i32);
    pub const INVALID_ARGUMENT: Self = Self(Errno::EINVAL as i32);
    pub const INVALID_STATE: Self = Self(Errno::ENOTRECOVERABLE as i32);
    pub const NO_MEMORY: Self = Self(Errno::ENOMEM as i32);
    pub const NO_PRIVILEGE: Self = Self(Errno::EPERM as i32);
    pub const UNIMPLEMENTED: Self = Self(Errno::ENOSYS as i32);
    pub const RESOURCE_LIMIT: Self = Self(Errno::ENOMEM as i32);
    pub const RECALLED: Self = Self(Errno::ECANCELED as i32);
    pub const INVALID_ADDRESS: Self = Self(Errno::EFAULT as i32);
    pub const INVALID_HANDLE: Self = Self(Errno::EBADF as i32);
    pub const STALE_HANDLE: Self = Self(Errno::ESTALE as i32);
    pub const PROTECTION_FAILURE: Self = Self(Errno::EACCES as i32);
    pub const INVALID_OPERATION: Self = Self(Errno::EOPNOTSUPP as i32);

    /// Every defined code, aliases included
    pub const ALL: [Self; 17] = [
        Self::NONE,
        Self::TIMED_OUT,
        Self::TRY_AGAIN,
        Self::NOT_FOUND,
        Self::EXISTS,
        Self::INVALID_ARGUMENT,
        Self::INVALID_STATE,
        Self::NO_MEMORY,
        Self::NO_PRIVILEGE,
        Self::UNIMPLEMENTED,
        Self::RESOURCE_LIMIT,
        Self::RECALLED,
        Self::INVALID_ADDRESS,
        Self::INVALID_HANDLE,
        Self::STALE_HANDLE,
        Self::PROTECTION_FAILURE,
        Self::INVALID_OPERATION,
    ];

    /// Wrap a raw platform error number
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Underlying platform error number
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Codes a caller may reasonably retry after
    pub fn is_retryable(self) -> bool {
        self == Self::TRY_AGAIN || self == Self::TIMED_OUT
    }

    /// Symbolic name of the code
    ///
    /// Aliased errnos report the first name defined for them, so
    /// RESOURCE_LIMIT reads back as NO_MEMORY.
    pub fn name(self) -> &'static str {
        match self {
            Self::NONE => "NONE",
            Self::TIMED_OUT => "TIMED_OUT",
            Self::TRY_AGAIN => "TRY_AGAIN",
            Self::NOT_FOUND => "NOT_FOUND",
            Self::EXISTS => "EXISTS",
            Self::INVALID_ARGUMENT => "INVALID_ARGUMENT",
            Self::INVALID_STATE => "INVALID_STATE",
            Self::NO_MEMORY => "NO_MEMORY",
            Self::NO_PRIVILEGE => "NO_PRIVILEGE",
            Self::UNIMPLEMENTED => "UNIMPLEMENTED",
            Self::RECALLED => "RECALLED",
            Self::INVALID_ADDRESS => "INVALID_ADDRESS",
            Self::INVALID_HANDLE => "INVALID_HANDLE",
            Self::STALE_HANDLE => "STALE_HANDLE",
            Self::PROTECTION_FAILURE => "PROTECTION_FAILURE",
            Self::INVALID_OPERATION => "INVALID_OPERATION",
            _ => "UNKNOWN",
        }
    }

    /// Human-readable description, see [`message_for`]
    #[inline]
    pub fn message(self) -> &'static str {
        message_for(self)
    }

    /// `Ok(())` for NONE, `Err` carrying the code otherwise
    #[inline]
    pub fn into_result(self) -> SysResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(SysError::new(self))
        }
    }
}

impl fmt::Debug for SysReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

impl fmt::Display for SysReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Default for SysReturn {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<Errno> for SysReturn {
    fn from(errno: Errno) -> Self {
        Self(errno as i32)
    }
}

impl From<SysError> for SysReturn {
    fn from(err: SysError) -> Self {
        err.code
    }
}

/// Failed operation carrying a non-NONE code
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
#[error("{} ({})", .code.message(), .code.name())]
#[diagnostic(
    code(substrate::sys_error),
    help("TRY_AGAIN and TIMED_OUT are retryable; other codes indicate a failed precondition or exhausted resource.")
)]
pub struct SysError {
    code: SysReturn,
}

impl SysError {
    pub fn new(code: SysReturn) -> Self {
        debug_assert!(!code.is_success(), "SysError built from NONE");
        Self { code }
    }

    #[inline]
    pub fn code(&self) -> SysReturn {
        self.code
    }
}

/// Result type for substrate operations
pub type SysResult<T> = std::result::Result<T, SysError>;

/// Look up the description of a code
///
/// Goes through the platform's errno table, so two codes aliasing the same
/// errno always describe themselves identically. Unknown numbers still get a
/// non-empty description.
pub fn message_for(code: SysReturn) -> &'static str {
    if code.is_success() {
        return "Success";
    }
    Errno::from_raw(code.raw()).desc()
}

/// Text emitted by [`print_error`]
pub fn format_error(context: &str, code: SysReturn) -> String {
    format!("{}: {}", context, message_for(code))
}

/// Report a failure and its context through the log
pub fn print_error(context: &str, code: SysReturn) {
    error!(
        code = code.raw(),
        name = code.name(),
        "{}",
        format_error(context, code)
    );
}
