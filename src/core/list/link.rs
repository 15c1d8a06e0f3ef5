/*!
 * List Link
 * The link field embedded in every structure that lives on an intrusive list
 */

use std::ptr;

/// Intrusive doubly-linked list link
///
/// Embedded inside a larger structure; the list engine only relinks these,
/// it never allocates or frees them. A link used as a list head is the
/// sentinel of a circular list, so an empty list points at itself.
///
/// `ListLink::new()` produces an unlinked link with null pointers. It must
/// go through [`init`](super::init) (or be inserted into a list) before the
/// neighbour-walking operations touch it.
#[repr(C)]
#[derive(Debug)]
pub struct ListLink {
    pub(super) next: *mut ListLink,
    pub(super) prev: *mut ListLink,
}

// Safety: ListLink only carries raw pointers. Every operation that follows
// them requires the caller to hold the lock protecting the whole list.
unsafe impl Send for ListLink {}
unsafe impl Sync for ListLink {}

impl ListLink {
    /// Create a detached link with null neighbours
    pub const fn new() -> Self {
        Self {
            next: ptr::null_mut(),
            prev: ptr::null_mut(),
        }
    }

    #[inline]
    pub fn next(&self) -> *mut ListLink {
        self.next
    }

    #[inline]
    pub fn prev(&self) -> *mut ListLink {
        self.prev
    }

    /// True if the link has never been initialized or inserted
    #[inline]
    pub fn is_detached(&self) -> bool {
        self.next.is_null()
    }

    /// True if the link points at itself (empty head or standalone node)
    #[inline]
    pub fn is_singleton(&self) -> bool {
        ptr::eq(self.next, self) && ptr::eq(self.prev, self)
    }
}

impl Default for ListLink {
    fn default() -> Self {
        Self::new()
    }
}

/// Recover a pointer to the structure embedding a [`ListLink`]
///
/// `$ptr` is a `*mut ListLink` (or `*const`) pointing at the `$field` member
/// of a `$container`. The result is only meaningful if that is actually
/// true; dereferencing it is on the caller.
#[macro_export]
macro_rules! container_of {
    ($ptr:expr, $container:ty, $field:ident) => {
        ($ptr as *const $crate::core::list::ListLink as *const u8)
            .wrapping_sub(::core::mem::offset_of!($container, $field)) as *mut $container
    };
}
