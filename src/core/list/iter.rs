/*!
 * List Iteration
 */

use super::link::ListLink;
use std::ptr::{self, NonNull};

/// Forward walk over the nodes of a list, head excluded
///
/// Holds raw pointers only. The list must not be mutated while the
/// iterator is live, other than removing the node most recently yielded.
pub struct Iter {
    head: *const ListLink,
    cursor: *mut ListLink,
}

impl Iterator for Iter {
    type Item = NonNull<ListLink>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.is_null() || ptr::eq(self.cursor, self.head) {
            return None;
        }
        let current = self.cursor;
        // Safety: `iter` made the caller vouch for every linked node.
        self.cursor = unsafe { (*current).next };
        NonNull::new(current)
    }
}

/// Iterate the nodes of the list headed by `head`
///
/// # Safety
/// `head` and every node linked to it must stay valid, and the caller must
/// hold the list's lock, for as long as the iterator is used.
pub unsafe fn iter(head: *const ListLink) -> Iter {
    Iter {
        head,
        cursor: (*head).next,
    }
}

/// Count the nodes on a list (O(n))
///
/// # Safety
/// Same as [`iter`].
pub unsafe fn len(head: *const ListLink) -> usize {
    iter(head).count()
}
