/*!
 * List Operations
 *
 * O(1) splice primitives over embedded links. None of these lock: the
 * caller holds whatever lock protects the list for the whole call.
 */

use super::link::ListLink;
use std::ptr::{self, NonNull};

/// Make `head` an empty list (or `node` a standalone singleton)
///
/// # Safety
/// `head` must be valid for writes.
#[inline]
pub unsafe fn init(head: *mut ListLink) {
    (*head).next = head;
    (*head).prev = head;
}

/// True if the list headed by `head` holds no nodes
///
/// A detached head (never initialized) counts as empty.
///
/// # Safety
/// `head` must be valid for reads.
#[inline]
pub unsafe fn is_empty(head: *const ListLink) -> bool {
    let next = (*head).next;
    next.is_null() || ptr::eq(next, head)
}

/// Splice `new` between two adjacent links
///
/// # Safety
/// `after.next == before` must hold, all three pointers must be valid, and
/// `new` must not currently be linked into a list.
#[inline]
pub unsafe fn insert(after: *mut ListLink, before: *mut ListLink, new: *mut ListLink) {
    debug_assert!(ptr::eq((*after).next, before), "insert: links are not adjacent");
    (*new).prev = after;
    (*new).next = before;
    (*after).next = new;
    (*before).prev = new;
}

/// Insert `new` immediately after `reference`
///
/// With a list head as `reference` this pushes to the front.
///
/// # Safety
/// `reference` must be linked (or an initialized head); `new` must be unlinked.
#[inline]
pub unsafe fn add_after(reference: *mut ListLink, new: *mut ListLink) {
    insert(reference, (*reference).next, new);
}

/// Insert `new` immediately before `reference`
///
/// With a list head as `reference` this appends to the tail.
///
/// # Safety
/// `reference` must be linked (or an initialized head); `new` must be unlinked.
#[inline]
pub unsafe fn add_before(reference: *mut ListLink, new: *mut ListLink) {
    insert((*reference).prev, reference, new);
}

/// Unlink `node` from whatever list holds it
///
/// Neighbours are joined back together and `node` is left as a singleton.
///
/// # Safety
/// `node` must currently be linked into a valid list. Passing a detached
/// node is a caller bug; it is only caught in debug builds.
#[inline]
pub unsafe fn remove(node: *mut ListLink) {
    debug_assert!(!(*node).is_detached(), "remove: node is not linked");
    let prev = (*node).prev;
    let next = (*node).next;
    (*prev).next = next;
    (*next).prev = prev;
    init(node);
}

/// Unlink and return the first node, or `None` if the list is empty
///
/// # Safety
/// `head` must be a valid list head and every linked node must be valid.
pub unsafe fn remove_head(head: *mut ListLink) -> Option<NonNull<ListLink>> {
    if is_empty(head) {
        return None;
    }
    let first = (*head).next;
    remove(first);
    NonNull::new(first)
}

/// Transfer every node of `from` onto the empty head `to`
///
/// `from` ends empty. An empty `from` just re-initializes `to`.
///
/// # Panics
/// If `to` is not empty. That is a caller contract violation, not a
/// recoverable condition.
///
/// # Safety
/// Both heads and every node linked to `from` must be valid.
pub unsafe fn move_list(from: *mut ListLink, to: *mut ListLink) {
    assert!(is_empty(to), "move_list: destination list is not empty");

    if is_empty(from) {
        init(to);
        return;
    }

    let first = (*from).next;
    let last = (*from).prev;
    (*to).next = first;
    (*to).prev = last;
    (*first).prev = to;
    (*last).next = to;
    init(from);
}

/// Splice the whole of `src` right after the link `dest`
///
/// Nodes keep their order; whatever followed `dest` now follows the last
/// spliced node. `src` ends empty. Joining an empty `src` does nothing.
///
/// # Safety
/// `dest` must be linked (or an initialized head) in a list other than
/// `src`; `src` and its nodes must be valid.
pub unsafe fn join(dest: *mut ListLink, src: *mut ListLink) {
    if is_empty(src) {
        return;
    }

    let first = (*src).next;
    let last = (*src).prev;
    let at = (*dest).next;

    (*dest).next = first;
    (*first).prev = dest;
    (*last).next = at;
    (*at).prev = last;
    init(src);
}
