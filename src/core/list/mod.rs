/*!
 * Intrusive List Engine
 *
 * Circular doubly-linked lists over link fields embedded in the caller's
 * own structures. No allocation, no locking, no error results.
 *
 * # Contract
 *
 * Every operation is `unsafe`: the caller guarantees the pointers are valid
 * and holds the lock that protects the whole list for the duration of the
 * call. Free lists and wait queues built on this pair each list with its
 * own lock (see `memory::pool` for one).
 *
 * Take each link's address once, from `Box::into_raw` or `addr_of_mut!`
 * through a raw pointer to its owner, and keep reusing that pointer.
 * Reborrowing the owner as `&mut` while it is linked invalidates the
 * neighbour pointers other links hold to it.
 *
 * Precondition violations that indicate a caller bug (moving into a
 * non-empty list) panic instead of returning a code.
 */

mod iter;
mod link;
mod ops;

pub use iter::{iter, len, Iter};
pub use link::ListLink;
pub use ops::{add_after, add_before, init, insert, is_empty, join, move_list, remove, remove_head};
