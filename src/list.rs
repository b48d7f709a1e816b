extern crate alloc;

use alloc::boxed::Box;
use alloc::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};

/// One boxed node of a [`List`]. The cache index keeps raw pointers to these.
pub struct Entry<T> {
    /// Uninitialized only in the two sentinels.
    val: mem::MaybeUninit<T>,
    prev: *mut Entry<T>,
    next: *mut Entry<T>,
}

impl<T> Entry<T> {
    fn new(val: T) -> Self {
        Entry {
            val: mem::MaybeUninit::new(val),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Creates a sentinel entry without initializing the value.
    fn new_sigil() -> Self {
        Entry {
            val: mem::MaybeUninit::uninit(),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Returns a reference to the stored value.
    ///
    /// # Safety
    ///
    /// The entry must not be a sigil node.
    pub unsafe fn get_value(&self) -> &T {
        self.val.assume_init_ref()
    }

    /// Returns a mutable reference to the stored value.
    ///
    /// # Safety
    ///
    /// The entry must not be a sigil node.
    pub unsafe fn get_value_mut(&mut self) -> &mut T {
        self.val.assume_init_mut()
    }

    /// Consumes a detached entry and moves its value out.
    ///
    /// Entries handed out by the list (`remove`, `remove_last`) always carry
    /// an initialized value; sigils never leave the list.
    pub fn into_value(self: Box<Self>) -> T {
        // SAFETY: only non-sigil entries are ever returned by the list
        unsafe { self.val.assume_init_read() }
    }
}

/// The recency ordering of a cache: a doubly linked list bounded by two
/// sentinel nodes.
///
/// The front (just after `head`) is the most recently used entry and the
/// back (just before `tail`) is the least recently used one. Nodes are boxed
/// individually and never move once linked, so raw pointers to them stay
/// valid until the node is removed. The list does not enforce a capacity;
/// the owning cache decides when to evict.
pub struct List<T> {
    len: usize,
    /// Sentinel before the most recently used entry.
    head: *mut Entry<T>,
    /// Sentinel after the least recently used entry.
    tail: *mut Entry<T>,
}

impl<T> List<T> {
    /// Creates an empty list with its two sentinels linked together.
    pub fn new() -> List<T> {
        let head = Box::into_raw(Box::new(Entry::new_sigil()));
        let tail = Box::into_raw(Box::new(Entry::new_sigil()));

        unsafe {
            // SAFETY: both sentinels were just allocated
            (*head).next = tail;
            (*tail).prev = head;
        }

        List { len: 0, head, tail }
    }

    /// Number of linked entries, sentinels excluded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pushes a value to the front of the list and returns a handle to its node.
    ///
    /// The handle stays valid until the node is removed or the list is dropped.
    pub fn push_front(&mut self, v: T) -> *mut Entry<T> {
        // SAFETY: Box::into_raw never returns null
        let node = unsafe { NonNull::new_unchecked(Box::into_raw(Box::new(Entry::new(v)))) };
        // SAFETY: fresh node, not linked anywhere
        unsafe { self.attach(node.as_ptr()) };
        self.len += 1;
        node.as_ptr()
    }

    /// Returns the value at the back of the list (the least recently used one).
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so tail.prev is a live non-sigil node
        unsafe { Some((*(*self.tail).prev).get_value()) }
    }

    /// Unlinks the back node and returns it.
    pub fn remove_last(&mut self) -> Option<Box<Entry<T>>> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: tail is valid and the list is not empty, so tail.prev is a
        // real node owned by this list
        let prev = unsafe { (*self.tail).prev };
        unsafe {
            self.detach(prev);
        }
        self.len -= 1;
        // SAFETY: prev was allocated by push_front and is now unlinked
        unsafe { Some(Box::from_raw(prev)) }
    }

    /// Unlinks `node` and returns it.
    ///
    /// # Safety
    ///
    /// `node` must be a handle returned by `push_front` on this list that has
    /// not been removed yet.
    pub unsafe fn remove(&mut self, node: *mut Entry<T>) -> Option<Box<Entry<T>>> {
        if self.is_empty() || node.is_null() || node == self.head || node == self.tail {
            return None;
        }

        unsafe {
            // SAFETY: caller guarantees node is live and part of this list
            self.detach(node);
            self.len -= 1;
            Some(Box::from_raw(node))
        }
    }

    /// Moves a node to the front of the list.
    ///
    /// # Safety
    ///
    /// `node` must point to a live entry in this list.
    pub unsafe fn move_to_front(&mut self, node: *mut Entry<T>) {
        if node.is_null() || node == self.head || node == self.tail {
            return;
        }

        if (*self.head).next == node {
            return;
        }

        self.detach(node);
        self.attach(node);
    }

    /// Replaces the value of `node` and returns the previous value.
    ///
    /// # Safety
    ///
    /// `node` must point to a live non-sigil entry in this list.
    pub unsafe fn update(&mut self, node: *mut Entry<T>, v: T) -> T {
        mem::replace(&mut (*node).val, mem::MaybeUninit::new(v)).assume_init()
    }

    /// Iterates from the front (most recent) to the back (least recent).
    ///
    /// Use `.rev()` to walk from the back.
    pub fn iter(&self) -> Iter<'_, T> {
        // SAFETY: head and tail are valid for the lifetime of the list
        unsafe {
            Iter {
                front: (*self.head).next,
                back: (*self.tail).prev,
                remaining: self.len,
                _marker: PhantomData,
            }
        }
    }

    /// Drops every value in the list.
    pub fn clear(&mut self) {
        while let Some(entry) = self.remove_last() {
            drop(entry.into_value());
        }
    }

    /// # Safety
    ///
    /// `node` must point to a live entry in this list.
    unsafe fn detach(&mut self, node: *mut Entry<T>) {
        // SAFETY: node is linked, so its prev and next pointers are valid
        unsafe {
            (*(*node).prev).next = (*node).next;
            (*(*node).next).prev = (*node).prev;
        }
    }

    /// Links `node` right after the head sentinel.
    ///
    /// # Safety
    ///
    /// `node` must be a valid entry that is not currently linked into any list.
    unsafe fn attach(&mut self, node: *mut Entry<T>) {
        (*node).next = (*self.head).next;
        (*node).prev = self.head;
        (*self.head).next = node;
        (*(*node).next).prev = node;
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        List::new()
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        self.clear();

        // SAFETY: head and tail were allocated in `new` and are freed only here
        unsafe {
            drop(Box::from_raw(self.head));
            drop(Box::from_raw(self.tail));
        }
    }
}

impl<T> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List").field("length", &self.len).finish()
    }
}

/// Borrowing iterator over a [`List`], front to back.
pub struct Iter<'a, T> {
    front: *mut Entry<T>,
    back: *mut Entry<T>,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: remaining > 0 means front is a live non-sigil node, and the
        // list is borrowed for 'a so nothing can unlink it
        unsafe {
            let node = self.front;
            self.front = (*node).next;
            Some((*node).get_value())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: same as `next`
        unsafe {
            let node = self.back;
            self.back = (*node).prev;
            Some((*node).get_value())
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
