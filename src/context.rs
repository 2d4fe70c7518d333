//! Per-thread logging context
//!
//! Each thread may register a name that is stamped on its events, and keeps
//! a call depth used as the default indentation level.

use std::cell::{Cell, RefCell};

use crate::{config::THREAD_NAME_CAPACITY, event::text::truncate_at_boundary};

thread_local! {
    static THREAD_NAME: RefCell<String> = const { RefCell::new(String::new()) };
    static CALL_DEPTH: Cell<u8> = const { Cell::new(0) };
}

/// Register the name stamped on this thread's events
pub fn set_thread_name(name: &str) {
    let name = truncate_at_boundary(name, THREAD_NAME_CAPACITY - 1);
    THREAD_NAME.with(|cell| {
        let mut current = cell.borrow_mut();
        current.clear();
        current.push_str(name);
    });
}

/// Forget this thread's name
pub fn clear_thread_name() {
    THREAD_NAME.with(|cell| cell.borrow_mut().clear());
}

/// This thread's registered name, if any
pub fn thread_name() -> Option<String> {
    THREAD_NAME.with(|cell| {
        let name = cell.borrow();
        (!name.is_empty()).then(|| name.clone())
    })
}

/// Run `f` with the registered name without cloning it
pub(crate) fn with_thread_name<R>(f: impl FnOnce(Option<&str>) -> R) -> R {
    THREAD_NAME.with(|cell| {
        let name = cell.borrow();
        f((!name.is_empty()).then_some(name.as_str()))
    })
}

/// Current call depth of this thread
pub fn call_depth() -> u8 {
    CALL_DEPTH.with(Cell::get)
}

/// Increase the call depth until the returned guard drops
pub fn enter_scope() -> ScopeGuard {
    CALL_DEPTH.with(|depth| depth.set(depth.get().saturating_add(1)));
    ScopeGuard { _private: () }
}

/// Restores the call depth on drop
#[derive(Debug)]
#[must_use = "the call depth drops back as soon as the guard is dropped"]
pub struct ScopeGuard {
    _private: (),
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        CALL_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
