//! # Scoped Context Stack
//!
//! Request-scoped overrides of any option. Each thread owns its own stack;
//! frames pushed on one thread are invisible to every other thread.
//!
//! ```ignore
//! let _outer = countries_context(CountriesOptions::new().with_first([us]));
//! {
//!     let _inner = countries_context(CountriesOptions::new().with_first([fr]));
//!     // lists start with FR here
//! }
//! // and with US again here
//! ```
//!
//! A frame lives exactly as long as its [`ContextGuard`]. The guard is not
//! `Send`, so it is dropped on the thread that pushed it, including when the
//! scope unwinds.

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::settings::CountriesOptions;

thread_local! {
    static FRAMES: RefCell<Vec<CountriesOptions>> = const { RefCell::new(Vec::new()) };
}

/// Push a frame; it is popped when the returned guard drops.
#[must_use = "dropping this guard pops the context frame"]
pub fn countries_context(options: CountriesOptions) -> ContextGuard {
    let depth = FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        frames.push(options);
        frames.len() - 1
    });
    tracing::trace!(depth, "pushed countries context frame");
    ContextGuard {
        depth,
        _not_send: PhantomData,
    }
}

/// Run `f` with a frame pushed for its duration.
pub fn with_context<R>(options: CountriesOptions, f: impl FnOnce() -> R) -> R {
    let _guard = countries_context(options);
    f()
}

/// All frames of this thread merged innermost-first.
pub fn current() -> CountriesOptions {
    FRAMES.with(|frames| {
        frames
            .borrow()
            .iter()
            .rev()
            .fold(CountriesOptions::default(), |merged, frame| merged.over(frame))
    })
}

/// Number of frames on this thread's stack.
pub fn depth() -> usize {
    FRAMES.with(|frames| frames.borrow().len())
}

/// RAII guard for one context frame.
#[must_use = "dropping this guard pops the context frame"]
#[derive(Debug)]
pub struct ContextGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        // Truncate, not pop: an outer guard may drop before an inner one.
        let depth = self.depth;
        let _ = FRAMES.try_with(|frames| frames.borrow_mut().truncate(depth));
        tracing::trace!(depth, "popped countries context frame");
    }
}
