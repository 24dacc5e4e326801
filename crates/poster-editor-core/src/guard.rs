//! Re-entrancy guards for event handlers that can trigger each other.

use std::cell::Cell;

/// "Currently syncing" flag for paired controls.
///
/// While a scope is alive, handlers that check [`is_active`](Self::is_active)
/// should return without acting.
#[derive(Debug, Default)]
pub struct EchoGuard {
    active: Cell<bool>,
}

impl EchoGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Enter the guard. Returns `None` if it is already held.
    pub fn enter(&self) -> Option<EchoScope<'_>> {
        if self.active.replace(true) {
            return None;
        }
        Some(EchoScope { guard: self })
    }
}

pub struct EchoScope<'a> {
    guard: &'a EchoGuard,
}

impl Drop for EchoScope<'_> {
    fn drop(&mut self) {
        self.guard.active.set(false);
    }
}

/// Single-flight gate where the most recent request wins.
///
/// A value submitted while the handler is running is parked, replacing any
/// earlier parked value, and handled once the running call returns.
pub struct LatestWins<T> {
    running: Cell<bool>,
    parked: Cell<Option<T>>,
}

impl<T> Default for LatestWins<T> {
    fn default() -> Self {
        Self {
            running: Cell::new(false),
            parked: Cell::new(None),
        }
    }
}

impl<T> std::fmt::Debug for LatestWins<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestWins")
            .field("running", &self.running.get())
            .finish_non_exhaustive()
    }
}

impl<T> LatestWins<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Run `f` with `value`, or park `value` if a call is in flight.
    ///
    /// Returns `true` when this call ran the handler itself.
    pub fn submit(&self, value: T, mut f: impl FnMut(T)) -> bool {
        if self.running.replace(true) {
            self.parked.set(Some(value));
            return false;
        }
        let mut next = Some(value);
        while let Some(value) = next {
            f(value);
            next = self.parked.take();
        }
        self.running.set(false);
        true
    }
}
