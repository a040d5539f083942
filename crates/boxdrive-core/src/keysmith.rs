//! Per-key coordination registry.
//!
//! [`Keysmith`] hands out two kinds of scoped acquisitions over a shared
//! keyspace:
//!
//! - [`Keysmith::lock`] — exclusive access to one key; disjoint keys proceed
//!   concurrently.
//! - [`Keysmith::lock_all`] — exclusive access to the entire keyspace,
//!   admitted only once no per-key guard is outstanding.
//!
//! Three pieces cooperate: a gate mutex serializing admission, a key→mutex
//! registry, and a counter of outstanding per-key acquisitions signalled
//! through a [`Notify`] when it drops to zero. The registry is reset whenever
//! admission observes a zero counter, so lock objects for long-gone keys are
//! reclaimed without scans or per-key reference counting.
//!
//! Acquisition is not re-entrant: a task that holds `lock(k)` and requests
//! `lock(k)` again, or `lock_all()`, deadlocks.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, Notify, OwnedMutexGuard};

/// Registry state: the outstanding-acquisition counter and the per-key
/// mutexes. Guarded by a synchronous mutex; critical sections never await.
#[derive(Default)]
struct State {
    /// Number of `lock` acquisitions admitted and not yet released. Counts
    /// waiters as well as holders, which is what makes the `lock_all`
    /// barrier sound.
    held: usize,
    locks: HashMap<String, Arc<Mutex<()>>>,
}

struct Inner {
    state: parking_lot::Mutex<State>,
    /// Signalled when `held` drops to zero.
    released: Notify,
}

/// Asynchronous per-key locking registry with a global lock-all mode.
pub struct Keysmith {
    /// Serializes the admission phase of both `lock` and `lock_all`. While a
    /// `lock_all` holds the gate, no new `lock` can pass admission, so the
    /// zero observed after waiting cannot be invalidated.
    gate: Mutex<()>,
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Keysmith {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Keysmith")
            .field("held", &state.held)
            .field("registered_keys", &state.locks.len())
            .finish_non_exhaustive()
    }
}

impl Default for Keysmith {
    fn default() -> Self {
        Self::new()
    }
}

impl Keysmith {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gate: Mutex::new(()),
            inner: Arc::new(Inner {
                state: parking_lot::Mutex::new(State::default()),
                released: Notify::new(),
            }),
        }
    }

    /// Acquire exclusive access to `key`.
    ///
    /// Blocks while another task holds the same key. Guards for distinct
    /// keys are independent. The returned guard releases on drop, including
    /// on unwinding and cancellation.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        let gate = self.gate.lock().await;
        let (mutex, token) = {
            let mut state = self.inner.state.lock();
            if state.held == 0 {
                // Quiet reset: no guard is outstanding, so every registered
                // mutex is unlocked and can be dropped wholesale.
                state.locks = HashMap::new();
            }
            state.held += 1;
            let mutex = Arc::clone(
                state
                    .locks
                    .entry(key.to_owned())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            );
            (mutex, HeldToken::new(Arc::clone(&self.inner)))
        };
        drop(gate);

        // If the caller is cancelled while queued here, dropping `token`
        // rolls the admission counter back.
        let permit = mutex.lock_owned().await;
        KeyGuard {
            _permit: permit,
            _token: token,
        }
    }

    /// Acquire exclusive access to the entire keyspace.
    ///
    /// Blocks until every outstanding per-key acquisition has released.
    /// While the returned guard is held (and already while this call waits
    /// past the gate), no new `lock` is admitted.
    pub async fn lock_all(&self) -> AllGuard<'_> {
        let gate = self.gate.lock().await;
        loop {
            // Register interest before checking, so a release between the
            // check and the await cannot be missed.
            let released = self.inner.released.notified();
            {
                let mut state = self.inner.state.lock();
                if state.held == 0 {
                    state.locks = HashMap::new();
                    break;
                }
            }
            released.await;
        }
        AllGuard {
            _gate: gate,
            inner: Arc::clone(&self.inner),
        }
    }

    #[cfg(test)]
    fn held(&self) -> usize {
        self.inner.state.lock().held
    }

    #[cfg(test)]
    fn registered_keys(&self) -> usize {
        self.inner.state.lock().locks.len()
    }
}

/// Admission bookkeeping token: decrements `held` on drop and signals when
/// the counter reaches zero. Armed before the per-key mutex is awaited so a
/// cancelled waiter rolls back its admission.
struct HeldToken {
    inner: Arc<Inner>,
}

impl HeldToken {
    fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }
}

impl Drop for HeldToken {
    fn drop(&mut self) {
        let now_zero = {
            let mut state = self.inner.state.lock();
            debug_assert!(state.held > 0);
            state.held -= 1;
            state.held == 0
        };
        if now_zero {
            self.inner.released.notify_waiters();
        }
    }
}

/// Guard for a single key, returned by [`Keysmith::lock`].
pub struct KeyGuard {
    _permit: OwnedMutexGuard<()>,
    _token: HeldToken,
}

impl std::fmt::Debug for KeyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyGuard").finish_non_exhaustive()
    }
}

/// Guard for the whole keyspace, returned by [`Keysmith::lock_all`].
pub struct AllGuard<'a> {
    _gate: tokio::sync::MutexGuard<'a, ()>,
    inner: Arc<Inner>,
}

impl Drop for AllGuard<'_> {
    fn drop(&mut self) {
        // No per-key admission can have happened while the gate was held.
        debug_assert_eq!(self.inner.state.lock().held, 0);
    }
}

impl std::fmt::Debug for AllGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllGuard").finish_non_exhaustive()
    }
}
