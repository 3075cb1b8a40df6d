//! Screen-scoped tasks.
//!
//! A screen starts fetches when it mounts and must ignore their results once
//! it unmounts or starts a newer round (pull-to-refresh, changed filter).
//! [`ScreenScope`] owns those tasks: tearing it down aborts them, and
//! [`ScopedTask::join`] yields `None` for any result that arrives too late.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::{AbortHandle, JoinHandle};

#[derive(Debug, Default)]
struct ScopeState {
    generation: AtomicU64,
    torn_down: AtomicBool,
}

/// Token telling whether the scope generation it was taken in is current.
#[derive(Debug, Clone)]
pub struct ScopeGuard {
    state: Arc<ScopeState>,
    generation: u64,
}

impl ScopeGuard {
    /// `false` once the scope was torn down or restarted.
    pub fn is_current(&self) -> bool {
        !self.state.torn_down.load(Ordering::SeqCst)
            && self.state.generation.load(Ordering::SeqCst) == self.generation
    }
}

/// Handle on a task spawned in a [`ScreenScope`].
#[derive(Debug)]
pub struct ScopedTask<T> {
    handle: JoinHandle<T>,
    guard: ScopeGuard,
}

impl<T> ScopedTask<T> {
    /// Wait for the result. `None` if the task was aborted, panicked, or
    /// finished after its scope moved on.
    pub async fn join(self) -> Option<T> {
        match self.handle.await {
            Ok(value) if self.guard.is_current() => Some(value),
            Ok(_) => None,
            Err(e) => {
                if e.is_panic() {
                    log::warn!("[SCOPE] Screen task panicked: {}", e);
                }
                None
            },
        }
    }

    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Owner of the async work started by one screen.
///
/// Dropping the scope tears it down.
#[derive(Debug, Default)]
pub struct ScreenScope {
    state: Arc<ScopeState>,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `future` on the current runtime, tied to this scope.
    ///
    /// After teardown the future is aborted right away.
    pub fn spawn<F>(&self, future: F) -> ScopedTask<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let guard = self.guard();
        let handle = tokio::spawn(future);

        // torn_down is read under the lock teardown holds
        let mut tasks = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.is_torn_down() {
            handle.abort();
        } else {
            tasks.retain(|task| !task.is_finished());
            tasks.push(handle.abort_handle());
        }
        drop(tasks);

        ScopedTask { handle, guard }
    }

    /// Guard for the current generation, for work not spawned here.
    pub fn guard(&self) -> ScopeGuard {
        ScopeGuard {
            state: self.state.clone(),
            generation: self.state.generation.load(Ordering::SeqCst),
        }
    }

    /// Abort running tasks and start a new generation; the scope stays
    /// usable.
    pub fn restart(&self) {
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_all();
    }

    /// Abort every task and refuse new ones.
    pub fn teardown(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.state.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        for task in std::mem::take(&mut *tasks) {
            task.abort();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.torn_down.load(Ordering::SeqCst)
    }

    fn abort_all(&self) {
        let tasks = std::mem::take(
            &mut *self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for task in tasks {
            task.abort();
        }
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.teardown();
    }
}
