//! Cooperative cancellation for runs.
//!
//! A run observes a [`CancelToken`] between middleware hops and inside
//! long-running handlers. Interactive hosts that invoke the pipeline
//! repeatedly push one scope per nested run onto a [`CancelStack`], so an
//! interrupt cancels only the innermost active run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Cooperative cancellation flag shared by everything in one run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        if !self.flag.swap(true, Ordering::SeqCst) {
            tracing::debug!("cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Stack of cancellation scopes, innermost last.
///
/// Owned by the run orchestrator; nested sessions push on entry and pop on
/// exit. An interrupt requests cancellation on the innermost scope only.
#[derive(Debug, Default)]
pub struct CancelStack {
    scopes: Mutex<Vec<CancelToken>>,
}

impl CancelStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fresh scope and return its token.
    pub fn push(&self) -> CancelToken {
        let token = CancelToken::new();
        self.scopes.lock().push(token.clone());
        token
    }

    /// Pop the innermost scope. Popping an empty stack is a no-op.
    pub fn pop(&self) {
        self.scopes.lock().pop();
    }

    /// Cancel the innermost active scope, if any.
    pub fn request_innermost(&self) {
        if let Some(token) = self.scopes.lock().last() {
            token.cancel();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.lock().len()
    }
}

/// Install a SIGINT handler that cancels the innermost scope of `stack`.
///
/// Spawns a watcher thread that lives for the rest of the process; call at
/// most once, from the host's startup path.
pub fn install_interrupt_handler(stack: Arc<CancelStack>) -> std::io::Result<()> {
    let mut signals = signal_hook::iterator::Signals::new([signal_hook::consts::SIGINT])?;
    std::thread::spawn(move || {
        for _ in signals.forever() {
            tracing::debug!("interrupt received");
            stack.request_innermost();
        }
    });
    Ok(())
}
