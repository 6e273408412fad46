//! Envelope shared between an editing thread and a reading thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bp_engine::Envelope;

/// One envelope behind a mutex. Seeking and reading happen in a single
/// critical section, so a reader never sees another thread's cursor move
/// between the two.
#[derive(Clone, Debug, Default)]
pub struct SharedEnvelope {
    inner: Arc<Mutex<Envelope>>,
}

impl SharedEnvelope {
    pub fn new(envelope: Envelope) -> Self {
        Self { inner: Arc::new(Mutex::new(envelope)) }
    }

    fn lock(&self) -> MutexGuard<'_, Envelope> {
        // An envelope stays structurally valid even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seek and read under one lock.
    pub fn value_at(&self, time: f64) -> f64 {
        self.lock().value_at(time)
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut Envelope) -> R) -> R {
        f(&mut self.lock())
    }

    /// Deep copy for lock-free reading.
    pub fn snapshot(&self) -> Envelope {
        self.lock().clone()
    }

    /// Replace the envelope wholesale.
    pub fn replace(&self, envelope: Envelope) -> Envelope {
        std::mem::replace(&mut *self.lock(), envelope)
    }
}
