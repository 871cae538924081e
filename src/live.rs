//! Interactive front for an [`EditSession`] with coalesced recomputes.
//!
//! Slider drags produce bursts of parameter changes. Each change is committed
//! to the settings immediately, but the recompute is deferred by a short
//! window; a newer change inside the window aborts the pending recompute and
//! schedules its own. Only the last snapshot in a burst is ever processed.
//!
//! Every finished recompute is published on a `watch` channel, which doubles
//! as the "current buffer changed" event for asynchronous consumers. Publishing
//! happens while the session lock is held, so the channel always carries the
//! session's current buffer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use crate::buffer::PixelBuffer;
use crate::config::EditorConfig;
use crate::error::Result;
use crate::session::EditSession;
use crate::settings::Parameter;

type Publisher = Arc<watch::Sender<Arc<PixelBuffer>>>;

pub struct LiveSession {
    session: Arc<Mutex<EditSession>>,
    window: Duration,
    pending: Option<JoinHandle<()>>,
    publisher: Publisher,
}

impl LiveSession {
    /// Wrap a loaded session. Fails with `NotLoaded` for an empty one.
    pub fn new(session: EditSession, window: Duration) -> Result<Self> {
        let current = session.current_buffer()?;
        let (sender, _) = watch::channel(current);
        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            window,
            pending: None,
            publisher: Arc::new(sender),
        })
    }

    pub fn from_config(session: EditSession, config: &EditorConfig) -> Result<Self> {
        Self::new(session, config.coalesce_window())
    }

    /// Receiver that sees every published buffer.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PixelBuffer>> {
        self.publisher.subscribe()
    }

    /// Last published buffer.
    pub fn current_buffer(&self) -> Arc<PixelBuffer> {
        Arc::clone(&self.publisher.borrow())
    }

    /// Run `f` against the underlying session.
    pub fn with_session<R>(&self, f: impl FnOnce(&EditSession) -> R) -> R {
        f(&lock(&self.session))
    }

    /// Commit a value now and recompute once the window passes without a
    /// newer change. Outside a Tokio runtime the recompute runs inline.
    pub fn set_parameter(&mut self, param: Parameter, value: f32) -> Result<f32> {
        let stored = lock(&self.session).stage_parameter(param, value)?;
        self.schedule()?;
        Ok(stored)
    }

    pub fn apply_preset(&mut self, name: &str) -> Result<Arc<PixelBuffer>> {
        self.run_now(|session| session.apply_preset(name))
    }

    pub fn apply_suggestions(&mut self) -> Result<Arc<PixelBuffer>> {
        self.run_now(EditSession::apply_suggestions)
    }

    pub fn reset(&mut self) -> Result<Arc<PixelBuffer>> {
        self.run_now(EditSession::reset)
    }

    /// Replace the image; any pending recompute for the old one is dropped.
    pub fn load(&mut self, buffer: PixelBuffer) -> Result<Arc<PixelBuffer>> {
        self.run_now(|session| {
            session.load(buffer);
            session.current_buffer()
        })
    }

    /// Skip the wait: cancel the pending recompute and run it now.
    pub fn flush(&mut self) -> Result<Arc<PixelBuffer>> {
        self.run_now(EditSession::recompute)
    }

    /// Cancel pending work, run `action` and publish its result under one lock.
    fn run_now(
        &mut self,
        action: impl FnOnce(&mut EditSession) -> Result<Arc<PixelBuffer>>,
    ) -> Result<Arc<PixelBuffer>> {
        self.cancel_pending();
        let mut session = lock(&self.session);
        let buffer = action(&mut *session)?;
        self.publisher.send_replace(Arc::clone(&buffer));
        Ok(buffer)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn schedule(&mut self) -> Result<()> {
        self.cancel_pending();

        let Ok(handle) = Handle::try_current() else {
            recompute_and_publish(&self.session, &self.publisher)?;
            return Ok(());
        };

        let session = Arc::clone(&self.session);
        let publisher = Arc::clone(&self.publisher);
        let window = self.window;
        self.pending = Some(handle.spawn(async move {
            tokio::time::sleep(window).await;
            let result = tokio::task::spawn_blocking(move || recompute_and_publish(&session, &publisher)).await;
            match result {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "Scheduled recompute failed"),
                Err(e) => tracing::warn!(error = %e, "Scheduled recompute task join error"),
            }
        }));
        Ok(())
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                tracing::trace!("Cancelling superseded recompute");
            }
            handle.abort();
        }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn lock(session: &Mutex<EditSession>) -> MutexGuard<'_, EditSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn recompute_and_publish(session: &Mutex<EditSession>, publisher: &Publisher) -> Result<Arc<PixelBuffer>> {
    let mut guard = lock(session);
    let buffer = guard.recompute()?;
    publisher.send_replace(Arc::clone(&buffer));
    Ok(buffer)
}

// ============================================================================
// TESTS
// ============================================================================
