//! The two externally driven readiness signals: session auth and the
//! navigation surface.

use lessonpush_core::{AuthSnapshot, NavigationCommand};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// Pull-based source of the current session.
pub trait AuthSnapshotProvider: Send + Sync {
    fn snapshot(&self) -> AuthSnapshot;
}

impl<F> AuthSnapshotProvider for F
where
    F: Fn() -> AuthSnapshot + Send + Sync,
{
    fn snapshot(&self) -> AuthSnapshot {
        self()
    }
}

/// Session state shared with the auth module, which writes it on sign-in/out.
#[derive(Clone, Default)]
pub struct SessionAuth {
    inner: Arc<RwLock<AuthSnapshot>>,
}

impl SessionAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, snapshot: AuthSnapshot) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }

    pub fn sign_in(&self, user_id: impl Into<String>, user_type: impl Into<String>) {
        self.set(AuthSnapshot::signed_in(user_id, user_type));
    }

    pub fn sign_out(&self) {
        self.set(AuthSnapshot::signed_out());
    }
}

impl AuthSnapshotProvider for SessionAuth {
    fn snapshot(&self) -> AuthSnapshot {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Receiver of navigation commands, i.e. the mounted navigation container.
pub trait NavigationSink: Send {
    fn navigate(&mut self, command: NavigationCommand);
}

impl NavigationSink for mpsc::UnboundedSender<NavigationCommand> {
    fn navigate(&mut self, command: NavigationCommand) {
        // 接收端已关闭时直接丢弃
        let _ = self.send(command);
    }
}

/// One-way latch flipped once the navigation surface can take commands.
#[derive(Default)]
pub struct NavigationGate {
    ready: bool,
    sink: Option<Box<dyn NavigationSink>>,
}

impl NavigationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, sink: Box<dyn NavigationSink>) {
        self.sink = Some(sink);
    }

    /// Returns `true` when this call flipped the latch.
    pub fn latch(&mut self) -> bool {
        !std::mem::replace(&mut self.ready, true)
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub(crate) fn sink_mut(&mut self) -> Option<&mut (dyn NavigationSink + 'static)> {
        self.sink.as_deref_mut()
    }

    pub fn reset(&mut self) {
        self.ready = false;
        self.sink = None;
    }
}
