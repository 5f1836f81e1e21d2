//! Deferred dispatch of notification events.
//!
//! A notification can show up before the session is known or before the
//! navigation container is mounted. The router keeps the most recent such
//! event in a [`PendingEventSlot`] and retries on every readiness transition,
//! so each event is routed at most once and only the latest one survives.

use crate::parser::parse_payload;
use crate::policy::{self, Decision};
use crate::readiness::{AuthSnapshotProvider, NavigationGate, NavigationSink};
use crate::slot::PendingEventSlot;
use lessonpush_core::{AuthSnapshot, NotificationEvent};
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Held,
}

/// What happened to an incoming notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not a payload we can act on, or a repeated cold-start replay.
    Ignored,
    /// Stored until the session and navigation are both ready.
    Held,
    /// Routed immediately.
    Routed(Decision),
}

#[derive(Default)]
pub struct DispatchRouter {
    auth: Option<Box<dyn AuthSnapshotProvider>>,
    gate: NavigationGate,
    slot: PendingEventSlot,
    cold_start_consumed: bool,
}

impl DispatchRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RouterState {
        if self.slot.is_empty() {
            RouterState::Idle
        } else {
            RouterState::Held
        }
    }

    pub fn pending(&self) -> Option<&NotificationEvent> {
        self.slot.inspect()
    }

    /// Installs the session source. Done at bootstrap, possibly after
    /// notifications already arrived, so a drain is attempted right away.
    pub fn install_auth_provider(
        &mut self,
        provider: impl AuthSnapshotProvider + 'static,
    ) -> Option<Decision> {
        self.auth = Some(Box::new(provider));
        debug!("auth provider installed");
        self.try_drain()
    }

    /// Auth-change hook; call after every sign-in or sign-out.
    pub fn auth_changed(&mut self) -> Option<Decision> {
        self.try_drain()
    }

    pub fn attach_navigator(&mut self, sink: impl NavigationSink + 'static) {
        self.gate.attach(Box::new(sink));
    }

    /// Navigation-ready hook, called once the navigation surface is mounted.
    pub fn navigation_ready(&mut self) -> Option<Decision> {
        if self.gate.latch() {
            info!("navigation surface ready");
        }
        self.try_drain()
    }

    /// Replays the notification that launched the app. Only the first call
    /// has any effect.
    pub fn handle_cold_start(&mut self, payload: Option<&Value>) -> Outcome {
        if std::mem::replace(&mut self.cold_start_consumed, true) {
            debug!("cold-start notification already consumed");
            return Outcome::Ignored;
        }
        match payload {
            Some(payload) => self.handle_notification(payload),
            None => Outcome::Ignored,
        }
    }

    /// Live delivery callback.
    pub fn handle_notification(&mut self, payload: &Value) -> Outcome {
        match parse_payload(payload) {
            Some(event) => self.handle_event(event),
            None => {
                debug!("ignoring non-object notification payload");
                Outcome::Ignored
            }
        }
    }

    pub fn handle_event(&mut self, event: NotificationEvent) -> Outcome {
        if let Some(snapshot) = self.ready_snapshot() {
            // A newer event supersedes anything still held.
            if let Some(stale) = self.slot.drain_if_ready(|| true) {
                debug!(kind = %stale.kind, "discarding superseded pending notification");
            }
            return Outcome::Routed(self.dispatch(&event, &snapshot));
        }

        debug!(kind = %event.kind, "holding notification until ready");
        if let Some(displaced) = self.slot.offer(event) {
            debug!(kind = %displaced.kind, "pending notification overwritten");
        }
        Outcome::Held
    }

    /// Drops all state, including the auth provider and navigator.
    pub fn reset(&mut self) {
        self.auth = None;
        self.gate.reset();
        self.slot.clear();
        self.cold_start_consumed = false;
    }

    fn snapshot(&self) -> AuthSnapshot {
        self.auth
            .as_ref()
            .map(|provider| provider.snapshot())
            .unwrap_or_default()
    }

    fn ready_snapshot(&self) -> Option<AuthSnapshot> {
        if !self.gate.is_ready() {
            return None;
        }
        let snapshot = self.snapshot();
        snapshot.is_authenticated().then_some(snapshot)
    }

    fn try_drain(&mut self) -> Option<Decision> {
        let ready = self.ready_snapshot();
        let event = self.slot.drain_if_ready(|| ready.is_some())?;
        let snapshot = ready?;
        Some(self.dispatch(&event, &snapshot))
    }

    fn dispatch(&mut self, event: &NotificationEvent, snapshot: &AuthSnapshot) -> Decision {
        let decision = policy::resolve(event, snapshot);
        match &decision {
            Decision::Navigate(command) => match self.gate.sink_mut() {
                Some(sink) => {
                    info!(kind = %event.kind, screen = %command.screen, "routing notification");
                    sink.navigate(command.clone());
                }
                None => {
                    warn!(kind = %event.kind, screen = %command.screen, "no navigator attached, dropping command");
                }
            },
            Decision::RoleFiltered => {
                debug!(kind = %event.kind, "notification addressed to another role");
            }
            Decision::NotForRole | Decision::NoRoute => {
                debug!(kind = %event.kind, "notification has no route for this session");
            }
        }
        decision
    }
}
