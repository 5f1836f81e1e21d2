use lessonpush_core::NotificationEvent;

/// Single-slot buffer for the most recent undelivered notification.
#[derive(Debug, Default)]
pub struct PendingEventSlot {
    event: Option<NotificationEvent>,
}

impl PendingEventSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever is held. Returns the displaced event, if any.
    pub fn offer(&mut self, event: NotificationEvent) -> Option<NotificationEvent> {
        self.event.replace(event)
    }

    /// Consumes the held event when `is_ready` says so. `is_ready` is only
    /// evaluated when the slot is occupied.
    pub fn drain_if_ready(&mut self, is_ready: impl FnOnce() -> bool) -> Option<NotificationEvent> {
        if self.event.is_some() && is_ready() {
            self.event.take()
        } else {
            None
        }
    }

    pub fn inspect(&self) -> Option<&NotificationEvent> {
        self.event.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.event.is_none()
    }

    pub fn clear(&mut self) {
        self.event = None;
    }
}
