//! Shared protocol state between the caller and the dispatch loop

use tokio::sync::watch;

/// Snapshot of the protocol flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolFlags {
    /// The dispatch loop is (or is about to be) serving the connection
    pub running: bool,
    /// The host acknowledged the REGISTER message
    pub registered: bool,
}

/// `running` / `registered` flags with change notification.
///
/// Writers are the lifecycle controller and the dispatch loop; readers can
/// wait for a condition instead of polling.
#[derive(Debug)]
pub struct ProtocolState {
    flags: watch::Sender<ProtocolFlags>,
}

impl Default for ProtocolState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolState {
    pub fn new() -> Self {
        let (flags, _) = watch::channel(ProtocolFlags::default());
        Self { flags }
    }

    /// Current flags
    pub fn snapshot(&self) -> ProtocolFlags {
        *self.flags.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.snapshot().running
    }

    pub fn is_registered(&self) -> bool {
        self.snapshot().registered
    }

    /// Enter a new session: running, not yet acknowledged
    pub fn mark_running(&self) {
        self.update(|flags| {
            flags.running = true;
            flags.registered = false;
        });
    }

    /// Record the host's REGISTER_ACK
    pub fn mark_registered(&self) {
        self.update(|flags| flags.registered = true);
    }

    /// Leave the session; both flags drop
    pub fn mark_stopped(&self) {
        self.update(|flags| {
            flags.running = false;
            flags.registered = false;
        });
    }

    /// Resolve once `running` is false
    pub async fn wait_until_stopped(&self) {
        let mut rx = self.flags.subscribe();
        // The sender lives in `self`, so the wait can only end on the condition
        let _ = rx.wait_for(|flags| !flags.running).await;
    }

    /// Resolve once the host acknowledged or the session ended
    pub async fn wait_for_registration(&self) -> ProtocolFlags {
        let mut rx = self.flags.subscribe();
        let _ = rx
            .wait_for(|flags| flags.registered || !flags.running)
            .await;
        self.snapshot()
    }

    fn update(&self, change: impl FnOnce(&mut ProtocolFlags)) {
        self.flags.send_if_modified(|flags| {
            let before = *flags;
            change(flags);
            *flags != before
        });
    }
}
