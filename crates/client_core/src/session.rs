use tokio::sync::watch;

/// Process-wide session lifecycle. `Expired` is distinct from `LoggedOut`
/// so a front end can tell a silent redirect from a normal sign-out; a
/// successful re-login moves back to `Authenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    LoggedOut,
    Authenticated,
    Expired,
}

/// Session context shared by every workflow. Observers subscribe through a
/// watch channel and react to phase changes (typically by routing to the
/// login screen).
#[derive(Debug)]
pub struct SessionContext {
    tx: watch::Sender<SessionPhase>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionPhase::LoggedOut);
        Self { tx }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.tx.subscribe()
    }

    /// Moves to `phase`; returns false when the session was already there,
    /// so a burst of expiry signals acts only once.
    pub(crate) fn transition(&self, phase: SessionPhase) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == phase {
                false
            } else {
                *current = phase;
                true
            }
        })
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_transitions_act_once() {
        let session = SessionContext::new();
        assert_eq!(session.phase(), SessionPhase::LoggedOut);
        assert!(session.transition(SessionPhase::Authenticated));
        assert!(session.transition(SessionPhase::Expired));
        assert!(!session.transition(SessionPhase::Expired));
        assert_eq!(session.phase(), SessionPhase::Expired);
    }

    #[test]
    fn subscribers_observe_phase_changes() {
        let session = SessionContext::new();
        let rx = session.subscribe();
        session.transition(SessionPhase::Authenticated);
        assert_eq!(*rx.borrow(), SessionPhase::Authenticated);
    }
}
