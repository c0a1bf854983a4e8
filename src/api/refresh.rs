//! Single-flight coordination for session refresh.
//!
//! Any number of requests can observe an expired access token at once; only
//! the first may perform the refresh call. The rest park on a queue and are
//! resumed with the new token (or rejected with the refresh error) when the
//! in-flight refresh settles.

use std::sync::Mutex;

use tokio::sync::oneshot;
use tracing::debug;

use super::ApiError;
use crate::auth::Session;

/// What a queued caller learns when the refresh settles: the new access
/// token, or the refresh failure.
pub(crate) type RefreshOutcome = Result<String, ApiError>;

/// A caller's role in the current refresh cycle, decided atomically.
pub(crate) enum Ticket {
    /// This caller performs the refresh and settles the queue.
    /// The refresh credentials are captured under the same lock that grants
    /// leadership, so a concurrent teardown cannot tear them apart.
    Leader { refresh_token: String, sid: String },
    /// A refresh is already in flight; wait for its outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
    /// No refresh token or sid on hand - nothing to refresh with.
    NoSession,
}

struct GateState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Refresh state and the pending-caller queue, guarded as one unit.
///
/// A `std::sync::Mutex` is deliberate: no await happens while it is held, so
/// the observe-then-decide step of `join` is atomic even on a multi-threaded
/// runtime.
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                refreshing: false,
                waiters: Vec::new(),
            }),
        }
    }

    /// Decide this caller's role after it saw a 401.
    pub(crate) fn join(&self, session: &Session) -> Ticket {
        let mut state = self.lock();

        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            debug!(queued = state.waiters.len(), "Queued behind in-flight refresh");
            return Ticket::Waiter(rx);
        }

        // Queue must be empty whenever no refresh is in flight.
        debug_assert!(state.waiters.is_empty());

        let Some((refresh_token, sid)) = session.refresh_credentials() else {
            return Ticket::NoSession;
        };

        state.refreshing = true;
        Ticket::Leader { refresh_token, sid }
    }

    /// Leader only: end the cycle and drain the queue in arrival order.
    pub(crate) fn settle(&self, outcome: &RefreshOutcome) {
        let waiters = {
            let mut state = self.lock();
            debug_assert!(state.refreshing);
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        if !waiters.is_empty() {
            debug!(count = waiters.len(), ok = outcome.is_ok(), "Draining refresh queue");
        }

        for waiter in waiters {
            // A waiter that gave up (dropped its receiver) is skipped.
            let _ = waiter.send(clone_outcome(outcome));
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// `ApiError` is not `Clone` (it can wrap a `reqwest::Error`), so each waiter
/// gets a `RefreshFailed` carrying the same message.
fn clone_outcome(outcome: &RefreshOutcome) -> RefreshOutcome {
    match outcome {
        Ok(token) => Ok(token.clone()),
        Err(ApiError::RefreshFailed(message)) => Err(ApiError::RefreshFailed(message.clone())),
        Err(other) => Err(ApiError::RefreshFailed(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credential;

    fn session_with_credential() -> Session {
        let session = Session::new(std::env::temp_dir().join("questify-gate-test"));
        session.install_transient(Credential::new(
            "access".into(),
            "refresh".into(),
            "sid".into(),
        ));
        session
    }

    #[test]
    fn test_first_caller_leads() {
        let gate = RefreshGate::new();
        let session = session_with_credential();

        match gate.join(&session) {
            Ticket::Leader { refresh_token, sid } => {
                assert_eq!(refresh_token, "refresh");
                assert_eq!(sid, "sid");
            }
            _ => panic!("first caller should lead"),
        }
    }

    #[test]
    fn test_later_callers_queue_in_order() {
        let gate = RefreshGate::new();
        let session = session_with_credential();

        let Ticket::Leader { .. } = gate.join(&session) else {
            panic!("first caller should lead");
        };

        let mut first = match gate.join(&session) {
            Ticket::Waiter(rx) => rx,
            _ => panic!("second caller should wait"),
        };
        let mut second = match gate.join(&session) {
            Ticket::Waiter(rx) => rx,
            _ => panic!("third caller should wait"),
        };

        gate.settle(&Ok("fresh".to_string()));

        assert_eq!(first.try_recv().expect("first outcome").expect("ok"), "fresh");
        assert_eq!(second.try_recv().expect("second outcome").expect("ok"), "fresh");
    }

    #[test]
    fn test_settle_failure_rejects_waiters() {
        let gate = RefreshGate::new();
        let session = session_with_credential();

        let Ticket::Leader { .. } = gate.join(&session) else {
            panic!("leader expected");
        };
        let mut waiter = match gate.join(&session) {
            Ticket::Waiter(rx) => rx,
            _ => panic!("waiter expected"),
        };

        gate.settle(&Err(ApiError::RefreshFailed("session timed out".into())));

        match waiter.try_recv().expect("outcome") {
            Err(ApiError::RefreshFailed(msg)) => assert_eq!(msg, "session timed out"),
            other => panic!("expected RefreshFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_no_refresh_credentials_yields_no_session() {
        let gate = RefreshGate::new();
        let session = Session::new(std::env::temp_dir().join("questify-gate-test-empty"));
        session.install_transient(Credential::new("access".into(), String::new(), String::new()));

        assert!(matches!(gate.join(&session), Ticket::NoSession));

        // The gate stays idle: the next caller with full credentials leads.
        let full = session_with_credential();
        assert!(matches!(gate.join(&full), Ticket::Leader { .. }));
    }

    #[test]
    fn test_gate_idle_again_after_settle() {
        let gate = RefreshGate::new();
        let session = session_with_credential();

        let Ticket::Leader { .. } = gate.join(&session) else {
            panic!("leader expected");
        };
        gate.settle(&Ok("fresh".to_string()));

        assert!(matches!(gate.join(&session), Ticket::Leader { .. }));
    }
}
