//! Owns the one logical session socket and the reconnection policy.

use std::time::Duration;

use interview_session_types::events::StartInterviewEvent;
use interview_session_types::{InterviewId, ProtocolMessage};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::{EventTx, SessionEvent};
use crate::error::SessionError;
use crate::protocol::Outbox;

mod backoff;
mod state;
mod transport;

pub use backoff::Backoff;
pub use state::ConnectionState;
pub use transport::{ConnectionId, Connector, Link, TransportEvent, WsConnector};

#[cfg(test)]
pub(crate) use transport::testing;

/// A scheduled reconnection that has not fired yet.
#[derive(Debug)]
pub struct PendingReconnect {
    generation: u64,
    delay: Duration,
    timer: JoinHandle<()>,
}

impl PendingReconnect {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// What a close event led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Event came from a socket that is no longer current.
    Stale,
    /// Expected close (teardown or interview over); nothing scheduled.
    Closed,
    Reconnecting { attempt: u32, delay: Duration },
    Exhausted { attempts: u32 },
}

pub struct ConnectionManager {
    url: String,
    backoff: Backoff,
    connector: Box<dyn Connector>,
    events: EventTx,
    interview_id: Option<InterviewId>,
    link: Option<(ConnectionId, Box<dyn Link>)>,
    next_id: u64,
    attempts: u32,
    reconnect: Option<PendingReconnect>,
    timer_generation: u64,
    intentional_close: bool,
    state_tx: watch::Sender<ConnectionState>,
}

impl ConnectionManager {
    pub fn new(
        url: &str,
        backoff: Backoff,
        connector: Box<dyn Connector>,
        events: EventTx,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            url: url.to_string(),
            backoff,
            connector,
            events,
            interview_id: None,
            link: None,
            next_id: 0,
            attempts: 0,
            reconnect: None,
            timer_generation: 0,
            intentional_close: false,
            state_tx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Observe connection state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn pending_reconnect(&self) -> Option<&PendingReconnect> {
        self.reconnect.as_ref()
    }

    pub fn current_connection(&self) -> Option<ConnectionId> {
        self.link.as_ref().map(|(id, _)| *id)
    }

    fn is_current(&self, id: ConnectionId) -> bool {
        self.current_connection() == Some(id)
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            tracing::debug!("connection state {:?} -> {:?}", current, state);
            *current = state;
            true
        });
    }

    /// Open the session socket.
    ///
    /// Fails without touching the network when no interview id is given. A
    /// no-op while a socket is already open or opening. From `Exhausted` this
    /// is the manual retry and starts counting attempts afresh.
    pub fn connect(&mut self, interview_id: Option<&InterviewId>) -> Result<(), SessionError> {
        let interview_id = interview_id.ok_or(SessionError::MissingInterviewId)?;

        if self.link.is_some() && self.state().is_live() {
            tracing::debug!("connection attempt already in flight, ignoring connect");
            return Ok(());
        }
        if self.state() == ConnectionState::Exhausted {
            self.attempts = 0;
        }

        self.cancel_reconnect();
        self.intentional_close = false;
        self.interview_id = Some(interview_id.clone());

        self.next_id += 1;
        let id = ConnectionId::new(self.next_id);
        tracing::info!("opening session connection #{} to {}", id.get(), self.url);
        let link = self.connector.open(id, &self.url, self.events.clone());
        // Replacing the link drops (and so releases) any stale socket.
        self.link = Some((id, link));
        self.set_state(ConnectionState::Connecting);
        Ok(())
    }

    /// Handles a successful open. Returns `false` for stale sockets.
    pub fn on_open(&mut self, id: ConnectionId) -> bool {
        if !self.is_current(id) {
            tracing::debug!("ignoring open from stale connection #{}", id.get());
            return false;
        }
        self.attempts = 0;
        self.set_state(ConnectionState::Connected);

        if let Some(interview_id) = self.interview_id.clone() {
            let start = ProtocolMessage::StartInterview(StartInterviewEvent::new(&interview_id));
            if let Err(e) = self.send(&start) {
                tracing::error!("failed to send start_interview: {}", e);
            }
        }
        true
    }

    /// Transport-level error. Only reported; the close that follows decides
    /// whether to reconnect. Returns `false` for stale sockets.
    pub fn on_error(&mut self, id: ConnectionId, error: &str) -> bool {
        if !self.is_current(id) {
            return false;
        }
        tracing::error!("connection #{} error: {}", id.get(), error);
        true
    }

    pub fn on_close(&mut self, id: ConnectionId, interview_active: bool) -> CloseOutcome {
        if !self.is_current(id) {
            tracing::debug!("ignoring close from stale connection #{}", id.get());
            return CloseOutcome::Stale;
        }
        self.link = None;

        if self.intentional_close || !interview_active {
            self.set_state(ConnectionState::Disconnected);
            return CloseOutcome::Closed;
        }

        if self.backoff.exhausted(self.attempts) {
            tracing::error!("giving up after {} reconnection attempts", self.attempts);
            self.set_state(ConnectionState::Exhausted);
            return CloseOutcome::Exhausted {
                attempts: self.attempts,
            };
        }

        let delay = self.backoff.delay(self.attempts);
        self.attempts += 1;
        tracing::warn!(
            "connection lost, reconnecting in {:?} ({}/{})",
            delay,
            self.attempts,
            self.backoff.max_attempts()
        );
        self.schedule_reconnect(delay);
        self.set_state(ConnectionState::Reconnecting);
        CloseOutcome::Reconnecting {
            attempt: self.attempts,
            delay,
        }
    }

    fn schedule_reconnect(&mut self, delay: Duration) {
        self.cancel_reconnect();
        self.timer_generation += 1;
        let generation = self.timer_generation;
        let events = self.events.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(SessionEvent::ReconnectDue(generation));
        });
        self.reconnect = Some(PendingReconnect {
            generation,
            delay,
            timer,
        });
    }

    fn cancel_reconnect(&mut self) {
        if let Some(pending) = self.reconnect.take() {
            pending.timer.abort();
        }
    }

    /// The backoff timer fired. Stale or cancelled timers are ignored.
    pub fn on_reconnect_due(&mut self, generation: u64) -> Result<(), SessionError> {
        match self.reconnect.as_ref() {
            Some(pending) if pending.generation == generation => {}
            _ => {
                tracing::debug!("ignoring stale reconnect timer {}", generation);
                return Ok(());
            }
        }
        self.reconnect = None;
        if self.intentional_close {
            return Ok(());
        }
        tracing::info!(
            "attempting to reconnect ({}/{})",
            self.attempts,
            self.backoff.max_attempts()
        );
        let interview_id = self.interview_id.clone();
        self.connect(interview_id.as_ref())
    }

    /// Deterministic teardown: cancels the pending timer, closes the socket and
    /// makes sure nothing that arrives afterwards triggers a reconnection.
    pub fn disconnect(&mut self) {
        self.intentional_close = true;
        self.cancel_reconnect();
        if let Some((id, mut link)) = self.link.take() {
            tracing::info!("closing session connection #{}", id.get());
            link.close();
        }
        self.set_state(ConnectionState::Disconnected);
    }

    /// Send immediately or fail. Nothing is ever queued for later.
    pub fn send(&mut self, message: &ProtocolMessage) -> Result<(), SessionError> {
        if !self.state().is_connected() {
            return Err(SessionError::NotConnected);
        }
        let (_, link) = self.link.as_mut().ok_or(SessionError::NotConnected)?;
        let frame = message.to_json()?;
        tracing::debug!("sending {}", message.tag());
        link.send(frame)
    }
}

impl Outbox for ConnectionManager {
    fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    fn send(&mut self, message: &ProtocolMessage) -> Result<(), SessionError> {
        ConnectionManager::send(self, message)
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.cancel_reconnect();
    }
}
