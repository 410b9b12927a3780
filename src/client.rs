use interview_session_types::InterviewId;
use tokio::sync::{broadcast, mpsc};

use crate::connection::{
    CloseOutcome, ConnectionId, ConnectionManager, ConnectionState, Connector, TransportEvent,
    WsConnector,
};
use crate::error::SessionError;
use crate::protocol::{Message, Reaction, SessionProtocol, Status, Transcript};
use crate::speech::{Silent, SpeechInput, SpeechInputEvent, SpeechOutput};

mod config;
pub(crate) mod consts;

pub use config::{Config, ConfigBuilder, ConfigError};
use consts::{MISSING_ID_STATUS, RECONNECT_EXHAUSTED_STATUS};

pub type EventTx = mpsc::UnboundedSender<SessionEvent>;
pub type UpdateRx = broadcast::Receiver<SessionUpdate>;

/// Everything the session reacts to. Handled strictly one at a time.
#[derive(Debug)]
pub enum SessionEvent {
    Transport {
        id: ConnectionId,
        event: TransportEvent,
    },
    ReconnectDue(u64),
    Command(SessionCommand),
    Speech(SpeechInputEvent),
}

/// User intent, posted through a `SessionHandle`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    SubmitAnswer(String),
    SetDraft(String),
    SubmitDraft,
    EndInterview,
    ToggleListening,
    /// Manual reconnect after automatic retries gave up.
    Retry,
    Shutdown,
}

/// What the UI needs to redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    MessageAppended(Message),
    Feedback(String),
    Status(Status),
    Connection(ConnectionState),
    Listening(bool),
    InterviewEnded,
    /// The server rejected the session; send the user back to the entry page.
    ReturnToEntry(Option<InterviewId>),
}

#[derive(Clone)]
pub struct SessionHandle {
    tx: EventTx,
}

impl SessionHandle {
    fn command(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.tx
            .send(SessionEvent::Command(command))
            .map_err(|_| SessionError::SessionClosed)
    }

    pub fn submit_answer(&self, text: &str) -> Result<(), SessionError> {
        self.command(SessionCommand::SubmitAnswer(text.to_string()))
    }

    pub fn set_draft(&self, draft: &str) -> Result<(), SessionError> {
        self.command(SessionCommand::SetDraft(draft.to_string()))
    }

    pub fn submit_draft(&self) -> Result<(), SessionError> {
        self.command(SessionCommand::SubmitDraft)
    }

    pub fn end_interview(&self) -> Result<(), SessionError> {
        self.command(SessionCommand::EndInterview)
    }

    pub fn toggle_listening(&self) -> Result<(), SessionError> {
        self.command(SessionCommand::ToggleListening)
    }

    pub fn retry(&self) -> Result<(), SessionError> {
        self.command(SessionCommand::Retry)
    }

    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.command(SessionCommand::Shutdown)
    }
}

pub struct SessionBuilder {
    config: Config,
    interview_id: Option<InterviewId>,
    connector: Option<Box<dyn Connector>>,
    speaker: Box<dyn SpeechOutput>,
    listener: Option<Box<dyn SpeechInput>>,
}

impl SessionBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            interview_id: None,
            connector: None,
            speaker: Box::new(Silent),
            listener: None,
        }
    }

    pub fn with_interview_id(mut self, interview_id: Option<InterviewId>) -> Self {
        self.interview_id = interview_id;
        self
    }

    pub fn with_connector(mut self, connector: Box<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn with_speech_output(mut self, speaker: Box<dyn SpeechOutput>) -> Self {
        self.speaker = speaker;
        self
    }

    pub fn with_speech_input(mut self, listener: Box<dyn SpeechInput>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn build(self) -> InterviewSession {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (updates, _) = broadcast::channel(self.config.capacity());
        let connector: Box<dyn Connector> = match self.connector {
            Some(connector) => connector,
            None => Box::new(WsConnector::new(self.config.capacity())),
        };
        let connection = ConnectionManager::new(
            self.config.ws_url(),
            self.config.backoff(),
            connector,
            events_tx.clone(),
        );
        let protocol = SessionProtocol::new(self.interview_id, self.speaker, self.listener);

        InterviewSession {
            connection,
            protocol,
            events_tx,
            events_rx,
            updates,
            finished: false,
            last_state: ConnectionState::Disconnected,
            last_status: Status::Clear,
            last_listening: false,
            ended_published: false,
        }
    }
}

/// One interview conversation: the socket, the protocol and the progress,
/// driven by a single event queue.
pub struct InterviewSession {
    connection: ConnectionManager,
    protocol: SessionProtocol,
    events_tx: EventTx,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    updates: broadcast::Sender<SessionUpdate>,
    finished: bool,
    last_state: ConnectionState,
    last_status: Status,
    last_listening: bool,
    ended_published: bool,
}

impl InterviewSession {
    pub fn builder(config: Config) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            tx: self.events_tx.clone(),
        }
    }

    pub fn updates(&self) -> UpdateRx {
        self.updates.subscribe()
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn protocol(&self) -> &SessionProtocol {
        &self.protocol
    }

    pub fn transcript(&self) -> &Transcript {
        self.protocol.transcript()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wire up speech capture and open the first connection.
    pub fn start(&mut self) -> Result<(), SessionError> {
        let tx = self.events_tx.clone();
        self.protocol.attach_speech_sink(Box::new(move |event| {
            let _ = tx.send(SessionEvent::Speech(event));
        }));

        let interview_id = self.protocol.interview_id().cloned();
        let result = self.connection.connect(interview_id.as_ref());
        if let Err(SessionError::MissingInterviewId) = result {
            tracing::error!("cannot start a session without an interview id");
            self.protocol
                .set_status(Status::Error(MISSING_ID_STATUS.to_string()));
        }
        self.publish_changes();
        result
    }

    /// Run until shutdown or a server rejection.
    pub async fn run(mut self) -> Result<(), SessionError> {
        self.start()?;
        while self.step().await {}
        tracing::info!("interview session finished");
        Ok(())
    }

    /// Wait for and handle the next event. Returns `false` once finished.
    pub async fn step(&mut self) -> bool {
        if self.finished {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                !self.finished
            }
            None => false,
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        if self.finished {
            tracing::debug!("session finished, dropping {:?}", event);
            return;
        }
        match event {
            SessionEvent::Transport { id, event } => self.on_transport(id, event),
            SessionEvent::ReconnectDue(generation) => {
                if let Err(e) = self.connection.on_reconnect_due(generation) {
                    tracing::error!("reconnect failed: {}", e);
                }
            }
            SessionEvent::Command(command) => self.on_command(command),
            SessionEvent::Speech(event) => self.protocol.on_speech_event(event),
        }
        self.publish_changes();
    }

    fn on_transport(&mut self, id: ConnectionId, event: TransportEvent) {
        match event {
            TransportEvent::Opened => {
                if self.connection.on_open(id) {
                    self.protocol.on_connected();
                }
            }
            TransportEvent::Frame(text) => {
                if self.connection.current_connection() != Some(id) {
                    tracing::debug!("dropping frame from stale connection #{}", id.get());
                    return;
                }
                let reaction = self.protocol.handle_frame(&text, &mut self.connection);
                self.on_reaction(reaction);
            }
            TransportEvent::Error(error) => {
                if self.connection.on_error(id, &error) {
                    self.protocol.on_transport_error();
                }
            }
            TransportEvent::Closed(reason) => {
                tracing::info!("connection #{} closed: {:?}", id.get(), reason);
                let active = self.protocol.progress().is_active();
                if let CloseOutcome::Exhausted { attempts } = self.connection.on_close(id, active) {
                    tracing::error!("{}", SessionError::ReconnectExhausted(attempts));
                    self.protocol
                        .set_status(Status::Error(RECONNECT_EXHAUSTED_STATUS.to_string()));
                }
            }
        }
    }

    fn on_reaction(&mut self, reaction: Reaction) {
        match reaction {
            Reaction::Appended(message) => self.publish(SessionUpdate::MessageAppended(message)),
            Reaction::Feedback(feedback) => self.publish(SessionUpdate::Feedback(feedback)),
            Reaction::Rejected(reason) => {
                let error = SessionError::ProtocolError(reason.unwrap_or_default());
                tracing::error!("{}", error);
                self.publish(SessionUpdate::ReturnToEntry(
                    self.protocol.interview_id().cloned(),
                ));
                self.teardown();
            }
            Reaction::EndRequested | Reaction::Ignored(_) | Reaction::Malformed(_) => {}
        }
    }

    fn on_command(&mut self, command: SessionCommand) {
        let result = match command {
            SessionCommand::SubmitAnswer(text) => self
                .protocol
                .submit_answer(&text, &mut self.connection)
                .map(|message| self.publish(SessionUpdate::MessageAppended(message))),
            SessionCommand::SubmitDraft => self
                .protocol
                .submit_draft(&mut self.connection)
                .map(|message| self.publish(SessionUpdate::MessageAppended(message))),
            SessionCommand::SetDraft(draft) => {
                self.protocol.set_draft(&draft);
                Ok(())
            }
            SessionCommand::EndInterview => {
                self.protocol.request_end_interview(&mut self.connection)
            }
            SessionCommand::ToggleListening => self.protocol.toggle_listening().map(|_| ()),
            SessionCommand::Retry => {
                let interview_id = self.protocol.interview_id().cloned();
                self.connection.connect(interview_id.as_ref())
            }
            SessionCommand::Shutdown => {
                self.teardown();
                Ok(())
            }
        };
        if let Err(e) = result {
            tracing::warn!("command rejected: {}", e);
        }
    }

    fn publish(&self, update: SessionUpdate) {
        // No subscribers is fine.
        let _ = self.updates.send(update);
    }

    fn publish_changes(&mut self) {
        let state = self.connection.state();
        if state != self.last_state {
            self.last_state = state;
            self.publish(SessionUpdate::Connection(state));
        }
        if self.protocol.status() != &self.last_status {
            self.last_status = self.protocol.status().clone();
            self.publish(SessionUpdate::Status(self.last_status.clone()));
        }
        if self.protocol.is_listening() != self.last_listening {
            self.last_listening = self.protocol.is_listening();
            self.publish(SessionUpdate::Listening(self.last_listening));
        }
        if self.protocol.progress().is_ended() && !self.ended_published {
            self.ended_published = true;
            self.publish(SessionUpdate::InterviewEnded);
        }
    }

    /// Release the socket, the reconnect timer and the speech engines.
    pub fn teardown(&mut self) {
        if self.finished {
            return;
        }
        tracing::info!("tearing down interview session");
        self.finished = true;
        self.connection.disconnect();
        self.protocol.teardown();
    }
}

impl Drop for InterviewSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
