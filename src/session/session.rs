use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::dispatch::{RecognitionEvent, ResultDispatcher};
use super::state::{SessionState, StateCell};
use super::stats::SessionStats;
use crate::audio::{AudioInput, CaptureDevice, STREAM_CHUNK_SIZE};
use crate::error::SessionError;
use crate::service::{RecognitionService, ServiceConnection, ServiceEvent};

/// Receiver half of the caller's event channel.
///
/// This is the delivery port to the caller's execution context: the
/// controller pushes normalized events here from its own tasks, the caller
/// drains them wherever it lives (UI loop, actor, test body). The channel
/// is unbounded so internal tasks never park on delivery, which is what
/// makes `stop()` safe to call from inside an event handler.
pub type EventReceiver = UnboundedReceiver<RecognitionEvent>;

/// A recognition session that owns one conversation with the remote
/// recognition service and mediates all audio-in / event-out traffic for it.
pub struct RecognitionSession {
    /// Session configuration, immutable after construction
    config: SessionConfig,

    /// Client for the remote recognition service
    service: Arc<dyn RecognitionService>,

    /// Lifecycle state, shared with background tasks
    state: Arc<StateCell>,

    /// When the session was created
    started_at: chrono::DateTime<chrono::Utc>,

    /// Sender half of the caller's event channel
    events_tx: UnboundedSender<RecognitionEvent>,

    /// The open conversation, present between start and teardown
    connection: Arc<Mutex<Option<Box<dyn ServiceConnection>>>>,

    /// Capture device for microphone sessions, held so stop() can end it
    capture: Arc<Mutex<Option<Box<dyn CaptureDevice>>>>,

    /// Handle for the raw-event pump task
    pump_task: Arc<Mutex<Option<JoinHandle<()>>>>,

    /// Handle for the capture forwarding task (microphone sessions only)
    forward_task: Arc<Mutex<Option<JoinHandle<()>>>>,

    /// Audio chunks forwarded to the service
    chunks_sent: Arc<AtomicUsize>,

    /// Normalized events delivered to the caller
    events_delivered: Arc<AtomicUsize>,
}

impl RecognitionSession {
    pub(crate) fn new(
        config: SessionConfig,
        service: Arc<dyn RecognitionService>,
        events_tx: UnboundedSender<RecognitionEvent>,
    ) -> Self {
        Self {
            config,
            service,
            state: Arc::new(StateCell::new(SessionState::Idle)),
            started_at: Utc::now(),
            events_tx,
            connection: Arc::new(Mutex::new(None)),
            capture: Arc::new(Mutex::new(None)),
            pump_task: Arc::new(Mutex::new(None)),
            forward_task: Arc::new(Mutex::new(None)),
            chunks_sent: Arc::new(AtomicUsize::new(0)),
            events_delivered: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Start recognition on the given audio input.
    ///
    /// For a `Stream` input this sends the whole byte stream before
    /// returning: a sequential loop over a fixed-size buffer, one
    /// `send_audio` per chunk, then exactly one `end_audio` — sent even
    /// when a read fails partway, so the service always learns the stream
    /// is finished and can flush final results. The session then stays
    /// active until the caller sees a terminal event and calls [`stop`].
    ///
    /// For a `Microphone` input this returns as soon as capture is running;
    /// a background task forwards chunks until capture ends.
    ///
    /// Fails with a state error unless the session is `Idle`; a running
    /// session is left untouched.
    ///
    /// [`stop`]: RecognitionSession::stop
    pub async fn start(&self, input: AudioInput) -> Result<(), SessionError> {
        let observed = self.state.get();
        if observed != SessionState::Idle {
            warn!(
                "start refused: session {} is {:?}",
                self.config.session_id, observed
            );
            return Err(SessionError::state(observed));
        }

        info!(
            "Starting recognition session {} ({:?}, {})",
            self.config.session_id,
            self.config.mode,
            if input.is_live() { "microphone" } else { "stream" }
        );

        // Connect first: the raw event channel comes back with the
        // connection, so delivery is registered before the first byte.
        let (connection, raw_rx) = self.service.connect(&self.config).await?;

        if let Err(observed) = self.state.transition(SessionState::Idle, SessionState::Active) {
            // Lost a start race; leave the winner alone.
            let mut connection = connection;
            if let Err(e) = connection.close().await {
                warn!("failed to close redundant connection: {}", e);
            }
            return Err(SessionError::state(observed));
        }

        {
            let mut guard = self.connection.lock().await;
            *guard = Some(connection);
        }

        self.spawn_event_pump(raw_rx).await;

        match input {
            AudioInput::Stream(mut reader) => {
                let send_result = self.send_stream(reader.as_mut()).await;
                let end_result = self.end_audio().await;
                send_result?;
                end_result
            }
            AudioInput::Microphone(device) => self.start_capture(device).await,
        }
    }

    /// Stop recognition and release the conversation.
    ///
    /// Idempotent: calling on an already-closed session is a no-op. After
    /// this returns no further audio is sent and no further events reach
    /// the caller. Safe to call from the caller's event-handling context;
    /// internal tasks never block on event delivery, so joining them here
    /// cannot deadlock.
    pub async fn stop(&self) -> Result<(), SessionError> {
        match self.state.get() {
            SessionState::Closed => {
                debug!("stop: session {} already closed", self.config.session_id);
                return Ok(());
            }
            SessionState::Idle => {
                self.state.set(SessionState::Closed);
                return Ok(());
            }
            _ => {}
        }

        info!("Stopping recognition session {}", self.config.session_id);
        self.state.set(SessionState::Ending);

        // End capture first so the forwarding task sees its channel close,
        // sends end_audio, and runs out.
        if let Some(mut device) = self.capture.lock().await.take() {
            if let Err(e) = device.stop().await {
                warn!("failed to stop capture device: {}", e);
            }
            self.deliver(RecognitionEvent::MicStatus { recording: false });
        }

        if let Some(task) = self.forward_task.lock().await.take() {
            if let Err(e) = task.await {
                error!("capture forwarding task panicked: {}", e);
            }
        }

        // Closing the conversation ends the raw event stream, which lets
        // the pump drain out and exit.
        if let Some(mut connection) = self.connection.lock().await.take() {
            if let Err(e) = connection.close().await {
                warn!("failed to close service connection: {}", e);
            }
        }

        if let Some(task) = self.pump_task.lock().await.take() {
            if let Err(e) = task.await {
                error!("event pump task panicked: {}", e);
            }
        }

        self.state.set(SessionState::Closed);
        info!("Recognition session {} closed", self.config.session_id);

        Ok(())
    }

    /// Release everything without waiting for orderly shutdown.
    ///
    /// For abnormal termination paths; background tasks are aborted rather
    /// than joined. Safe to call multiple times and after [`stop`].
    ///
    /// [`stop`]: RecognitionSession::stop
    pub async fn dispose(&self) {
        if let Some(task) = self.forward_task.lock().await.take() {
            task.abort();
        }
        if let Some(task) = self.pump_task.lock().await.take() {
            task.abort();
        }

        if let Some(mut device) = self.capture.lock().await.take() {
            if let Err(e) = device.stop().await {
                warn!("failed to stop capture device: {}", e);
            }
        }

        if let Some(mut connection) = self.connection.lock().await.take() {
            if let Err(e) = connection.close().await {
                warn!("failed to close service connection: {}", e);
            }
        }

        self.state.set(SessionState::Closed);
        debug!("session {} disposed", self.config.session_id);
    }

    /// Get a snapshot of the session's progress
    pub fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            state: self.state.get(),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            chunks_sent: self.chunks_sent.load(Ordering::SeqCst),
            events_delivered: self.events_delivered.load(Ordering::SeqCst),
        }
    }

    /// Spawn the task that turns raw service events into normalized events
    /// on the caller's channel.
    async fn spawn_event_pump(&self, mut raw_rx: tokio::sync::mpsc::Receiver<ServiceEvent>) {
        let state = Arc::clone(&self.state);
        let events_tx = self.events_tx.clone();
        let events_delivered = Arc::clone(&self.events_delivered);
        let mode = self.config.mode;

        let task = tokio::spawn(async move {
            debug!("event pump started");

            while let Some(raw) = raw_rx.recv().await {
                if state.get() == SessionState::Closed {
                    break;
                }

                let event = ResultDispatcher::normalize(raw, mode);
                events_delivered.fetch_add(1, Ordering::SeqCst);
                if events_tx.send(event).is_err() {
                    debug!("caller dropped the event receiver");
                    break;
                }
            }

            debug!("event pump stopped");
        });

        let mut guard = self.pump_task.lock().await;
        *guard = Some(task);
    }

    /// Send a finite byte stream to the service, one fixed-size chunk at a
    /// time. Sequential by design: only one send is ever in flight, and the
    /// loop is bounded by the stream length.
    async fn send_stream(&self, reader: &mut (dyn Read + Send)) -> Result<(), SessionError> {
        let mut buffer = [0u8; STREAM_CHUNK_SIZE];

        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }

            let mut guard = self.connection.lock().await;
            let Some(connection) = guard.as_mut() else {
                // Torn down underneath us; the stream ends here.
                break;
            };
            connection.send_audio(&buffer[..read]).await?;
            self.chunks_sent.fetch_add(1, Ordering::SeqCst);
        }

        Ok(())
    }

    /// Signal end-of-audio on the open conversation, if it is still open.
    async fn end_audio(&self) -> Result<(), SessionError> {
        let mut guard = self.connection.lock().await;
        if let Some(connection) = guard.as_mut() {
            connection.end_audio().await?;
        }
        Ok(())
    }

    /// Begin live capture and forward chunks until the device stops.
    async fn start_capture(&self, mut device: Box<dyn CaptureDevice>) -> Result<(), SessionError> {
        info!("Starting capture on {}", device.name());

        let mut chunk_rx = match device.start().await {
            Ok(rx) => rx,
            Err(e) => {
                // The conversation is useless without audio; tear it down.
                error!("failed to start capture device: {}", e);
                self.dispose().await;
                return Err(e);
            }
        };

        self.deliver(RecognitionEvent::MicStatus { recording: true });

        {
            let mut guard = self.capture.lock().await;
            *guard = Some(device);
        }

        let state = Arc::clone(&self.state);
        let connection = Arc::clone(&self.connection);
        let chunks_sent = Arc::clone(&self.chunks_sent);

        let task = tokio::spawn(async move {
            debug!("capture forwarding started");

            while let Some(chunk) = chunk_rx.recv().await {
                if state.get() != SessionState::Active {
                    break;
                }

                let mut guard = connection.lock().await;
                let Some(connection) = guard.as_mut() else {
                    break;
                };
                if let Err(e) = connection.send_audio(&chunk.bytes).await {
                    error!("failed to forward audio chunk: {}", e);
                    break;
                }
                chunks_sent.fetch_add(1, Ordering::SeqCst);
            }

            // Capture ended; the service still needs to hear that the
            // stream is finished so it can flush final results.
            let mut guard = connection.lock().await;
            if let Some(connection) = guard.as_mut() {
                if let Err(e) = connection.end_audio().await {
                    error!("failed to signal end of audio: {}", e);
                }
            }

            debug!("capture forwarding stopped");
        });

        let mut guard = self.forward_task.lock().await;
        *guard = Some(task);

        Ok(())
    }

    fn deliver(&self, event: RecognitionEvent) {
        self.events_delivered.fetch_add(1, Ordering::SeqCst);
        if self.events_tx.send(event).is_err() {
            debug!("caller dropped the event receiver");
        }
    }
}

impl Drop for RecognitionSession {
    fn drop(&mut self) {
        if matches!(self.state.get(), SessionState::Active | SessionState::Ending) {
            warn!(
                "session {} dropped without stop(); aborting background tasks",
                self.config.session_id
            );
        }

        // Last resort only: the connection and device release on drop, and
        // aborting a finished task is a no-op.
        if let Ok(mut guard) = self.forward_task.try_lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
        if let Ok(mut guard) = self.pump_task.try_lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
    }
}
