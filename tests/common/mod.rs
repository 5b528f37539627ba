// Shared test doubles: a scripted recognition service, a scripted capture
// device, and a byte source that faults partway through.

use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use speech_session::{
    AudioChunk, CaptureDevice, RecognitionService, ServiceConnection, ServiceEvent, SessionConfig,
    SessionError,
};

/// Counters shared by every connection a [`MockService`] hands out.
#[derive(Default)]
pub struct CallLog {
    pub send_calls: AtomicUsize,
    pub bytes_sent: AtomicUsize,
    pub end_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
}

impl CallLog {
    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent.load(Ordering::SeqCst)
    }

    pub fn end_calls(&self) -> usize {
        self.end_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

/// Recognition service double. Records calls and plays back a scripted set
/// of events once the session signals end-of-audio, which is when the real
/// service flushes its final results.
pub struct MockService {
    script: Mutex<Vec<ServiceEvent>>,
    pub log: Arc<CallLog>,
}

impl MockService {
    pub fn new(script: Vec<ServiceEvent>) -> Self {
        Self {
            script: Mutex::new(script),
            log: Arc::new(CallLog::default()),
        }
    }

    pub fn log(&self) -> Arc<CallLog> {
        Arc::clone(&self.log)
    }
}

#[async_trait::async_trait]
impl RecognitionService for MockService {
    async fn connect(
        &self,
        _config: &SessionConfig,
    ) -> Result<(Box<dyn ServiceConnection>, mpsc::Receiver<ServiceEvent>), SessionError> {
        let (events_tx, events_rx) = mpsc::channel(64);
        let script = self.script.lock().unwrap().clone();

        let connection = MockConnection {
            log: Arc::clone(&self.log),
            script,
            events_tx: Some(events_tx),
        };

        Ok((Box::new(connection), events_rx))
    }
}

struct MockConnection {
    log: Arc<CallLog>,
    script: Vec<ServiceEvent>,
    events_tx: Option<mpsc::Sender<ServiceEvent>>,
}

#[async_trait::async_trait]
impl ServiceConnection for MockConnection {
    async fn send_audio(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        self.log.send_calls.fetch_add(1, Ordering::SeqCst);
        self.log.bytes_sent.fetch_add(bytes.len(), Ordering::SeqCst);
        Ok(())
    }

    async fn end_audio(&mut self) -> Result<(), SessionError> {
        self.log.end_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(tx) = &self.events_tx {
            for event in self.script.drain(..) {
                let _ = tx.send(event).await;
            }
        }

        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.log.close_calls.fetch_add(1, Ordering::SeqCst);
        // Dropping the sender ends the raw event stream.
        self.events_tx = None;
        Ok(())
    }
}

/// Capture device double that produces a fixed set of chunks and keeps the
/// channel open until stopped, like a live microphone would.
pub struct ScriptedMicrophone {
    chunks: Vec<Vec<u8>>,
    tx: Option<mpsc::Sender<AudioChunk>>,
    capturing: bool,
}

impl ScriptedMicrophone {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks,
            tx: None,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureDevice for ScriptedMicrophone {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, SessionError> {
        let (tx, rx) = mpsc::channel(self.chunks.len().max(1));

        for bytes in self.chunks.drain(..) {
            tx.send(AudioChunk::new(bytes)).await.expect("buffered send");
        }

        self.tx = Some(tx);
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), SessionError> {
        self.tx = None;
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "scripted-microphone"
    }
}

/// Byte source that yields `good_bytes` and then fails, simulating an IO
/// fault partway through a file.
pub struct FaultyReader {
    remaining: usize,
}

impl FaultyReader {
    pub fn new(good_bytes: usize) -> Self {
        Self {
            remaining: good_bytes,
        }
    }
}

impl Read for FaultyReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.remaining == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated read fault",
            ));
        }

        let n = buf.len().min(self.remaining);
        buf[..n].fill(0);
        self.remaining -= n;
        Ok(n)
    }
}
