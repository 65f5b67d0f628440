use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::{Message, MessagingBackend};

/// Writes every message as one JSON line, prefixed by nothing but the payload.
///
/// Consumers read the output directly, so `stream` never yields anything.
pub struct StdoutBackend {
    writer: Arc<Mutex<Pin<Box<dyn AsyncWrite + Send>>>>,
}

impl StdoutBackend {
    pub fn new() -> Self {
        Self::with_writer(tokio::io::stdout())
    }

    pub fn with_writer(writer: impl AsyncWrite + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::pin(writer))),
        }
    }
}

impl Default for StdoutBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingBackend for StdoutBackend {
    async fn send_message(&self, _topic: &str, message: Message) -> Result<(), String> {
        let mut line =
            serde_json::to_vec(&message).map_err(|e| format!("Serialization error: {e}"))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(|e| format!("Write error: {e}"))?;
        writer.flush().await.map_err(|e| format!("Write error: {e}"))
    }

    async fn stream(&self, _topic: &str) -> Pin<Box<dyn Stream<Item = Message> + Send>> {
        Box::pin(futures::stream::empty())
    }
}
