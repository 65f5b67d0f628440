use async_trait::async_trait;
use futures::stream::Stream;
use std::sync::Arc;
use std::{collections::HashMap, pin::Pin};
use tokio::sync::{Mutex, mpsc};

use crate::{Message, MessagingBackend};

type SharedReceiver = Arc<Mutex<mpsc::UnboundedReceiver<Message>>>;

struct Topic {
    sender: mpsc::UnboundedSender<Message>,
    receiver: SharedReceiver,
}

impl Topic {
    fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }
}

/// Keeps published messages in memory until a stream drains them.
#[derive(Clone, Default)]
pub struct InMemoryStreamingBackend {
    topics: Arc<Mutex<HashMap<String, Topic>>>,
}

impl InMemoryStreamingBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagingBackend for InMemoryStreamingBackend {
    async fn send_message(&self, topic: &str, message: Message) -> Result<(), String> {
        let mut topics = self.topics.lock().await;
        let topic = topics.entry(topic.to_string()).or_insert_with(Topic::new);
        topic.sender.send(message).map_err(|e| e.to_string())
    }

    async fn stream(&self, topic: &str) -> Pin<Box<dyn Stream<Item = Message> + Send>> {
        let receiver = {
            let mut topics = self.topics.lock().await;
            topics
                .entry(topic.to_string())
                .or_insert_with(Topic::new)
                .receiver
                .clone()
        };

        // Ends once the messages pending at poll time are consumed
        Box::pin(futures::stream::unfold(receiver, |receiver| async move {
            let next = receiver.lock().await.try_recv().ok();
            next.map(|message| (message, receiver))
        }))
    }
}
