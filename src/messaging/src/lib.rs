use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use messages::batch::QueryBatch;
use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config;
pub mod messages;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "message_type", content = "data")]
pub enum Message {
    QueryBatch(QueryBatch),
}

// Messaging backend trait
#[async_trait]
pub trait MessagingBackend: Send + Sync {
    async fn send_message(&self, topic: &str, message: Message) -> Result<(), String>;

    // Return a stream of the messages currently pending on a topic
    async fn stream(&self, topic: &str) -> Pin<Box<dyn Stream<Item = Message> + Send>>;
}

#[async_trait]
impl<B: MessagingBackend + ?Sized> MessagingBackend for std::sync::Arc<B> {
    async fn send_message(&self, topic: &str, message: Message) -> Result<(), String> {
        (**self).send_message(topic, message).await
    }

    async fn stream(&self, topic: &str) -> Pin<Box<dyn Stream<Item = Message> + Send>> {
        (**self).stream(topic).await
    }
}

pub struct Dispatcher<B> {
    backend: B,
}

impl<B: MessagingBackend> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn send(&self, topic: &str, message: Message) -> Result<(), String> {
        self.backend.send_message(topic, message).await
    }

    pub async fn stream(&self, topic: &str) -> Pin<Box<dyn Stream<Item = Message> + Send>> {
        self.backend.stream(topic).await
    }
}
