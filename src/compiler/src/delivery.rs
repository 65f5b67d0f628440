use common::config::DeliveryConfig;
use common::model::CompiledQuery;
use messaging::messages::batch::QueryBatch;
use messaging::{Dispatcher, Message, MessagingBackend};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Failed to publish batch {sequence} of job {job_id} to {topic}: {reason}")]
    Publish {
        job_id: String,
        topic: String,
        sequence: usize,
        reason: String,
    },
}

/// Hands a job's compiled queries to the messaging backend in fixed-size batches.
pub struct QueryDelivery<B> {
    dispatcher: Dispatcher<B>,
    topic: String,
    batch_size: usize,
}

impl<B: MessagingBackend> QueryDelivery<B> {
    pub fn new(backend: B, topic: impl Into<String>, batch_size: usize) -> Self {
        Self {
            dispatcher: Dispatcher::new(backend),
            topic: topic.into(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn from_config(backend: B, config: &DeliveryConfig) -> Self {
        Self::new(backend, config.topic.clone(), config.batch_size)
    }

    /// Publish `queries` in order; returns the number of batches sent.
    pub async fn deliver(
        &self,
        job_id: &str,
        queries: &[CompiledQuery],
    ) -> Result<usize, DeliveryError> {
        let mut sent = 0;
        for (sequence, chunk) in queries.chunks(self.batch_size).enumerate() {
            let batch = QueryBatch::new(job_id, sequence, chunk.to_vec());
            self.dispatcher
                .send(&self.topic, Message::QueryBatch(batch))
                .await
                .map_err(|reason| DeliveryError::Publish {
                    job_id: job_id.to_string(),
                    topic: self.topic.clone(),
                    sequence,
                    reason,
                })?;
            sent += 1;
        }

        log::debug!(
            "Delivered {} queries for job {job_id} in {sent} batches to {}",
            queries.len(),
            self.topic
        );
        Ok(sent)
    }
}
