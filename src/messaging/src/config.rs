use crate::{
    MessagingBackend,
    backend::{memory::InMemoryStreamingBackend, stdout::StdoutBackend},
};
use common::config::DeliveryBackend;
use std::sync::Arc;

/// Configuration for the messaging system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendConfig {
    /// In-memory backend configuration.
    Memory,
    /// JSON lines on standard output.
    Stdout,
}

impl BackendConfig {
    /// Create a backend from the configuration.
    pub fn create_backend(&self) -> Arc<dyn MessagingBackend> {
        match self {
            BackendConfig::Memory => Arc::new(InMemoryStreamingBackend::new()),
            BackendConfig::Stdout => Arc::new(StdoutBackend::new()),
        }
    }
}

impl From<DeliveryBackend> for BackendConfig {
    fn from(backend: DeliveryBackend) -> Self {
        match backend {
            DeliveryBackend::Memory => BackendConfig::Memory,
            DeliveryBackend::Stdout => BackendConfig::Stdout,
        }
    }
}
