//! Message Dispatcher: acknowledged publish of job envelopes to the downstream pipeline

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::error::{OrchestrateError, Result};

const COMPONENT: &str = "dispatcher";

/// Synchronous, acknowledged publish; returns `(partition, offset)` once the broker stored the message
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(i32, i64)>;
}

/// Publish with an upper bound on how long the acknowledgement may take
pub async fn publish_with_timeout(
    dispatcher: &dyn MessageDispatcher,
    timeout: Duration,
    topic: &str,
    payload: Vec<u8>,
) -> Result<(i32, i64)> {
    match tokio::time::timeout(timeout, dispatcher.publish(topic, payload)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(topic = %topic, timeout_ms = timeout.as_millis() as u64, "publish timed out");
            Err(OrchestrateError::broker_connection(format!(
                "publish to {} timed out after {:?}",
                topic, timeout
            ))
            .extend_component(COMPONENT))
        }
    }
}

/// JetStream publisher; the stream sequence is reported as the offset
#[derive(Clone)]
pub struct NatsDispatcher {
    jetstream: async_nats::jetstream::Context,
}

impl NatsDispatcher {
    pub fn new(client: async_nats::Client) -> Self {
        Self {
            jetstream: async_nats::jetstream::new(client),
        }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let client = async_nats::connect(url).await.map_err(|e| {
            OrchestrateError::broker_connection(format!("failed to connect to NATS at {}: {}", url, e))
                .extend_component(COMPONENT)
        })?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl MessageDispatcher for NatsDispatcher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(i32, i64)> {
        let ack = self
            .jetstream
            .publish(topic.to_string(), bytes::Bytes::from(payload))
            .await
            .map_err(|e| {
                OrchestrateError::broker_connection(format!("failed to publish to {}: {}", topic, e))
                    .extend_component(COMPONENT)
            })?;

        // Wait for ack (confirms message was stored)
        let ack = ack.await.map_err(|e| {
            OrchestrateError::broker_connection(format!("publish to {} was not acknowledged: {}", topic, e))
                .extend_component(COMPONENT)
        })?;

        Ok((0, ack.sequence as i64))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Broker-less dispatcher that keeps every message in memory
#[derive(Default)]
pub struct InMemoryDispatcher {
    messages: Mutex<Vec<DispatchedMessage>>,
    failing: Mutex<bool>,
}

impl InMemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail with a broker error
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn messages(&self) -> Vec<DispatchedMessage> {
        self.messages.lock().clone()
    }

    pub fn messages_on(&self, topic: &str) -> Vec<DispatchedMessage> {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageDispatcher for InMemoryDispatcher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(i32, i64)> {
        if *self.failing.lock() {
            return Err(OrchestrateError::broker_connection(format!("broker unavailable for {}", topic))
                .extend_component(COMPONENT));
        }

        let mut messages = self.messages.lock();
        messages.push(DispatchedMessage {
            topic: topic.to_string(),
            payload,
        });
        Ok((0, messages.len() as i64 - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Stalled;

    #[async_trait]
    impl MessageDispatcher for Stalled {
        async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<(i32, i64)> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok((0, 0))
        }
    }

    #[tokio::test]
    async fn test_in_memory_offsets() {
        let dispatcher = InMemoryDispatcher::new();
        assert_eq!(dispatcher.publish("a", vec![1]).await.unwrap(), (0, 0));
        assert_eq!(dispatcher.publish("b", vec![2]).await.unwrap(), (0, 1));
        assert_eq!(dispatcher.messages_on("a").len(), 1);

        dispatcher.set_failing(true);
        let err = dispatcher.publish("a", vec![3]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BrokerConnection);
        assert_eq!(dispatcher.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_publish_timeout_is_broker_error() {
        let err = publish_with_timeout(&Stalled, Duration::from_millis(10), "topic", vec![])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BrokerConnection);
        assert!(err.is_retryable());
    }
}
