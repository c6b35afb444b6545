//! NATS consumer loop and reply publishing
//!
//! One subscription on the configured subject; each inbound message is
//! handled on its own task so a slow agent call never holds up the queue.
//! The reply target is resolved as broker reply subject first, then the
//! payload's `replyTo`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::StreamExt;
use prism_core::{dispatch, Agent, PrismError, SessionStore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::AcpError;
use crate::wire::{BrokerReply, BrokerRequest};

pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect to the broker.
pub async fn connect(url: &str) -> Result<async_nats::Client, AcpError> {
    let client = async_nats::connect(url).await?;
    info!(url, "connected to nats");
    Ok(client)
}

/// Where a reply goes once dispatch finishes. Implemented by the NATS
/// client and by test doubles.
#[async_trait]
pub trait ReplyPublisher: Send + Sync {
    async fn publish_reply(&self, subject: &str, payload: Vec<u8>) -> Result<(), AcpError>;
}

#[async_trait]
impl ReplyPublisher for async_nats::Client {
    async fn publish_reply(&self, subject: &str, payload: Vec<u8>) -> Result<(), AcpError> {
        self.publish(subject.to_string(), payload.into())
            .await
            .map_err(|err| AcpError::Publish(err.to_string()))
    }
}

/// A request whose reply has not been published yet.
#[derive(Debug, Clone)]
pub struct PendingReply {
    pub correlation_id: String,
    pub reply_target: String,
    pub submitted_at: DateTime<Utc>,
}

/// Consumes the inbound subject and answers every message.
pub struct AcpConsumer {
    agent: Arc<dyn Agent>,
    sessions: Arc<SessionStore>,
    subject: String,
    process_timeout: Duration,
    pending: DashMap<String, PendingReply>,
}

impl AcpConsumer {
    pub fn new(
        agent: Arc<dyn Agent>,
        sessions: Arc<SessionStore>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            sessions,
            subject: subject.into(),
            process_timeout: DEFAULT_PROCESS_TIMEOUT,
            pending: DashMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.process_timeout = timeout;
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Requests currently in flight (dispatched, reply not yet published).
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Subscribe and handle messages until the subscription ends.
    pub async fn serve(self: Arc<Self>, client: async_nats::Client) -> Result<(), AcpError> {
        let mut sub = client.subscribe(self.subject.clone()).await?;
        info!(subject = %self.subject, "broker consumer subscribed");

        while let Some(msg) = sub.next().await {
            let consumer = Arc::clone(&self);
            let publisher = client.clone();
            tokio::spawn(async move {
                let reply = msg.reply.as_ref().map(|subject| subject.to_string());
                if let Err(err) = consumer
                    .handle_message(&publisher, &msg.payload, reply)
                    .await
                {
                    error!(error = %err, "broker handler failed");
                }
            });
        }

        Ok(())
    }

    /// Handle one inbound message end to end: parse, dispatch, publish the
    /// reply. Every parseable message with a reply target gets exactly one
    /// reply, error-shaped when dispatch fails or times out.
    pub async fn handle_message(
        &self,
        publisher: &dyn ReplyPublisher,
        payload: &[u8],
        broker_reply: Option<String>,
    ) -> Result<(), AcpError> {
        let request: BrokerRequest = serde_json::from_slice(payload)
            .map_err(|err| AcpError::BadRequest(format!("malformed broker payload: {err}")))?;

        let correlation_id = request
            .correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let Some(reply_to) = broker_reply.or_else(|| request.reply_to.clone()) else {
            return Err(AcpError::BadRequest(format!(
                "message {correlation_id} has no reply target"
            )));
        };
        let session_id = request.session_id.clone();

        self.pending.insert(
            correlation_id.clone(),
            PendingReply {
                correlation_id: correlation_id.clone(),
                reply_target: reply_to.clone(),
                submitted_at: Utc::now(),
            },
        );
        debug!(correlation_id = %correlation_id, reply_to = %reply_to, "broker message accepted");

        let outcome = tokio::time::timeout(
            self.process_timeout,
            dispatch(
                self.agent.as_ref(),
                &self.sessions,
                request.into_request(&correlation_id),
            ),
        )
        .await;

        let reply = match outcome {
            Ok(Ok(response)) => BrokerReply::success(correlation_id.clone(), response),
            Ok(Err(err)) => {
                warn!(correlation_id = %correlation_id, kind = err.kind(), "dispatch failed: {err}");
                BrokerReply::failure(correlation_id.clone(), session_id, &err)
            }
            Err(_) => {
                let err = PrismError::Agent(format!(
                    "processing timed out after {} seconds",
                    self.process_timeout.as_secs()
                ));
                warn!(correlation_id = %correlation_id, "{err}");
                BrokerReply::failure(correlation_id.clone(), session_id, &err)
            }
        };

        let result = self.publish(publisher, &reply_to, &reply).await;
        self.pending.remove(&correlation_id);
        result
    }

    async fn publish(
        &self,
        publisher: &dyn ReplyPublisher,
        reply_to: &str,
        reply: &BrokerReply,
    ) -> Result<(), AcpError> {
        let payload = serde_json::to_vec(reply)
            .map_err(|err| AcpError::Publish(format!("serialize reply failed: {err}")))?;
        publisher.publish_reply(reply_to, payload).await
    }
}
