use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config::EventsConfig;
use crate::domain::user::events::AuthEvent;
use crate::user::errors::EventPublisherError;
use crate::user::ports::EventPublisher;

#[derive(Debug, Clone)]
pub struct NotifierSettings {
    pub capacity: usize,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self::from(&EventsConfig::default())
    }
}

impl From<&EventsConfig> for NotifierSettings {
    fn from(config: &EventsConfig) -> Self {
        Self {
            capacity: config.queue_capacity,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

/// Bounded hand-off between request handlers and the event broker.
///
/// `publish_auth_event` only enqueues, so a slow or unreachable broker never
/// holds up a login. A background worker drains the queue and retries each
/// event with exponential backoff before giving up on it.
#[derive(Clone)]
pub struct AuthEventNotifier {
    sender: mpsc::Sender<AuthEvent>,
}

impl AuthEventNotifier {
    /// Start the delivery worker in front of `publisher`.
    ///
    /// The worker exits once every notifier clone is dropped and the queue is drained.
    pub fn spawn<P: EventPublisher>(
        publisher: Arc<P>,
        settings: NotifierSettings,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(settings.capacity.max(1));

        tracing::info!(
            capacity = settings.capacity,
            max_retries = settings.max_retries,
            retry_backoff_ms = %settings.retry_backoff.as_millis(),
            max_backoff_ms = %settings.max_backoff.as_millis(),
            "Starting auth event notifier"
        );

        let handle = tokio::spawn(run(receiver, publisher, settings));

        (Self { sender }, handle)
    }
}

#[async_trait]
impl EventPublisher for AuthEventNotifier {
    async fn publish_auth_event(&self, event: &AuthEvent) -> Result<(), EventPublisherError> {
        self.sender.try_send(event.clone()).map_err(|e| match e {
            TrySendError::Full(_) => EventPublisherError::QueueFull,
            TrySendError::Closed(_) => EventPublisherError::QueueClosed,
        })
    }
}

async fn run<P: EventPublisher>(
    mut receiver: mpsc::Receiver<AuthEvent>,
    publisher: Arc<P>,
    settings: NotifierSettings,
) {
    while let Some(event) = receiver.recv().await {
        deliver(publisher.as_ref(), &event, &settings).await;
    }

    tracing::info!("Auth event notifier stopped");
}

async fn deliver<P: EventPublisher>(publisher: &P, event: &AuthEvent, settings: &NotifierSettings) {
    let mut attempt: u32 = 0;
    let mut backoff = settings.retry_backoff;

    loop {
        match publisher.publish_auth_event(event).await {
            Ok(()) => return,
            Err(e @ EventPublisherError::SerializationFailed(_)) => {
                tracing::error!(event_id = %event.event_id, "Dropping auth event: {}", e);
                return;
            }
            Err(e) if attempt >= settings.max_retries => {
                tracing::error!(
                    event_id = %event.event_id,
                    event_type = event.kind.as_str(),
                    attempts = attempt + 1,
                    "Dropping auth event after retries: {}",
                    e
                );
                return;
            }
            Err(e) => {
                attempt += 1;
                tracing::warn!(
                    event_id = %event.event_id,
                    attempt,
                    backoff_ms = %backoff.as_millis(),
                    "Auth event delivery failed, retrying: {}",
                    e
                );
                sleep(backoff).await;
                backoff = (backoff * 2).min(settings.max_backoff);
            }
        }
    }
}
