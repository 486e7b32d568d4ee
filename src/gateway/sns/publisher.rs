use std::collections::HashMap;
use aws_sdk_sns::Client;
use async_trait::async_trait;
use aws_sdk_sns::error::SdkError;
use aws_sdk_sns::operation::create_topic::CreateTopicError;
use aws_sdk_sns::operation::publish::PublishError;
use tokio::sync::Mutex;
use tracing::info;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

// SNSPublisher sends each event to the topic named after the event, e.g.
// `hold_placed`.
#[derive(Debug)]
pub struct SNSPublisher {
    client: Client,
    topics: Mutex<HashMap<String, String>>,
}

impl SNSPublisher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            topics: Mutex::new(HashMap::new()),
        }
    }

    // CreateTopic is idempotent so an unknown topic is resolved on first use
    async fn topic_arn(&self, topic: &str) -> Result<String, LibraryError> {
        let mut topics = self.topics.lock().await;
        if let Some(arn) = topics.get(topic) {
            return Ok(arn.to_string());
        }
        let resp = self.client.create_topic().name(topic).send().await?;
        let arn = resp.topic_arn().map(str::to_string).ok_or_else(||
            LibraryError::runtime(format!("topic is not found {}", topic).as_str(), None))?;
        info!("resolved topic {} to {}", topic, arn);
        topics.insert(topic.to_string(), arn.to_string());
        Ok(arn)
    }
}

#[async_trait]
impl EventPublisher for SNSPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        let arn = self.topic_arn(event.name.as_str()).await?;
        let json = serde_json::to_string(event)?;
        self.client.publish().topic_arn(arn).message(json).send().await?;
        Ok(())
    }
}

impl From<SdkError<CreateTopicError>> for LibraryError {
    fn from(err: SdkError<CreateTopicError>) -> Self {
        LibraryError::runtime(format!("{:?}", err).as_str(), None)
    }
}

impl From<SdkError<PublishError>> for LibraryError {
    fn from(err: SdkError<PublishError>) -> Self {
        LibraryError::runtime(format!("{:?}", err).as_str(), None)
    }
}
