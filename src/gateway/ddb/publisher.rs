use std::collections::HashMap;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;
use crate::utils::ddb::{number, parse_item};

// Metadata entries copied to top-level numeric attributes so the circulation
// history of a book or a patron can be filtered on directly.
const PAIR_ATTRIBUTES: [&str; 2] = ["book_id", "patron_id"];

// DDBPublisher keeps the circulation history in the `events` table of a
// DynamoDB Local setup, where no SNS endpoint is available.
#[derive(Debug)]
pub struct DDBPublisher {
    client: Client,
    table_name: String,
}

impl DDBPublisher {
    pub fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }
}

pub(crate) fn event_item(event: &DomainEvent) -> LibraryResult<HashMap<String, AttributeValue>> {
    let mut item = parse_item(serde_json::to_value(event)?)?;
    for name in PAIR_ATTRIBUTES {
        if let Some(id) = event.metadata.get(name).and_then(|v| v.parse::<i64>().ok()) {
            item.insert(name.to_string(), number(id));
        }
    }
    Ok(item)
}

#[async_trait]
impl EventPublisher for DDBPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        self.client
            .put_item()
            .table_name(self.table_name.as_str())
            .condition_expression("attribute_not_exists(event_id)")
            .set_item(Some(event_item(event)?))
            .send()
            .await.map(|_| ()).map_err(LibraryError::from)
    }
}
