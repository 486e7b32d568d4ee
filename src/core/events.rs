use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::utils::date::serializer;

// DomainEventType names the state changes published by the library
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum DomainEventType {
    BookAdded,
    PatronAdded,
    HoldPlaced,
    HoldRemoved,
    BookCheckedOut,
    BookReturned,
}

impl DomainEventType {
    pub fn group(&self) -> &'static str {
        match self {
            DomainEventType::BookAdded => "catalog",
            DomainEventType::PatronAdded => "patrons",
            DomainEventType::HoldPlaced | DomainEventType::HoldRemoved => "holds",
            DomainEventType::BookCheckedOut | DomainEventType::BookReturned => "checkouts",
        }
    }
}

impl Display for DomainEventType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            DomainEventType::BookAdded => write!(f, "book_added"),
            DomainEventType::PatronAdded => write!(f, "patron_added"),
            DomainEventType::HoldPlaced => write!(f, "hold_placed"),
            DomainEventType::HoldRemoved => write!(f, "hold_removed"),
            DomainEventType::BookCheckedOut => write!(f, "book_checked_out"),
            DomainEventType::BookReturned => write!(f, "book_returned"),
        }
    }
}

// DomainEvent abstracts domain event for data changes
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_id: String,
    pub name: String,
    pub group: String,
    pub key: String,
    pub kind: DomainEventType,
    pub metadata: HashMap<String, String>,
    pub json_data: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl DomainEvent {
    pub fn build<T: Serialize>(kind: DomainEventType, key: &str,
                               metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(DomainEvent {
            event_id: Uuid::new_v4().to_string(),
            name: kind.to_string(),
            group: kind.group().to_string(),
            key: key.to_string(),
            kind,
            metadata: metadata.clone(),
            json_data: json,
            created_at: Utc::now().naive_utc(),
        })
    }

    // event keyed by the (book, patron) pair an action applied to
    pub fn for_pair<T: Serialize>(kind: DomainEventType, book_id: i64, patron_id: i64,
                                  data: &T) -> serde_json::Result<Self> {
        let metadata = HashMap::from([
            ("book_id".to_string(), book_id.to_string()),
            ("patron_id".to_string(), patron_id.to_string()),
        ]);
        Self::build(kind, format!("{}:{}", book_id, patron_id).as_str(), &metadata, data)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::{DomainEvent, DomainEventType};

    #[tokio::test]
    async fn test_should_build_event() {
        let data = HashMap::from([("a", 1), ("b", 2)]);
        let event = DomainEvent::build(DomainEventType::BookAdded, "key", &HashMap::from([("k".to_string(), "v".to_string())]), &data).expect("build event");
        assert_eq!("book_added", event.name.as_str());
        assert_eq!("catalog", event.group.as_str());
        assert_eq!("key", event.key.as_str());
        assert_eq!(DomainEventType::BookAdded, event.kind);
    }

    #[tokio::test]
    async fn test_should_build_pair_event() {
        let event = DomainEvent::for_pair(DomainEventType::HoldPlaced, 3, 11, &"data").expect("build event");
        assert_eq!("3:11", event.key.as_str());
        assert_eq!("holds", event.group.as_str());
        assert_eq!(Some(&"11".to_string()), event.metadata.get("patron_id"));
    }

    #[tokio::test]
    async fn test_should_round_trip_json() {
        let event = DomainEvent::for_pair(DomainEventType::BookReturned, 1, 10, &"data").expect("build event");
        let json = serde_json::to_string(&event).expect("should serialize");
        let loaded: DomainEvent = serde_json::from_str(json.as_str()).expect("should deserialize");
        assert_eq!(event.event_id, loaded.event_id);
        assert_eq!(DomainEventType::BookReturned, loaded.kind);
    }
}
