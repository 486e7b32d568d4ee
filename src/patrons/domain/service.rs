use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::warn;
use crate::checkout::dto::CheckoutDto;
use crate::core::domain::Configuration;
use crate::core::events::{DomainEvent, DomainEventType};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::LibraryStore;
use crate::gateway::events::EventPublisher;
use crate::hold::dto::HoldDto;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::domain::PatronService;
use crate::patrons::dto::{FineSummaryDto, PatronDto};

pub struct PatronServiceImpl {
    fine_per_day_cents: i64,
    store: Arc<dyn LibraryStore>,
    events_publisher: Box<dyn EventPublisher>,
}

impl PatronServiceImpl {
    pub fn new(config: &Configuration, store: Arc<dyn LibraryStore>,
               events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            fine_per_day_cents: config.fine_per_day_cents,
            store,
            events_publisher,
        }
    }
}

#[async_trait]
impl PatronService for PatronServiceImpl {
    async fn add_patron(&self, patron: &PatronDto) -> LibraryResult<PatronDto> {
        if patron.first_name.trim().is_empty() && patron.last_name.trim().is_empty() {
            return Err(LibraryError::validation("patron name is required", Some("400".to_string())));
        }
        let saved = self.store.add_patron(&PatronEntity::new(
            patron.first_name.trim(), patron.last_name.trim())).await?;
        let dto = PatronDto::from(&saved);
        let event = DomainEvent::build(DomainEventType::PatronAdded, dto.patron_id.to_string().as_str(),
                                       &HashMap::new(), &dto)?;
        if let Err(err) = self.events_publisher.publish(&event).await {
            warn!(patron_id = dto.patron_id, "failed to publish {} event: {}", event.name, err);
        }
        Ok(dto)
    }

    async fn find_patron_by_id(&self, patron_id: i64) -> LibraryResult<PatronDto> {
        self.store.find_patron(patron_id).await.map(|p| PatronDto::from(&p))
    }

    async fn holds(&self, patron_id: i64) -> LibraryResult<Vec<HoldDto>> {
        let mut res = vec![];
        for hold in self.store.holds_for_patron(patron_id).await? {
            let book = self.store.find_book(hold.book_id).await?;
            res.push(HoldDto::from_hold_book(&hold, &book));
        }
        res.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.author.cmp(&b.author)));
        Ok(res)
    }

    async fn checkouts(&self, patron_id: i64, now: NaiveDateTime) -> LibraryResult<Vec<CheckoutDto>> {
        let mut res = vec![];
        for checkout in self.store.checkouts_for_patron(patron_id).await? {
            let book = self.store.find_book(checkout.book_id).await?;
            res.push(CheckoutDto::from_checkout_book(&checkout, &book, now, self.fine_per_day_cents));
        }
        res.sort_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.title.cmp(&b.title)));
        Ok(res)
    }

    async fn fine_summary(&self, patron_id: i64, now: NaiveDateTime) -> LibraryResult<FineSummaryDto> {
        let patron = self.find_patron_by_id(patron_id).await?;
        let overdue: i64 = self.checkouts(patron_id, now).await?.iter().map(|c| c.fine_cents).sum();
        Ok(FineSummaryDto::new(&patron, overdue))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use chrono::{Duration, Utc};
    use crate::books::domain::model::BookEntity;
    use crate::checkout::domain::model::CheckoutEntity;
    use crate::circulation::domain::batch::CirculationBatch;
    use crate::circulation::repository::memory_library_store::MemoryLibraryStore;
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::core::repository::{LibraryStore, RepositoryStore};
    use crate::hold::domain::model::HoldEntity;
    use crate::patrons::domain::PatronService;
    use crate::patrons::dto::PatronDto;
    use crate::patrons::factory::create_patron_service;

    async fn build_service() -> (Arc<dyn LibraryStore>, Box<dyn PatronService>) {
        let store: Arc<dyn LibraryStore> = Arc::new(MemoryLibraryStore::new());
        let svc = create_patron_service(&Configuration::new("test"), RepositoryStore::Memory, store.clone()).await;
        (store, svc)
    }

    #[tokio::test]
    async fn test_should_add_and_find_patron() {
        let (_, svc) = build_service().await;
        let first = svc.add_patron(&PatronDto::new("Ada", "Lovelace")).await.expect("should add patron");
        let second = svc.add_patron(&PatronDto::new("Grace", "Hopper")).await.expect("should add patron");
        assert_eq!(10, first.patron_id);
        assert_eq!(11, second.patron_id);
        assert_eq!(first, svc.find_patron_by_id(10).await.expect("should find patron"));
        assert!(matches!(svc.find_patron_by_id(12).await, Err(LibraryError::NotFound { .. })));
        assert!(svc.add_patron(&PatronDto::new(" ", "")).await.is_err());
    }

    #[tokio::test]
    async fn test_should_list_holds_by_title() {
        let (store, svc) = build_service().await;
        let patron = svc.add_patron(&PatronDto::new("Ada", "Lovelace")).await.expect("should add patron");
        let zebra = store.add_book(&BookEntity::new("Zebra", "Author", "Fiction")).await.expect("should add book");
        let apple = store.add_book(&BookEntity::new("Apple", "Author", "Fiction")).await.expect("should add book");
        let mut batch = CirculationBatch::new();
        batch.insert_hold(HoldEntity::new(zebra.book_id, patron.patron_id));
        batch.insert_hold(HoldEntity::new(apple.book_id, patron.patron_id));
        store.commit(&batch).await.expect("should commit");

        let holds = svc.holds(patron.patron_id).await.expect("should list holds");
        let titles: Vec<&str> = holds.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(vec!["Apple", "Zebra"], titles);
        assert!(holds.iter().all(|h| h.available));
    }

    #[tokio::test]
    async fn test_should_estimate_overdue_fines() {
        let (store, svc) = build_service().await;
        let patron = svc.add_patron(&PatronDto::new("Ada", "Lovelace")).await.expect("should add patron");
        let late = store.add_book(&BookEntity::new("Late", "Author", "Fiction")).await.expect("should add book");
        let fresh = store.add_book(&BookEntity::new("Fresh", "Author", "Fiction")).await.expect("should add book");
        let now = Utc::now().naive_utc();
        let mut batch = CirculationBatch::new();
        batch.insert_checkout(CheckoutEntity::checked_out_at(late.book_id, patron.patron_id, now - Duration::days(20), 14));
        batch.insert_checkout(CheckoutEntity::checked_out_at(fresh.book_id, patron.patron_id, now, 14));
        store.commit(&batch).await.expect("should commit");

        let checkouts = svc.checkouts(patron.patron_id, now).await.expect("should list checkouts");
        assert_eq!("Late", checkouts[0].title.as_str());
        assert_eq!(6, checkouts[0].days_overdue);
        assert_eq!(0, checkouts[1].fine_cents);

        let fine = svc.fine_summary(patron.patron_id, now).await.expect("should summarize");
        assert_eq!(0, fine.accumulated_cents);
        assert_eq!(150, fine.overdue_estimate_cents);
        assert!(fine.summary.contains("$1.50"));
    }
}
