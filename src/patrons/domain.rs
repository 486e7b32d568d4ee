pub mod model;
pub mod service;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::checkout::dto::CheckoutDto;
use crate::core::library::LibraryResult;
use crate::hold::dto::HoldDto;
use crate::patrons::dto::{FineSummaryDto, PatronDto};

// PatronService registers patrons and builds their read-only views. It never
// changes the circulation counters.
#[async_trait]
pub trait PatronService: Sync + Send {
    async fn add_patron(&self, patron: &PatronDto) -> LibraryResult<PatronDto>;
    async fn find_patron_by_id(&self, patron_id: i64) -> LibraryResult<PatronDto>;
    // ordered by title
    async fn holds(&self, patron_id: i64) -> LibraryResult<Vec<HoldDto>>;
    // ordered by due date, then title
    async fn checkouts(&self, patron_id: i64, now: NaiveDateTime) -> LibraryResult<Vec<CheckoutDto>>;
    async fn fine_summary(&self, patron_id: i64, now: NaiveDateTime) -> LibraryResult<FineSummaryDto>;
}
