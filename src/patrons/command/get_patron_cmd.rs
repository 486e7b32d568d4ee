use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use crate::checkout::dto::CheckoutDto;
use crate::core::library::parse_id;
use crate::hold::dto::HoldDto;
use crate::patrons::dto::{FineSummaryDto, PatronDto};
use crate::core::command::{Command, CommandError};
use crate::patrons::domain::PatronService;

pub struct GetPatronCommand {
    patron_service: Box<dyn PatronService>,
}

impl GetPatronCommand {
    pub fn new(patron_service: Box<dyn PatronService>) -> Self {
        Self {
            patron_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetPatronCommandRequest {
    pub patron_id: String,
}

impl GetPatronCommandRequest {
    pub fn new(patron_id: String) -> Self {
        Self {
            patron_id,
        }
    }
}

// the patron account screen: profile, holds, checkouts and fine
#[derive(Debug, Serialize)]
pub struct GetPatronCommandResponse {
    patron: PatronDto,
    holds: Vec<HoldDto>,
    checkouts: Vec<CheckoutDto>,
    fine: FineSummaryDto,
}

impl GetPatronCommandResponse {
    pub fn new(patron: PatronDto, holds: Vec<HoldDto>, checkouts: Vec<CheckoutDto>, fine: FineSummaryDto) -> Self {
        Self {
            patron,
            holds,
            checkouts,
            fine,
        }
    }
}

#[async_trait]
impl Command<GetPatronCommandRequest, GetPatronCommandResponse> for GetPatronCommand {
    async fn execute(&self, req: GetPatronCommandRequest) -> Result<GetPatronCommandResponse, CommandError> {
        let patron_id = parse_id("patron", req.patron_id.as_str())?;
        let now = Utc::now().naive_utc();
        let patron = self.patron_service.find_patron_by_id(patron_id).await?;
        let holds = self.patron_service.holds(patron_id).await?;
        let checkouts = self.patron_service.checkouts(patron_id, now).await?;
        let fine = self.patron_service.fine_summary(patron_id, now).await?;
        Ok(GetPatronCommandResponse::new(patron, holds, checkouts, fine))
    }
}
