use async_trait::async_trait;
use crate::circulation::command::respond;
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::{CirculationAction, CirculationRequest, CirculationResponse};
use crate::core::command::{Command, CommandError};

pub struct PlaceHoldCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl PlaceHoldCommand {
    pub fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[async_trait]
impl Command<CirculationRequest, CirculationResponse> for PlaceHoldCommand {
    async fn execute(&self, req: CirculationRequest) -> Result<CirculationResponse, CommandError> {
        let res = match req.ids() {
            Ok((patron_id, book_id)) => self.circulation_service.place_hold(patron_id, book_id).await,
            Err(err) => Err(err),
        };
        respond(CirculationAction::PlaceHold, &req, res)
    }
}
