pub mod checkout_book_cmd;
pub mod place_hold_cmd;
pub mod remove_hold_cmd;
pub mod return_book_cmd;

use crate::circulation::command::checkout_book_cmd::CheckoutBookCommand;
use crate::circulation::command::place_hold_cmd::PlaceHoldCommand;
use crate::circulation::command::remove_hold_cmd::RemoveHoldCommand;
use crate::circulation::command::return_book_cmd::ReturnBookCommand;
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::{CirculationAction, CirculationReceiptDto, CirculationRequest, CirculationResponse, Outcome};
use crate::core::command::{Command, CommandError};
use crate::core::library::LibraryResult;

impl CirculationAction {
    // runs the command for this action
    pub async fn dispatch(self, circulation_service: Box<dyn CirculationService>,
                          req: CirculationRequest) -> Result<CirculationResponse, CommandError> {
        match self {
            CirculationAction::PlaceHold => PlaceHoldCommand::new(circulation_service).execute(req).await,
            CirculationAction::RemoveHold => RemoveHoldCommand::new(circulation_service).execute(req).await,
            CirculationAction::CheckOut => CheckoutBookCommand::new(circulation_service).execute(req).await,
            CirculationAction::Return => ReturnBookCommand::new(circulation_service).execute(req).await,
        }
    }
}

// Rule violations become a response outcome, store failures stay errors.
pub(crate) fn respond(action: CirculationAction, req: &CirculationRequest,
                      res: LibraryResult<CirculationReceiptDto>) -> Result<CirculationResponse, CommandError> {
    match res {
        Ok(receipt) => Ok(CirculationResponse::success(req, receipt)),
        Err(err) => match Outcome::from_error(&err) {
            Some(outcome) => Ok(CirculationResponse::rejected(action, req, outcome, err.message())),
            None => Err(CommandError::from(err)),
        },
    }
}
