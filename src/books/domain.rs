use crate::core::domain::Identifiable;

pub mod model;

pub trait Book: Identifiable {
    fn book_id(&self) -> i64;
    fn title(&self) -> &str;
    fn is_checked_out(&self) -> bool;
    fn is_on_hold(&self) -> bool;
}
