use crate::core::domain::{Configuration, Identifiable};

pub mod command;
pub mod controller;
pub mod domain;
pub mod dto;
pub mod factory;

pub const PATRON_MIN_ID: i64 = 10;

pub trait Patron: Identifiable {
    fn patron_id(&self) -> i64;
    fn full_name(&self) -> String;
    fn num_holds(&self) -> i64;
    fn num_books_out(&self) -> i64;
    fn fine_cents(&self) -> i64;

    fn has_reached_hold_quota(&self, config: &Configuration) -> bool {
        self.num_holds() >= config.max_holds
    }

    fn has_reached_checkout_quota(&self, config: &Configuration) -> bool {
        self.num_books_out() >= config.max_books_out
    }
}
