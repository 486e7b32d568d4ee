use std::env;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}

pub const DEFAULT_MAX_HOLDS: i64 = 25;
pub const DEFAULT_MAX_BOOKS_OUT: i64 = 10;
pub const DEFAULT_BOOK_LOAN_DAYS: i64 = 14;
pub const DEFAULT_FINE_PER_DAY_CENTS: i64 = 25;

// Configuration abstracts config options for library system
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub max_holds: i64,
    pub max_books_out: i64,
    pub book_loan_days: i64,
    pub fine_per_day_cents: i64,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            max_holds: DEFAULT_MAX_HOLDS,
            max_books_out: DEFAULT_MAX_BOOKS_OUT,
            book_loan_days: DEFAULT_BOOK_LOAN_DAYS,
            fine_per_day_cents: DEFAULT_FINE_PER_DAY_CENTS,
        }
    }

    // overrides defaults from LMS_* environment variables
    pub fn from_env(branch_id: &str) -> Self {
        let defaults = Configuration::new(branch_id);
        Configuration {
            branch_id: branch_id.to_string(),
            max_holds: env_or("LMS_MAX_HOLDS", defaults.max_holds),
            max_books_out: env_or("LMS_MAX_BOOKS_OUT", defaults.max_books_out),
            book_loan_days: env_or("LMS_BOOK_LOAN_DAYS", defaults.book_loan_days),
            fine_per_day_cents: env_or("LMS_FINE_PER_DAY_CENTS", defaults.fine_per_day_cents),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name).ok()
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}
