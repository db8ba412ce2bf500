//! Spending totals for a user.

mod db;
mod endpoint;

pub use db::{CategoryTotal, get_category_totals, get_total_expense};
pub use endpoint::get_analytics;
