//! Categories for grouping expenses.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    category_exists, create_category, create_category_table, delete_category, get_all_categories,
    get_category, update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryData, CategoryId, CategoryName};
pub use edit::{get_category_endpoint, update_category_endpoint};
pub use list::list_categories_endpoint;
