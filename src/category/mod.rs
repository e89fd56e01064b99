//! Categories for grouping transactions.

mod create;
mod db;
mod domain;
mod list;

pub use create::create_category_endpoint;
pub use db::{create_category, create_category_table, get_all_categories, get_category};
pub use domain::{Category, CategoryId, CategoryName};
pub use list::list_categories_endpoint;
