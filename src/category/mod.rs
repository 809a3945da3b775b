//! Categories that group a user's transactions.

mod db;
mod domain;

pub use db::{create_category, create_category_table, delete_category, update_category};
pub use domain::{
    Category, CategoryName, CategoryUpdate, DEFAULT_COLOR, DEFAULT_ICON, NewCategory,
};
