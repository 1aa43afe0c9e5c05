//! Application service layer - customer book, config, export

pub mod book;
pub mod config;
pub mod export;
pub mod repository;

pub use book::{Applied, CustomerBook, CustomerEdit, Match, NewCustomer};
pub use config::Config;
