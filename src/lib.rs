//! A client for keeping track of money owed, with the debts stored on a REST endpoint.

pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
pub mod sync;
mod utils;
pub mod view;


pub use api::Mode;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
