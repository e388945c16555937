//! Track product pages: which ones are in stock, and at what price.
//!
//! The [`controller::ProductListController`] keeps a cached copy of the
//! `tracker` table and mediates every change through an injected
//! [`storage::Storage`] backend.

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod notify;
pub mod parsers;
pub mod render;
pub mod storage;
pub mod terminal;
pub mod utils;

pub use controller::ProductListController;
pub use error::{TrackerError, TrackerResult};
