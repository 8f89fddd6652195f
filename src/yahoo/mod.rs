//! Yahoo Finance client for daily closing prices
//! No API key needed for the public chart endpoint.

mod client;
mod types;

pub use client::{ClientConfig, YahooClient};
pub use types::*;
