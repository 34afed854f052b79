//! Contract Engine for staffing and subcontracting contracts
//!
//! This crate derives overtime and under-time unit rates from a monthly price
//! and an hour band, resolves Japanese payment terms ("月末締め翌月末",
//! "60日サイト") into concrete due dates, and assembles the figures that get
//! written into invoices, purchase orders and quotes.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
