//! Balance inquiry: client and dashboard state

pub mod board;
pub mod client;

pub use board::{BalanceBoard, BalanceTable, BalanceView};
pub use client::{BalanceSource, HttpBalanceClient, StaticBalance};
