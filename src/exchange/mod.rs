//! Exchange gateways: the `Exchange` trait and its implementations

pub mod binance_spot;
pub mod paper;
pub mod traits;
