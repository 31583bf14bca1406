//! HTTP clients for stock data providers

pub mod indian_stock;

pub use indian_stock::IndianStockClient;
