pub mod klines;
pub mod ticker;
