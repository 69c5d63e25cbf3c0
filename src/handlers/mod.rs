pub mod api;
pub mod board;
