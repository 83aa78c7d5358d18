pub mod browser;
pub mod filter;
pub mod handlers;
pub mod pagination;
pub mod queries;
