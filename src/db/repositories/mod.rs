pub mod audit;
pub mod catalog;
pub mod org;
pub mod request;
pub mod user;
