pub mod token;

pub use token::{TokenError, issue, verify};
