//! Client-credentials access tokens and the manager that keeps one fresh.

pub mod manager;
pub mod token;

pub use manager::*;
pub use token::*;
