pub mod crypto;
pub mod jwt;
pub mod retry;
pub mod token;
