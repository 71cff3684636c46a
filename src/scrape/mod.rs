pub mod export;
pub mod session;
pub mod source;
