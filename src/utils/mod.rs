pub mod error;
pub mod logger;
pub mod timefmt;
pub mod validation;
