#[cfg(feature = "cli")]
pub mod cli;
pub mod salon;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use salon::SalonConfig;
