pub mod currency;
pub mod error;
pub mod timezone;

pub use error::{AppError, Result};
pub use timezone::{TimezoneResolver, TimezoneSource};
