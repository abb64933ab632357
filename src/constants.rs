//! Constants used throughout the application
//!
//! This module centralizes magic values so restore behavior and entity
//! defaults stay consistent between the service, repositories, and tests.

// Restore password fallback
/// Plaintext hashed in place of an archived password that fails the
/// length sanity check. Restored accounts stay loginable with this.
pub const FALLBACK_PASSWORD: &str = "password123";
/// bcrypt cost used for the fallback hash.
pub const FALLBACK_HASH_COST: u32 = 10;
/// Anything shorter than this cannot be a real bcrypt hash.
pub const MIN_PASSWORD_HASH_LENGTH: usize = 20;

// Entity defaults
pub const DEFAULT_DATE_FORMAT: &str = "DD/MM/YYYY";
pub const DEFAULT_ITEMS_PER_PAGE: i32 = 10;
pub const DEFAULT_COST_PERCENT: f64 = 70.0;
pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_CATEGORY_COLOR: &str = "primary";

// Report placeholder for archives without a timestamp
pub const UNKNOWN_TIMESTAMP: &str = "Unknown";
