//! Core types for MYBN.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod business;
pub mod id;
pub mod lenient;
pub mod listing;
pub mod mobile;
pub mod otp;
pub mod user;

pub use business::{Banner, Business, BusinessCategory, BusinessStats, Category, Location};
pub use id::*;
pub use listing::{ALL_CATEGORIES, FilterState, ListingPage};
pub use mobile::{MobileNumber, MobileNumberError};
pub use otp::{OtpCode, OtpCodeError};
pub use user::{AuthType, ParseAuthTypeError, User};
