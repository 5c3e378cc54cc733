//! # Exynos RIL Library
//!
//! Vendor radio-interface adapter for Samsung Exynos modems.
//!
//! This library provides the pieces a generic telephony stack needs to talk
//! to Exynos firmware: vendor request layouts, vendor response decoding and
//! routing of the private unsolicited event range.

pub mod config;
pub mod error;
pub mod registrant;
pub mod ril;
pub mod transport;
