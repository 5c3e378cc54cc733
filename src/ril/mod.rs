//! # RIL Vendor Layer
//!
//! Exynos-specific layer of the radio interface protocol.
//!
//! This module handles:
//! - Parcel-style wire buffers (int32, string16, byte arrays)
//! - Request payloads whose layout depends on modem generation
//! - Card status, call list and network scan responses with vendor fields
//! - Classification and remapping of vendor-private unsolicited codes

pub mod protocol;
pub mod wire;
pub mod quirks;
pub mod base;
pub mod encoder;
pub mod decoder;
pub mod unsol;
pub mod adapter;
