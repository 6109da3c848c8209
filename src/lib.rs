//! # bincookies
//!
//! Parser and JSON exporter for Safari's binary cookie store
//! (`Cookies.binarycookies`).
//!
//! Safari persists cookies in a proprietary multi-page binary container.
//! This crate decodes that container (offset tables, per-record bounds and
//! sentinel validation, and the file's first-byte-in-four checksum) and
//! streams the decoded cookies out as a single JSON document.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use bincookies::binarycookies::container::export_json;
//!
//! let data = std::fs::read("Cookies.binarycookies")?;
//! let mut out = Vec::new();
//! export_json(&data, &mut out)?;
//! println!("{}", String::from_utf8_lossy(&out));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error taxonomy shared across the crate
//! - [`binarycookies`] - Container, page, and cookie record decoding
//! - [`json`] - Streaming JSON emission
//!
//! ## Validation model
//!
//! Validation is strict and fail-fast: the first malformed page or record
//! aborts the whole parse, and the error names the page and cookie index
//! it was found at. Emission interleaves with validation, so a late
//! checksum or trailer failure leaves a partial document in the sink; pass
//! a `Vec<u8>` and flush on success if atomic output is required.

pub mod base;
pub mod binarycookies;
pub mod json;
