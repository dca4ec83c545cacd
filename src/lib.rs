//! Indian income tax estimation and transaction audit scoring.
//!
//! [`core::compute_tax`] and [`core::analyze`] are the entry points; the
//! `fintax` binary wraps them for files on disk.

pub mod core;
