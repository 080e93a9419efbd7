#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic scoping types for accident records.
//!
//! Accidents are located by French department code. Metropolitan
//! departments use purely numeric codes while Corsica (`2A`, `2B`) and some
//! overseas territories use alphanumeric ones.

pub mod departments;
