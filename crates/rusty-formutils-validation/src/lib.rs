//! Rusty-Formutils-Validation Core
//!
//! Pure Rust predicates behind the built-in validation rules of
//! `rusty-formutils` (`email`, `url`, `alpha`, `min`, `oneof`, ...).
//! Compatible with both std and no_std environments.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod email;
pub mod numeric;
pub mod string;

// Re-export all predicates
pub use email::*;
pub use numeric::*;
pub use string::*;
