//! Ordering module
//!
//! This module contains the natural-order comparator and the record sorter.

mod natural;
mod sorter;

pub use natural::{natural_cmp, natural_less};
pub use sorter::sort_records;
