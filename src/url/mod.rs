//! URL handling module for linkscour
//!
//! This module provides fragment manipulation, relative reference
//! resolution, and the exclusion filter applied to discovered links.

mod filter;
mod fragment;

pub use filter::LinkFilter;
pub use fragment::{resolve_href, split_fragment, strip_fragment};
