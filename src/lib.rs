//! Gamma-ray light-curve loading, quality selection and plotting.
//!
//! The [`data`] layer reads FermiPy light-curve tables and tracks the original
//! table next to a filtered view. [`config`] describes a plot in YAML,
//! [`render`] turns it into a figure, and [`cache`] memoizes work on file
//! content.

pub mod cache;
pub mod color;
pub mod config;
pub mod data;
pub mod render;
