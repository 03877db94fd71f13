//! Linkage traversal core: document typing, wire shapes, fetching,
//! aggregation and expansion state.
//!
//! Everything except [`client`] is plain data logic with no DOM
//! dependency, so it compiles and unit-tests on the host toolchain.

pub mod aggregate;
pub mod client;
pub mod doctype;
pub mod error;
pub mod escape;
pub mod expand;
pub mod model;
pub mod records;
