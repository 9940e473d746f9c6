//! Domain types for the MatriXpert image-query service.
//!
//! Everything here is transport-agnostic: acquired and cropped rasters,
//! the explicit per-user [`session::SessionContext`], the append-only
//! [`history::HistoryLog`], and the rules for choosing which image a query
//! is sent against.

pub mod error;
pub mod history;
pub mod naming;
pub mod panels;
pub mod raster;
pub mod selection;
pub mod session;
pub mod types;
