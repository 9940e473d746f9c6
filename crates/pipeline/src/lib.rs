//! The Session Query Pipeline and image acquisition.
//!
//! [`query::run_query`] selects the image(s) to submit from a
//! [`SessionContext`](matrixpert_core::session::SessionContext), encodes them,
//! calls the multimodal model, and appends to the session's history only when
//! every call succeeded. [`acquisition`] turns uploads and URLs into working
//! images.

pub mod acquisition;
pub mod error;
pub mod query;
