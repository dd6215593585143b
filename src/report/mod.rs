//! Jurisdiction compliance reports: records in, paginated PDF out.
//!
//! `generator` validates the request and fetches data through an
//! [`ApplicationSource`]. `group` partitions the records according to the
//! jurisdiction's policy, and `layout` places them page by page using
//! strings from `format`. `pdf` serializes the finished pages.

pub mod error;
pub mod format;
pub mod generator;
pub mod group;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod policy;
pub mod source;

pub use error::ReportError;
pub use generator::{GeneratedReport, ReportGenerator, ReportRequest, ReportSettings};
pub use model::{ApplicationRecord, ApplicationStatus};
pub use policy::{JurisdictionPolicy, JURISDICTIONS};
pub use source::{ApplicationSource, MemoryApplicationSource, ReportQuery, StoredApplication};
