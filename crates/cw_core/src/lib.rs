pub mod domain;
pub mod error;
pub mod ingest;
pub mod report;
pub mod validate;
