pub mod acs;
pub mod annotate;
pub mod config;
pub mod fetch;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod tracts;
