//! Orchestration layer for package publishing
//!
//! This module drives a publish run over an ordered set of package
//! directories.

pub mod sequential_publisher;

pub use sequential_publisher::{
    PublishOptions, PublishReport, ReportedError, SequentialPublisher, StepReport,
};
