pub mod core;
pub mod orchestration;
pub mod security;
pub mod telemetry;
pub mod validation;

pub use self::core::*;
pub use orchestration::{
    PublishOptions, PublishReport, ReportedError, SequentialPublisher, StepReport,
};
pub use security::{CommandError, SafeCommandExecutor};
