pub mod core;

pub use crate::core::config::InstallerConfig;
pub use crate::core::error::{InstallerError, InstallerResult};
pub use crate::core::progress::{CancelToken, ProgressEvent, ProgressReporter};
pub use crate::core::workflow::{InstallReport, InstallWorkflow};
