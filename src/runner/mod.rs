pub mod auditor;
pub mod context;
pub mod executor;
pub mod types;

// Re-export commonly used types
pub use auditor::{AuditSummary, TestAuditor};
pub use context::{RecordHandle, RunContext};
pub use executor::TestExecutor;
pub use types::{ResultRecord, TestOutcome};
