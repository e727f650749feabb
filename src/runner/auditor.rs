use std::rc::Rc;

use crate::logger::{DebugLevel, Logger};
use crate::runner::types::{ResultRecord, TestOutcome};

/// 审计汇总
#[derive(Debug, Clone, PartialEq)]
pub struct AuditSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub undefined: usize,
    pub pass_rate: f64,
}

impl AuditSummary {
    /// 从结果集合聚合；总数为零时通过率定义为 0.0
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let total = records.len();
        let passed = records
            .iter()
            .filter(|r| r.outcome == TestOutcome::Pass)
            .count();
        let failed = records
            .iter()
            .filter(|r| r.outcome == TestOutcome::Fail)
            .count();
        let undefined = records
            .iter()
            .filter(|r| r.outcome == TestOutcome::Undefined)
            .count();
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64
        };

        Self {
            total,
            passed,
            failed,
            undefined,
            pass_rate,
        }
    }
}

/// 结果审计器
///
/// 对结果记录只读；汇总和明细都经由日志协作者输出。
pub struct TestAuditor {
    logger: Rc<dyn Logger>,
}

impl TestAuditor {
    pub fn new(logger: Rc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// 聚合结果并输出汇总与逐条明细
    pub fn audit(&self, records: &[ResultRecord]) -> AuditSummary {
        self.logger.log(DebugLevel::Default, "Begin Auditing Results ...");

        let summary = AuditSummary::from_records(records);
        self.log_summary(&summary);
        self.log_details(records);

        summary
    }

    fn log_summary(&self, summary: &AuditSummary) {
        self.logger.log(DebugLevel::Test, "Test Summary:");
        self.logger
            .log(DebugLevel::Test, &format!("  Total Tests: {}", summary.total));
        self.logger
            .log(DebugLevel::Test, &format!("  Passed: {}", summary.passed));
        self.logger
            .log(DebugLevel::Test, &format!("  Failed: {}", summary.failed));
        self.logger
            .log(DebugLevel::Test, &format!("  Undefined: {}", summary.undefined));
        self.logger.log(
            DebugLevel::Test,
            &format!("  Pass Rate: {:.2}%", summary.pass_rate * 100.0),
        );
    }

    fn log_details(&self, records: &[ResultRecord]) {
        self.logger.log(DebugLevel::Test, "Detailed Results:");
        for record in records {
            self.logger.log(
                DebugLevel::Test,
                &format!(
                    "  {}.{}, Result: {}, Duration: {}ms",
                    record.container_name,
                    record.name,
                    record.outcome,
                    record.duration().num_milliseconds()
                ),
            );
            if record.outcome == TestOutcome::Fail
                && let Some(message) = &record.message
            {
                self.logger.log(DebugLevel::Test, &format!("    {message}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLogger;

    fn record(name: &str, outcome: TestOutcome, message: Option<&str>) -> ResultRecord {
        let mut record = ResultRecord::new("Suite", name);
        record.outcome = outcome;
        record.message = message.map(String::from);
        record
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            record("a", TestOutcome::Pass, None),
            record("b", TestOutcome::Fail, Some("boom")),
            record("c", TestOutcome::Undefined, None),
            record("d", TestOutcome::Pass, None),
        ];

        let summary = AuditSummary::from_records(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.undefined, 1);
        assert!((summary.pass_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_records_do_not_divide_by_zero() {
        let summary = AuditSummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.pass_rate, 0.0);
    }

    #[test]
    fn test_audit_emits_summary_and_details() {
        let logger = Rc::new(MemoryLogger::new());
        let auditor = TestAuditor::new(logger.clone());

        let records = vec![
            record("passes", TestOutcome::Pass, None),
            record("fails", TestOutcome::Fail, Some("Condition is not true")),
        ];
        auditor.audit(&records);

        let lines = logger.messages_at(DebugLevel::Test);
        assert!(lines.iter().any(|l| l.contains("Total Tests: 2")));
        assert!(lines.iter().any(|l| l.contains("Suite.passes, Result: Pass")));
        assert!(lines.iter().any(|l| l.contains("Suite.fails, Result: Fail")));
        // 失败明细额外携带消息行
        assert!(lines.iter().any(|l| l.trim() == "Condition is not true"));
    }

    #[test]
    fn test_audit_is_read_only() {
        let logger = Rc::new(MemoryLogger::new());
        let auditor = TestAuditor::new(logger);

        let records = vec![record("a", TestOutcome::Pass, None)];
        let before = records[0].clone();
        auditor.audit(&records);

        assert_eq!(records[0].outcome, before.outcome);
        assert_eq!(records[0].message, before.message);
    }
}
