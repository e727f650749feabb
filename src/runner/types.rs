use std::fmt;

use chrono::{DateTime, Local};

/// 单个测试的结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    /// 测试通过
    Pass,
    /// 测试失败
    Fail,
    /// 结论未定义（测试主动放弃）
    Undefined,
    /// 尚未执行
    NotRun,
}

impl TestOutcome {
    /// 转换为字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
            Self::Undefined => "Undefined",
            Self::NotRun => "NotRun",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一次运行中单个测试的结果记录
///
/// 绑定阶段创建，初始结论 NotRun；只在该测试自己的执行窗口内被修改，
/// 审计阶段只读。一次运行一份，不跨运行复用。
#[derive(Debug, Clone)]
pub struct ResultRecord {
    /// 测试名
    pub name: String,

    /// 所属容器名
    pub container_name: String,

    /// 结论
    pub outcome: TestOutcome,

    /// 失败或放弃时的消息
    pub message: Option<String>,

    /// 开始时间
    pub start_time: Option<DateTime<Local>>,

    /// 结束时间
    pub end_time: Option<DateTime<Local>>,

    /// 一旦置位，本测试内后续断言全部失效
    pub interrupted: bool,
}

impl ResultRecord {
    pub fn new(container_name: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            container_name: container_name.to_string(),
            outcome: TestOutcome::NotRun,
            message: None,
            start_time: None,
            end_time: None,
            interrupted: false,
        }
    }

    /// 记录测试开始时间
    pub fn start_test(&mut self) {
        self.start_time = Some(Local::now());
    }

    /// 记录测试结束时间
    pub fn end_test(&mut self) {
        self.end_time = Some(Local::now());
    }

    /// 执行耗时；时间戳不完整时为零
    pub fn duration(&self) -> chrono::Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end - start,
            _ => chrono::Duration::zero(),
        }
    }

    /// 以失败结论中断记录
    pub(crate) fn mark_failed(&mut self, message: String) {
        self.outcome = TestOutcome::Fail;
        self.message = Some(message);
        self.interrupted = true;
    }

    /// 以未定义结论中断记录
    pub(crate) fn mark_undefined(&mut self, message: String) {
        self.outcome = TestOutcome::Undefined;
        self.message = Some(message);
        self.interrupted = true;
    }
}
