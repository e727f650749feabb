use std::cell::{Cell, RefCell};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt as sub_fmt};

/// 日志级别
///
/// 按严重程度排序；Test 级别承载测试报告输出，永远不被过滤。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugLevel {
    Verbose,
    Default,
    Warning,
    Error,
    Fatal,
    Test,
}

impl DebugLevel {
    /// 转换为字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verbose => "VERBOSE",
            Self::Default => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Test => "TEST",
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 日志协作者接口
///
/// `shutdown` 由运行编排方在进入 Exit 状态时调用，且只调用一次。
pub trait Logger {
    fn log(&self, level: DebugLevel, message: &str);
    fn shutdown(&self);
}

/// 桥接到 tracing 的日志实现
///
/// 低于最低级别的消息被丢弃，Test 级别除外。
pub struct TraceLogger {
    min_level: DebugLevel,
}

impl TraceLogger {
    pub fn new(min_level: DebugLevel) -> Self {
        Self { min_level }
    }

    /// 按配置里的最低级别构造；缺省 Default
    pub fn from_config(config: &crate::config::RunnerConfig) -> Self {
        Self::new(config.min_log_level.unwrap_or(DebugLevel::Default))
    }
}

impl Default for TraceLogger {
    fn default() -> Self {
        Self::new(DebugLevel::Default)
    }
}

impl Logger for TraceLogger {
    fn log(&self, level: DebugLevel, message: &str) {
        if level < self.min_level && level != DebugLevel::Test {
            return;
        }

        match level {
            DebugLevel::Verbose => tracing::debug!("{message}"),
            DebugLevel::Default => tracing::info!("{message}"),
            DebugLevel::Warning => tracing::warn!("{message}"),
            DebugLevel::Error | DebugLevel::Fatal => tracing::error!("{message}"),
            DebugLevel::Test => tracing::info!(target: "rutest::report", "{message}"),
        }
    }

    fn shutdown(&self) {
        tracing::debug!("logger shutdown");
    }
}

/// 内存日志，测试时用来断言日志输出
#[derive(Default)]
pub struct MemoryLogger {
    entries: RefCell<Vec<(DebugLevel, String)>>,
    shut_down: Cell<bool>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录的全部条目
    pub fn entries(&self) -> Vec<(DebugLevel, String)> {
        self.entries.borrow().clone()
    }

    /// 指定级别下的全部消息
    pub fn messages_at(&self, level: DebugLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.get()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: DebugLevel, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }

    fn shutdown(&self) {
        self.shut_down.set(true);
    }
}

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别
/// 默认级别: info
///
/// 示例:
/// - RUST_LOG=debug cargo run
/// - RUST_LOG=trace cargo run
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    sub_fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::info!("Logger initialized");
}
