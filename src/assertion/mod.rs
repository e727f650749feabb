//! 断言引擎
//!
//! 所有断言经由 [`Assert`] 句柄调用；句柄从运行上下文解析出
//! "当前在执行的测试"的结果记录。断言从不向调用方抛出控制流
//! 错误，失败只体现在记录上，第一次失败获胜。

pub mod assert;

pub use assert::Assert;
