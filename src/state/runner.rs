use std::fmt;

use crate::state::machine::{InvalidTransition, StateMachine};

/// 测试运行器的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// 空闲，尚未就绪
    Idle,
    /// 配置已加载，可以开始运行
    Ready,
    /// 正在发现测试
    Discovery,
    /// 正在执行测试
    Running,
    /// 正在审计结果
    Auditing,
    /// 全部阶段完成
    Complete,
    /// 遇到错误
    Error,
    /// 正在退出
    Exit,
}

impl RunnerState {
    /// 转换为字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Ready => "Ready",
            Self::Discovery => "Discovery",
            Self::Running => "Running",
            Self::Auditing => "Auditing",
            Self::Complete => "Complete",
            Self::Error => "Error",
            Self::Exit => "Exit",
        }
    }
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 合法迁移表
///
/// 固定线性路径 Idle -> Ready -> Discovery -> Running -> Auditing ->
/// Complete -> Exit。Discovery -> Exit 是发现失败时唯一的提前出口，
/// 除此之外不允许跳过任何状态。
pub fn can_transition(from: RunnerState, to: RunnerState) -> bool {
    use RunnerState::*;

    matches!(
        (from, to),
        (Idle, Ready)
            | (Ready, Discovery)
            | (Discovery, Running)
            | (Running, Auditing)
            | (Auditing, Complete)
            | (Complete, Exit)
            | (Discovery, Exit)
    )
}

/// 当前状态在线性路径上的唯一后继；没有声明后继的状态返回 Error
pub fn next_state(current: RunnerState) -> RunnerState {
    use RunnerState::*;

    match current {
        Idle => Ready,
        Ready => Discovery,
        Discovery => Running,
        Running => Auditing,
        Auditing => Complete,
        Complete => Exit,
        Error | Exit => Error,
    }
}

/// 固定了六态线性协议的运行器状态机
pub struct RunnerStateMachine {
    inner: StateMachine<RunnerState>,
}

impl RunnerStateMachine {
    pub fn new() -> Self {
        Self {
            inner: StateMachine::new(RunnerState::Idle, can_transition),
        }
    }

    pub fn current(&self) -> RunnerState {
        self.inner.current()
    }

    /// 线性路径上的下一个状态
    pub fn next_state(&self) -> RunnerState {
        next_state(self.inner.current())
    }

    pub fn transition_to(
        &mut self,
        next: RunnerState,
    ) -> Result<(), InvalidTransition<RunnerState>> {
        self.inner.transition_to(next)
    }

    /// 注册迁移完成钩子
    pub fn on_after_transition(&mut self, hook: impl FnMut(RunnerState) + 'static) {
        self.inner.on_after_transition(hook);
    }
}

impl Default for RunnerStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
