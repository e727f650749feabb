use std::fmt;

/// 迁移验证器：回答 from -> to 是否合法
pub type TransitionValidator<S> = fn(S, S) -> bool;

/// 非法状态迁移
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot transition from {from:?} to {to:?}")]
pub struct InvalidTransition<S: fmt::Debug> {
    pub from: S,
    pub to: S,
}

/// 通用状态机
///
/// 只持有当前状态和一个可插拔的迁移验证器，不包含任何领域逻辑。
/// "迁移是否合法"由验证器回答；"迁移之后发生什么"交给两个可选钩子
/// 和调用方，两件事刻意分开，便于单独测试。
pub struct StateMachine<S> {
    current: S,
    validator: TransitionValidator<S>,
    after_transition: Option<Box<dyn FnMut(S)>>,
    state_changed: Option<Box<dyn FnMut(S)>>,
}

impl<S: Copy + PartialEq + fmt::Debug> StateMachine<S> {
    pub fn new(initial: S, validator: TransitionValidator<S>) -> Self {
        Self {
            current: initial,
            validator,
            after_transition: None,
            state_changed: None,
        }
    }

    /// 注册迁移完成钩子
    pub fn on_after_transition(&mut self, hook: impl FnMut(S) + 'static) {
        self.after_transition = Some(Box::new(hook));
    }

    /// 注册状态变更钩子
    pub fn on_state_changed(&mut self, hook: impl FnMut(S) + 'static) {
        self.state_changed = Some(Box::new(hook));
    }

    /// 当前状态
    pub fn current(&self) -> S {
        self.current
    }

    /// 迁移到新状态
    ///
    /// 验证器拒绝时返回 `InvalidTransition`，当前状态保持不变。
    /// 成功时依次触发迁移完成钩子和状态变更钩子，然后更新当前状态。
    pub fn transition_to(&mut self, next: S) -> Result<(), InvalidTransition<S>> {
        if !(self.validator)(self.current, next) {
            return Err(InvalidTransition {
                from: self.current,
                to: next,
            });
        }

        if let Some(hook) = self.after_transition.as_mut() {
            hook(next);
        }
        if let Some(hook) = self.state_changed.as_mut() {
            hook(next);
        }
        self.current = next;

        Ok(())
    }
}
