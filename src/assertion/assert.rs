use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};

use crate::runner::context::{RecordHandle, RunContext};
use crate::runner::types::TestOutcome;

/// 绑定到当前执行位置的断言句柄
///
/// 每次断言调用都重新解析一次当前记录。记录一旦被中断，后续断言
/// 不再求值条件，也不再改写已有的结论和消息。
pub struct Assert<'a> {
    ctx: &'a RunContext,
}

impl<'a> Assert<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self { ctx }
    }

    /// 解析当前测试的记录
    ///
    /// 没有测试在执行说明引擎被错误使用，这里必须硬性失败，
    /// 不允许静默吞掉。
    fn active(&self) -> RecordHandle {
        match self.ctx.active_record() {
            Some(record) => record,
            None => panic!("assertion invoked while no test is executing"),
        }
    }

    /// 协议核心：查中断位 -> 求值 -> 落账
    fn check(&self, condition: impl FnOnce() -> bool, message: impl FnOnce() -> String) {
        let record = self.active();
        if record.borrow().interrupted {
            return;
        }

        let passed = condition();
        let mut record = record.borrow_mut();
        if passed {
            record.outcome = TestOutcome::Pass;
        } else {
            record.mark_failed(message());
        }
    }

    /// 断言条件为真
    pub fn is_true(&self, condition: bool) {
        self.check(|| condition, || "Condition is not true".to_string());
    }

    /// 断言条件为假
    pub fn is_false(&self, condition: bool) {
        self.check(|| !condition, || "Condition is not false".to_string());
    }

    /// 断言值存在
    pub fn is_some<T>(&self, value: &Option<T>) {
        self.check(|| value.is_some(), || "Value is None".to_string());
    }

    /// 断言值不存在
    pub fn is_none<T>(&self, value: &Option<T>) {
        self.check(|| value.is_none(), || "Value is not None".to_string());
    }

    /// 值相等断言；序列按长度和顺序逐元素比较
    pub fn are_equal<T: PartialEq + Debug>(&self, expected: &T, actual: &T) {
        self.check(
            || expected == actual,
            || format!("Expected {expected:?}, got {actual:?}"),
        );
    }

    /// 值不相等断言
    pub fn are_not_equal<T: PartialEq + Debug>(&self, not_expected: &T, actual: &T) {
        self.check(
            || not_expected != actual,
            || format!("Did not expect {not_expected:?}"),
        );
    }

    /// 同一性断言：两个引用指向同一个对象
    pub fn are_same<T: ?Sized>(&self, expected: &T, actual: &T) {
        self.check(
            || std::ptr::eq(expected, actual),
            || "References point to different objects".to_string(),
        );
    }

    /// 非同一性断言
    pub fn are_not_same<T: ?Sized>(&self, not_expected: &T, actual: &T) {
        self.check(
            || !std::ptr::eq(not_expected, actual),
            || "References point to the same object".to_string(),
        );
    }

    /// 断言序列为空
    pub fn is_empty<T>(&self, sequence: &[T]) {
        self.check(
            || sequence.is_empty(),
            || format!("Sequence has {} elements", sequence.len()),
        );
    }

    /// 断言序列非空
    pub fn is_not_empty<T>(&self, sequence: &[T]) {
        self.check(|| !sequence.is_empty(), || "Sequence is empty".to_string());
    }

    /// 成员断言：item 在序列中
    pub fn contains<T: PartialEq + Debug>(&self, sequence: &[T], item: &T) {
        self.check(
            || sequence.contains(item),
            || format!("Sequence does not contain {item:?}"),
        );
    }

    /// 断言结果为 Ok
    pub fn is_ok<T: Debug, E: Debug>(&self, result: &Result<T, E>) {
        self.check(|| result.is_ok(), || format!("Expected Ok, got {result:?}"));
    }

    /// 断言结果为 Err
    pub fn is_err<T: Debug, E: Debug>(&self, result: &Result<T, E>) {
        self.check(|| result.is_err(), || format!("Expected Err, got {result:?}"));
    }

    /// 断言闭包会 panic
    ///
    /// 中断检查在闭包执行之前，已中断的记录上闭包不会被执行。
    pub fn panics(&self, op: impl FnOnce()) {
        let record = self.active();
        if record.borrow().interrupted {
            return;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(op));
        let mut record = record.borrow_mut();
        match outcome {
            Err(_) => record.outcome = TestOutcome::Pass,
            Ok(()) => record.mark_failed("Expected the operation to panic".to_string()),
        }
    }

    /// 无条件失败
    pub fn fail(&self, message: &str) {
        let record = self.active();
        let mut record = record.borrow_mut();
        if record.interrupted {
            return;
        }
        record.mark_failed(message.to_string());
    }

    /// 标记当前测试尚未实现，结论为 Undefined
    pub fn not_implemented(&self) {
        let record = self.active();
        let mut record = record.borrow_mut();
        if record.interrupted {
            return;
        }
        record.mark_undefined("Not implemented".to_string());
    }
}
