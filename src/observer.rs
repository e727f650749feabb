use std::rc::Rc;

use colored::Colorize;

use crate::runner::types::{ResultRecord, TestOutcome};

/// 订阅凭据，退订时使用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(usize);

/// 测试结果观察者：每个完成的结果收到一次回调
pub trait AssertionObserver {
    fn on_assertion(&self, record: &ResultRecord);
}

/// 观察者注册表
///
/// 通知是透传的，不做任何过滤。
#[derive(Default)]
pub struct ResultSubject {
    observers: Vec<(ObserverId, Rc<dyn AssertionObserver>)>,
    next_id: usize,
}

impl ResultSubject {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅测试结果
    pub fn subscribe(&mut self, observer: Rc<dyn AssertionObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// 退订
    pub fn unsubscribe(&mut self, id: ObserverId) {
        self.observers.retain(|(existing, _)| *existing != id);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// 通知所有观察者
    pub fn notify(&self, record: &ResultRecord) {
        for (_, observer) in &self.observers {
            observer.on_assertion(record);
        }
    }
}

/// 控制台观察者：每个完成的结果打印一行
#[derive(Default)]
pub struct ConsoleObserver;

impl AssertionObserver for ConsoleObserver {
    fn on_assertion(&self, record: &ResultRecord) {
        let symbol = match record.outcome {
            TestOutcome::Pass => "✓".green(),
            TestOutcome::Fail => "✗".red(),
            TestOutcome::Undefined => "?".yellow(),
            TestOutcome::NotRun => "⊘".dimmed(),
        };

        println!(
            " {} {}.{} ({}ms)",
            symbol,
            record.container_name.cyan(),
            record.name,
            record.duration().num_milliseconds()
        );

        if record.outcome == TestOutcome::Fail
            && let Some(message) = &record.message
        {
            println!("   {}", message.red());
        }
    }
}
