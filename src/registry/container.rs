use std::cell::RefCell;
use std::rc::Rc;

use crate::assertion::Assert;
use crate::runner::context::{RecordHandle, RunContext};
use crate::runner::types::ResultRecord;

type InitHook = Box<dyn Fn(&RunContext)>;
type PlainHook = Box<dyn Fn()>;

/// 一个已绑定的、可调用的测试
///
/// 身份是 (容器名, 测试名)；绑定完成后不可变。
pub struct TestUnit {
    name: String,
    body: Box<dyn Fn(&Assert<'_>)>,
}

impl TestUnit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn invoke(&self, assert: &Assert<'_>) {
        (self.body)(assert);
    }
}

/// 一个已绑定的测试容器
///
/// 容器状态在绑定时构造一次，被容器内所有钩子和测试共享；
/// 四个生命周期钩子都是可选的，缺省为 no-op。每个测试的结果记录
/// 同样在绑定时预创建，初始结论 NotRun。
pub struct ContainerBinding {
    name: String,
    init: InitHook,
    cleanup: PlainHook,
    setup: PlainHook,
    teardown: PlainHook,
    tests: Vec<TestUnit>,
    records: Vec<RecordHandle>,
}

impl ContainerBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 绑定的测试，保持注册顺序
    pub fn tests(&self) -> &[TestUnit] {
        &self.tests
    }

    /// 预创建的结果记录，与测试一一对应
    pub fn records(&self) -> &[RecordHandle] {
        &self.records
    }

    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    pub fn has_tests(&self) -> bool {
        !self.tests.is_empty()
    }

    /// 按测试名查找预绑定的结果记录
    pub(crate) fn record_for(&self, test_name: &str) -> Option<RecordHandle> {
        self.records
            .iter()
            .find(|record| record.borrow().name == test_name)
            .cloned()
    }

    pub(crate) fn initialize(&self, ctx: &RunContext) {
        (self.init)(ctx);
    }

    pub(crate) fn clean_up(&self) {
        (self.cleanup)();
    }

    pub(crate) fn set_up(&self) {
        (self.setup)();
    }

    pub(crate) fn tear_down(&self) {
        (self.teardown)();
    }
}

/// 容器注册构建器
///
/// 用进程初始化时的显式注册取代运行时反射：容器状态类型 S 在
/// new 时构造一次，钩子与测试围绕它声明，build 时擦除类型得到
/// ContainerBinding。重复声明同一个钩子时后一次生效。
pub struct ContainerBuilder<S: 'static> {
    name: String,
    state: Rc<RefCell<S>>,
    init: Option<InitHook>,
    cleanup: Option<PlainHook>,
    setup: Option<PlainHook>,
    teardown: Option<PlainHook>,
    tests: Vec<TestUnit>,
}

impl<S: 'static> ContainerBuilder<S> {
    pub fn new(name: &str, state: S) -> Self {
        Self {
            name: name.to_string(),
            state: Rc::new(RefCell::new(state)),
            init: None,
            cleanup: None,
            setup: None,
            teardown: None,
            tests: Vec::new(),
        }
    }

    /// 容器级初始化钩子，整个容器执行前调用一次
    pub fn on_init(mut self, hook: impl Fn(&mut S, &RunContext) + 'static) -> Self {
        let state = Rc::clone(&self.state);
        self.init = Some(Box::new(move |ctx| hook(&mut state.borrow_mut(), ctx)));
        self
    }

    /// 容器级清理钩子，所有测试跑完后调用一次
    pub fn on_cleanup(mut self, hook: impl Fn(&mut S) + 'static) -> Self {
        let state = Rc::clone(&self.state);
        self.cleanup = Some(Box::new(move || hook(&mut state.borrow_mut())));
        self
    }

    /// 每个测试执行前的 setup 钩子
    pub fn setup(mut self, hook: impl Fn(&mut S) + 'static) -> Self {
        let state = Rc::clone(&self.state);
        self.setup = Some(Box::new(move || hook(&mut state.borrow_mut())));
        self
    }

    /// 每个测试执行后的 teardown 钩子
    pub fn teardown(mut self, hook: impl Fn(&mut S) + 'static) -> Self {
        let state = Rc::clone(&self.state);
        self.teardown = Some(Box::new(move || hook(&mut state.borrow_mut())));
        self
    }

    /// 注册一个测试
    pub fn test(mut self, name: &str, body: impl Fn(&mut S, &Assert<'_>) + 'static) -> Self {
        let state = Rc::clone(&self.state);
        self.tests.push(TestUnit {
            name: name.to_string(),
            body: Box::new(move |assert| body(&mut state.borrow_mut(), assert)),
        });
        self
    }

    /// 声明但跳过一个测试：不绑定、不产生结果记录
    pub fn skipped_test(self, name: &str, _body: impl Fn(&mut S, &Assert<'_>) + 'static) -> Self {
        tracing::debug!(container = %self.name, test = name, "skipping test");
        self
    }

    /// 完成绑定
    pub fn build(self) -> ContainerBinding {
        let records = self
            .tests
            .iter()
            .map(|test| {
                Rc::new(RefCell::new(ResultRecord::new(&self.name, test.name()))) as RecordHandle
            })
            .collect();

        ContainerBinding {
            name: self.name,
            init: self.init.unwrap_or_else(|| Box::new(|_| {})),
            cleanup: self.cleanup.unwrap_or_else(|| Box::new(|| {})),
            setup: self.setup.unwrap_or_else(|| Box::new(|| {})),
            teardown: self.teardown.unwrap_or_else(|| Box::new(|| {})),
            tests: self.tests,
            records,
        }
    }
}
