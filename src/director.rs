use std::rc::Rc;

use crate::config::{ConfigLoader, RunnerConfig};
use crate::logger::{DebugLevel, Logger};
use crate::observer::{AssertionObserver, ObserverId, ResultSubject};
use crate::registry::detector::TestDetector;
use crate::registry::module::ModuleRegistry;
use crate::registry::project::ProjectBinding;
use crate::runner::auditor::{AuditSummary, TestAuditor};
use crate::runner::executor::TestExecutor;
use crate::runner::types::ResultRecord;
use crate::state::runner::{RunnerState, RunnerStateMachine};

/// 测试运行的总指挥
///
/// 唯一驱动状态机的组件。发现、执行、审计三个子系统互不直接调用，
/// 全部由它在状态变更时按固定顺序触发；一次运行就是一次把状态机
/// 推到 Exit 的事务。
pub struct TestDirector {
    machine: RunnerStateMachine,
    logger: Rc<dyn Logger>,
    registry: ModuleRegistry,
    detector: Option<TestDetector>,
    executor: TestExecutor,
    auditor: TestAuditor,
    subject: ResultSubject,
    projects: Vec<ProjectBinding>,
    results: Vec<ResultRecord>,
    summary: Option<AuditSummary>,
}

impl TestDirector {
    /// 从缺省位置加载配置
    ///
    /// 加载失败时停留在 Idle，`run` 会拒绝执行，Ready 永远不会到达。
    pub fn new(logger: Rc<dyn Logger>, registry: ModuleRegistry) -> Self {
        let config = ConfigLoader::find_and_load();
        Self::with_loaded(logger, registry, config)
    }

    /// 用外部已加载好的配置构造
    pub fn with_config(
        logger: Rc<dyn Logger>,
        registry: ModuleRegistry,
        config: RunnerConfig,
    ) -> Self {
        Self::with_loaded(logger, registry, Some(config))
    }

    fn with_loaded(
        logger: Rc<dyn Logger>,
        registry: ModuleRegistry,
        config: Option<RunnerConfig>,
    ) -> Self {
        let mut machine = RunnerStateMachine::new();
        {
            let logger = Rc::clone(&logger);
            machine.on_after_transition(move |state| {
                logger.log(DebugLevel::Default, &format!("State transitioned to {state}"));
            });
        }

        let detector =
            config.map(|config| TestDetector::new(Rc::clone(&logger), config));

        let mut director = Self {
            machine,
            executor: TestExecutor::new(Rc::clone(&logger)),
            auditor: TestAuditor::new(Rc::clone(&logger)),
            logger,
            registry,
            detector,
            subject: ResultSubject::new(),
            projects: Vec::new(),
            results: Vec::new(),
            summary: None,
        };

        if director.detector.is_none() {
            director
                .logger
                .log(DebugLevel::Error, "Invalid configuration file.");
            return director;
        }

        director.change_state(RunnerState::Ready);
        director
    }

    /// 是否就绪：配置已加载且尚未开跑
    pub fn is_ready(&self) -> bool {
        self.machine.current() == RunnerState::Ready
    }

    /// 本次运行是否结束
    pub fn is_done(&self) -> bool {
        self.machine.current() == RunnerState::Exit
    }

    pub fn current_state(&self) -> RunnerState {
        self.machine.current()
    }

    /// 订阅每个完成的测试结果
    pub fn subscribe(&mut self, observer: Rc<dyn AssertionObserver>) -> ObserverId {
        self.subject.subscribe(observer)
    }

    /// 退订
    pub fn unsubscribe(&mut self, id: ObserverId) {
        self.subject.unsubscribe(id);
    }

    /// 审计汇总，进入 Complete 之后可用
    pub fn summary(&self) -> Option<&AuditSummary> {
        self.summary.as_ref()
    }

    /// 本次运行的全部结果记录
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// 驱动状态机直到 Exit
    ///
    /// 每一步都向状态机请求唯一后继；第一次非法迁移记录日志并中止，
    /// 不重试也不跳步。
    pub fn run(&mut self) {
        if !self.is_ready() {
            self.logger
                .log(DebugLevel::Error, "TestDirector is not ready to run.");
            return;
        }

        while !self.is_done() {
            let next = self.machine.next_state();
            if !self.change_state(next) {
                break;
            }
        }
    }

    /// 迁移状态；失败记录日志并返回 false
    fn change_state(&mut self, next: RunnerState) -> bool {
        if let Err(err) = self.machine.transition_to(next) {
            self.logger.log(DebugLevel::Error, &err.to_string());
            return false;
        }

        self.on_state_changed(next);
        true
    }

    /// 状态进入后的领域动作
    fn on_state_changed(&mut self, state: RunnerState) {
        match state {
            RunnerState::Ready => {
                self.logger
                    .log(DebugLevel::Default, "TestDirector is ready to run.");
            }
            RunnerState::Discovery => self.discover_tests(),
            RunnerState::Running => self.execute_tests(),
            RunnerState::Complete => self.audit_results(),
            RunnerState::Exit => self.logger.shutdown(),
            _ => {}
        }
    }

    /// 发现阶段：没有任何项目产出测试时直接退出
    fn discover_tests(&mut self) {
        let Some(detector) = &self.detector else {
            return;
        };

        self.projects = detector.discover(&self.registry);
        if self.projects.is_empty() {
            self.logger.log(DebugLevel::Error, "Test discovery failed.");
            self.change_state(RunnerState::Exit);
        }
    }

    /// 执行阶段：收集拍平的结果集合
    fn execute_tests(&mut self) {
        match self.executor.execute(&self.projects, &self.subject) {
            Ok(results) => self.results = results,
            Err(err) => self.logger.log(DebugLevel::Error, &err.to_string()),
        }
    }

    /// 审计阶段
    fn audit_results(&mut self) {
        self.summary = Some(self.auditor.audit(&self.results));
    }
}
