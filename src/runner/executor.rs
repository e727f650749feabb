use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::assertion::Assert;
use crate::logger::{DebugLevel, Logger};
use crate::observer::ResultSubject;
use crate::registry::container::{ContainerBinding, TestUnit};
use crate::registry::project::ProjectBinding;
use crate::runner::context::RunContext;
use crate::runner::types::{ResultRecord, TestOutcome};

/// 测试执行器
///
/// 按容器声明顺序、容器内按注册顺序，每个测试恰好运行一次。
/// 故障围堵边界是单个测试：setup 或测试体的 panic 记为 Fail，
/// teardown 照常执行，时间戳照常闭合，然后继续下一个测试。
pub struct TestExecutor {
    logger: Rc<dyn Logger>,
}

impl TestExecutor {
    pub fn new(logger: Rc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// 运行全部项目并返回拍平的结果集合
    pub fn execute(
        &self,
        projects: &[ProjectBinding],
        subject: &ResultSubject,
    ) -> crate::Result<Vec<ResultRecord>> {
        self.logger.log(DebugLevel::Default, "Begin Test Execution ...");

        let mut ctx = RunContext::new();
        for project in projects {
            for container in &project.containers {
                self.run_container(container, &mut ctx, subject);
            }
        }

        self.logger.log(DebugLevel::Default, "... Test Execution Complete");

        Ok(projects
            .iter()
            .flat_map(|project| &project.containers)
            .flat_map(|container| container.records())
            .map(|record| record.borrow().clone())
            .collect())
    }

    fn run_container(
        &self,
        container: &ContainerBinding,
        ctx: &mut RunContext,
        subject: &ResultSubject,
    ) {
        ctx.enter_container(container);

        // 初始化失败时放弃整个容器：测试保持 NotRun，清理钩子不执行
        if let Err(message) = contain(|| container.initialize(ctx)) {
            self.logger.log(
                DebugLevel::Error,
                &format!("Container {} initialization failed: {message}", container.name()),
            );
            ctx.leave_container();
            return;
        }

        for unit in container.tests() {
            self.run_test(container, ctx, unit, subject);
        }

        if let Err(message) = contain(|| container.clean_up()) {
            self.logger.log(
                DebugLevel::Warning,
                &format!("Container {} cleanup failed: {message}", container.name()),
            );
        }

        ctx.leave_container();
    }

    fn run_test(
        &self,
        container: &ContainerBinding,
        ctx: &mut RunContext,
        unit: &TestUnit,
        subject: &ResultSubject,
    ) {
        let Some(record) = container.record_for(unit.name()) else {
            self.logger.log(
                DebugLevel::Warning,
                &format!("Test {} not found in {}.", unit.name(), container.name()),
            );
            return;
        };

        ctx.set_current_test(unit.name());
        record.borrow_mut().start_test();

        let shared_ctx: &RunContext = ctx;
        let body = contain(|| {
            container.set_up();
            let assert = Assert::new(shared_ctx);
            unit.invoke(&assert);
        });

        {
            let mut record = record.borrow_mut();
            match body {
                Ok(()) => {
                    if !record.interrupted {
                        record.outcome = TestOutcome::Pass;
                    }
                }
                Err(message) => {
                    // 故障之前已有断言落账的，第一次失败获胜
                    if !record.interrupted {
                        record.outcome = TestOutcome::Fail;
                        record.message = Some(message);
                    }
                }
            }
        }

        if let Err(message) = contain(|| container.tear_down()) {
            self.logger.log(
                DebugLevel::Warning,
                &format!(
                    "Teardown for {} in {} failed: {message}",
                    unit.name(),
                    container.name()
                ),
            );
        }

        record.borrow_mut().end_test();
        ctx.clear_current_test();

        let finished = record.borrow();
        self.logger.log(
            DebugLevel::Default,
            &format!(
                "Test {} in {} {}.",
                finished.name, finished.container_name, finished.outcome
            ),
        );
        subject.notify(&finished);
    }
}

/// 围堵一次调用产生的 panic，失败时给出可读消息
fn contain(op: impl FnOnce()) -> Result<(), String> {
    panic::catch_unwind(AssertUnwindSafe(op)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    use crate::logger::MemoryLogger;
    use crate::registry::container::ContainerBuilder;
    use crate::registry::descriptor::ProjectDescriptor;

    fn project_with(containers: Vec<ContainerBinding>) -> ProjectBinding {
        let mut project = ProjectBinding::from_descriptor(ProjectDescriptor {
            assembly_name: "suite".to_string(),
            target_platform: "any".to_string(),
            artifact_path: PathBuf::from("/tmp/suite.unit"),
        });
        for container in containers {
            project.add_container(container);
        }
        project
    }

    fn executor() -> (TestExecutor, Rc<MemoryLogger>) {
        let logger = Rc::new(MemoryLogger::new());
        (TestExecutor::new(logger.clone()), logger)
    }

    #[test]
    fn test_lifecycle_hook_order() {
        let calls: Rc<RefCell<Vec<String>>> = Rc::default();
        let trace = |label: &str| {
            let calls = Rc::clone(&calls);
            let label = label.to_string();
            move |_: &mut ()| calls.borrow_mut().push(label.clone())
        };

        let container = ContainerBuilder::new("Lifecycle", ())
            .on_init({
                let calls = Rc::clone(&calls);
                move |_, _| calls.borrow_mut().push("init".to_string())
            })
            .on_cleanup(trace("cleanup"))
            .setup(trace("setup"))
            .teardown(trace("teardown"))
            .test("one", {
                let calls = Rc::clone(&calls);
                move |_, _| calls.borrow_mut().push("one".to_string())
            })
            .test("two", {
                let calls = Rc::clone(&calls);
                move |_, _| calls.borrow_mut().push("two".to_string())
            })
            .build();

        let (executor, _) = executor();
        executor.execute(&[project_with(vec![container])], &ResultSubject::new()).unwrap();

        assert_eq!(
            *calls.borrow(),
            vec!["init", "setup", "one", "teardown", "setup", "two", "teardown", "cleanup"]
        );
    }

    #[test]
    fn test_panicking_body_is_contained() {
        let container = ContainerBuilder::new("Faulty", ())
            .test("explodes", |_, _| panic!("kaboom"))
            .test("still_runs", |_, assert| assert.is_true(true))
            .build();

        let (executor, _) = executor();
        let results = executor.execute(&[project_with(vec![container])], &ResultSubject::new()).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].outcome, TestOutcome::Fail);
        assert_eq!(results[0].message.as_deref(), Some("kaboom"));
        assert_eq!(results[1].outcome, TestOutcome::Pass);
    }

    #[test]
    fn test_teardown_runs_after_a_fault() {
        let torn_down: Rc<RefCell<u32>> = Rc::default();

        let container = ContainerBuilder::new("Faulty", ())
            .teardown({
                let torn_down = Rc::clone(&torn_down);
                move |_| *torn_down.borrow_mut() += 1
            })
            .test("explodes", |_, _| panic!("kaboom"))
            .build();

        let (executor, _) = executor();
        let results = executor.execute(&[project_with(vec![container])], &ResultSubject::new()).unwrap();

        assert_eq!(*torn_down.borrow(), 1);
        // 时间戳照常闭合
        assert!(results[0].start_time.is_some());
        assert!(results[0].end_time.is_some());
    }

    #[test]
    fn test_fault_does_not_overwrite_an_interrupted_record() {
        let container = ContainerBuilder::new("Faulty", ())
            .test("fails_then_explodes", |_, assert| {
                assert.is_true(false);
                panic!("kaboom");
            })
            .build();

        let (executor, _) = executor();
        let results = executor.execute(&[project_with(vec![container])], &ResultSubject::new()).unwrap();

        assert_eq!(results[0].outcome, TestOutcome::Fail);
        assert_eq!(results[0].message.as_deref(), Some("Condition is not true"));
    }

    #[test]
    fn test_init_fault_abandons_the_container() {
        let cleaned: Rc<RefCell<u32>> = Rc::default();

        let container = ContainerBuilder::new("Broken", ())
            .on_init(|_, _| panic!("no database"))
            .on_cleanup({
                let cleaned = Rc::clone(&cleaned);
                move |_| *cleaned.borrow_mut() += 1
            })
            .test("never_runs", |_, assert| assert.is_true(true))
            .build();

        let (executor, logger) = executor();
        let results = executor.execute(&[project_with(vec![container])], &ResultSubject::new()).unwrap();

        // 测试仍出现在结果集中，结论 NotRun；清理钩子被跳过
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, TestOutcome::NotRun);
        assert_eq!(*cleaned.borrow(), 0);
        assert!(
            logger
                .messages_at(DebugLevel::Error)
                .iter()
                .any(|m| m.contains("initialization failed"))
        );
    }

    #[test]
    fn test_setup_fault_is_a_test_failure() {
        let container = ContainerBuilder::new("Fragile", ())
            .setup(|_: &mut ()| panic!("setup broke"))
            .test("victim", |_, assert| assert.is_true(true))
            .build();

        let (executor, _) = executor();
        let results = executor.execute(&[project_with(vec![container])], &ResultSubject::new()).unwrap();

        assert_eq!(results[0].outcome, TestOutcome::Fail);
        assert_eq!(results[0].message.as_deref(), Some("setup broke"));
    }

    #[test]
    fn test_teardown_fault_keeps_the_outcome() {
        let container = ContainerBuilder::new("Fragile", ())
            .teardown(|_: &mut ()| panic!("teardown broke"))
            .test("survivor", |_, assert| assert.is_true(true))
            .build();

        let (executor, logger) = executor();
        let results = executor.execute(&[project_with(vec![container])], &ResultSubject::new()).unwrap();

        assert_eq!(results[0].outcome, TestOutcome::Pass);
        assert!(
            logger
                .messages_at(DebugLevel::Warning)
                .iter()
                .any(|m| m.contains("Teardown"))
        );
    }

    #[test]
    fn test_state_is_shared_across_tests_in_a_container() {
        let container = ContainerBuilder::new("Counter", 0u32)
            .test("bumps", |count, _| *count += 1)
            .test("sees_the_bump", |count, assert| assert.are_equal(&1, count))
            .build();

        let (executor, _) = executor();
        let results = executor.execute(&[project_with(vec![container])], &ResultSubject::new()).unwrap();

        assert_eq!(results[1].outcome, TestOutcome::Pass);
    }

    #[test]
    fn test_body_keeps_running_after_a_failed_assertion() {
        let reached_end: Rc<RefCell<bool>> = Rc::default();

        let container = ContainerBuilder::new("Flow", ())
            .test("keeps_going", {
                let reached_end = Rc::clone(&reached_end);
                move |_, assert| {
                    assert.is_true(false);
                    assert.is_true(true);
                    *reached_end.borrow_mut() = true;
                }
            })
            .build();

        let (executor, _) = executor();
        let results = executor.execute(&[project_with(vec![container])], &ResultSubject::new()).unwrap();

        assert!(*reached_end.borrow());
        assert_eq!(results[0].outcome, TestOutcome::Fail);
    }
}
