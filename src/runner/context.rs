use std::cell::RefCell;
use std::rc::Rc;

use crate::registry::container::ContainerBinding;
use crate::runner::types::ResultRecord;

/// 共享的结果记录句柄
pub type RecordHandle = Rc<RefCell<ResultRecord>>;

/// 当前执行位置的单槽上下文
///
/// 测试体调用断言时不携带任何"我是哪个测试"的信息，断言引擎全靠
/// 这个上下文定位正在执行的测试的结果记录。执行子系统是唯一写者；
/// 单线程模型下同一时刻至多一个测试在执行，槽位因此无歧义。
#[derive(Default)]
pub struct RunContext {
    container_name: Option<String>,
    records: Vec<RecordHandle>,
    current_test: Option<String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进入一个容器：记住容器名并持有其全部记录句柄
    pub(crate) fn enter_container(&mut self, binding: &ContainerBinding) {
        self.container_name = Some(binding.name().to_string());
        self.records = binding.records().to_vec();
        self.current_test = None;
    }

    /// 离开当前容器
    pub(crate) fn leave_container(&mut self) {
        self.container_name = None;
        self.records.clear();
        self.current_test = None;
    }

    pub(crate) fn set_current_test(&mut self, name: &str) {
        self.current_test = Some(name.to_string());
    }

    pub(crate) fn clear_current_test(&mut self) {
        self.current_test = None;
    }

    /// 当前容器名
    pub fn container_name(&self) -> Option<&str> {
        self.container_name.as_deref()
    }

    /// 当前测试名
    pub fn current_test(&self) -> Option<&str> {
        self.current_test.as_deref()
    }

    /// 解析当前在执行的测试的结果记录
    ///
    /// 解析链：当前容器 -> 记录表 -> 当前测试名 -> 预绑定记录。
    /// 没有测试在执行时返回 None。
    pub fn active_record(&self) -> Option<RecordHandle> {
        let name = self.current_test.as_deref()?;
        self.records
            .iter()
            .find(|record| record.borrow().name == name)
            .cloned()
    }
}
