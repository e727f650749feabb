use std::collections::HashMap;

use crate::registry::container::ContainerBinding;

/// 容器工厂：每次调用产出一份全新的绑定
pub type ContainerFactory = Box<dyn Fn() -> ContainerBinding>;

/// 模块注册表
///
/// 用进程初始化时的显式注册取代对编译产物的运行时反射。
/// 程序集名是查找键；"加载模块"即取出该名下注册的全部容器工厂
/// 并逐一实例化。
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Vec<ContainerFactory>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在指定程序集名下注册一个容器
    pub fn register(&mut self, assembly: &str, factory: impl Fn() -> ContainerBinding + 'static) {
        self.modules
            .entry(assembly.to_string())
            .or_default()
            .push(Box::new(factory));
    }

    /// 程序集是否已注册
    pub fn is_registered(&self, assembly: &str) -> bool {
        self.modules.contains_key(assembly)
    }

    /// 为程序集绑定全部容器；未注册的程序集返回 None（加载失败）
    pub fn bind(&self, assembly: &str) -> Option<Vec<ContainerBinding>> {
        self.modules
            .get(assembly)
            .map(|factories| factories.iter().map(|factory| factory()).collect())
    }
}
