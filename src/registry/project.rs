use std::path::PathBuf;

use crate::registry::container::ContainerBinding;
use crate::registry::descriptor::ProjectDescriptor;

/// 一个测试项目与其绑定出的容器
///
/// 身份是产物路径；容器保持声明顺序。
pub struct ProjectBinding {
    /// 程序集名
    pub assembly_name: String,

    /// 目标平台标识
    pub target_platform: String,

    /// 编译产物路径
    pub artifact_path: PathBuf,

    /// 绑定出的容器
    pub containers: Vec<ContainerBinding>,
}

impl ProjectBinding {
    pub fn from_descriptor(descriptor: ProjectDescriptor) -> Self {
        Self {
            assembly_name: descriptor.assembly_name,
            target_platform: descriptor.target_platform,
            artifact_path: descriptor.artifact_path,
            containers: Vec::new(),
        }
    }

    /// 程序集名、产物路径、目标平台全部非空才有效
    pub fn is_valid(&self) -> bool {
        !self.assembly_name.is_empty()
            && !self.target_platform.is_empty()
            && !self.artifact_path.as_os_str().is_empty()
    }

    /// 至少一个容器拥有至少一个测试
    pub fn has_tests(&self) -> bool {
        self.containers.iter().any(ContainerBinding::has_tests)
    }

    pub fn add_container(&mut self, container: ContainerBinding) {
        self.containers.push(container);
    }
}
