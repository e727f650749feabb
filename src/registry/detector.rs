use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::RunnerConfig;
use crate::logger::{DebugLevel, Logger};
use crate::registry::descriptor::{DESCRIPTOR_EXT, ProjectDescriptor};
use crate::registry::module::ModuleRegistry;
use crate::registry::project::ProjectBinding;

/// 测试发现器
///
/// 扫描每个搜索根目录的直接子目录，解析项目描述文件，校验产物并
/// 从注册表绑定容器。单个项目的失败只影响它自己，发现过程继续。
pub struct TestDetector {
    logger: Rc<dyn Logger>,
    config: RunnerConfig,
}

impl TestDetector {
    pub fn new(logger: Rc<dyn Logger>, config: RunnerConfig) -> Self {
        Self { logger, config }
    }

    /// 发现所有拥有测试的项目；结果为空表示发现失败
    pub fn discover(&self, registry: &ModuleRegistry) -> Vec<ProjectBinding> {
        self.logger.log(DebugLevel::Default, "Begin Test Discovery ...");

        let mut projects = Vec::new();
        for root in &self.config.test_paths {
            for (descriptor_path, project_dir) in self.candidate_descriptors(root) {
                let info = match ProjectDescriptor::parse(&descriptor_path, &project_dir) {
                    Ok(info) => info,
                    Err(err) => {
                        self.logger.log(
                            DebugLevel::Error,
                            &format!(
                                "Error loading project information for {}: {err}",
                                descriptor_path.display()
                            ),
                        );
                        continue;
                    }
                };
                if !info.is_valid() {
                    continue;
                }

                if let Some(project) = self.bind_project(info, registry)
                    && project.has_tests()
                {
                    projects.push(project);
                }
            }
        }

        projects
    }

    /// 每个子目录取第一个描述文件；目录和文件都排序保证确定性
    fn candidate_descriptors(&self, root: &Path) -> Vec<(PathBuf, PathBuf)> {
        let Ok(entries) = fs::read_dir(root) else {
            return Vec::new();
        };

        let mut dirs: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        let mut found = Vec::new();
        for dir in dirs {
            let Ok(files) = fs::read_dir(&dir) else {
                continue;
            };
            let mut descriptors: Vec<PathBuf> = files
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| {
                    path.extension()
                        .map(|ext| ext == DESCRIPTOR_EXT)
                        .unwrap_or(false)
                })
                .collect();
            descriptors.sort();

            if let Some(path) = descriptors.into_iter().next() {
                found.push((path, dir));
            }
        }

        found
    }

    /// 校验产物、查询注册表并绑定容器；失败只影响本项目
    fn bind_project(
        &self,
        info: ProjectDescriptor,
        registry: &ModuleRegistry,
    ) -> Option<ProjectBinding> {
        if !info.artifact_path.exists() {
            self.logger.log(
                DebugLevel::Error,
                &format!(
                    "Missing artifact {} for {}",
                    info.artifact_path.display(),
                    info.assembly_name
                ),
            );
            return None;
        }

        let Some(containers) = registry.bind(&info.assembly_name) else {
            self.logger.log(
                DebugLevel::Error,
                &format!("No containers registered for assembly {}", info.assembly_name),
            );
            return None;
        };

        let mut project = ProjectBinding::from_descriptor(info);
        if !containers.is_empty() {
            self.logger.log(
                DebugLevel::Default,
                &format!(
                    "Found {} test containers in {}",
                    containers.len(),
                    project.assembly_name
                ),
            );
        }
        for container in containers {
            self.logger
                .log(DebugLevel::Default, &format!("TestContainer: {}", container.name()));
            project.add_container(container);
        }

        Some(project)
    }
}
