use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::logger::DebugLevel;

/// 测试运行器配置
///
/// 由外部加载器提供；`test_paths` 是测试项目的搜索根目录，
/// 为空时发现阶段视为没有任何候选项目。
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// 搜索根目录
    #[serde(default)]
    pub test_paths: Vec<PathBuf>,

    /// 最低日志级别（可选）
    #[serde(default)]
    pub min_log_level: Option<DebugLevel>,
}

/// 配置加载错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "runner-config.json";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<RunnerConfig, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: RunnerConfig = serde_json::from_str(&content)?;

        if config.test_paths.is_empty() {
            return Err(ConfigError::Invalid("test_paths is empty".to_string()));
        }

        Ok(config)
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录
    /// 2. 父目录递归查找
    /// 3. 用户配置目录 ~/.config/rutest/
    pub fn find_and_load() -> Option<RunnerConfig> {
        if let Some(config) = Self::try_load_from_current_dir() {
            return Some(config);
        }

        if let Some(config) = Self::try_load_from_user_dir() {
            return Some(config);
        }

        None
    }

    /// 尝试从当前目录及其父目录加载
    fn try_load_from_current_dir() -> Option<RunnerConfig> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Self::load_from_path(&config_path).ok();
            }

            // 尝试父目录
            if !current.pop() {
                break;
            }
        }

        None
    }

    /// 尝试从用户配置目录加载
    fn try_load_from_user_dir() -> Option<RunnerConfig> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("rutest").join(Self::CONFIG_FILE);

        if config_path.exists() {
            Self::load_from_path(&config_path).ok()
        } else {
            None
        }
    }
}
