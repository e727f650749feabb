use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// 项目描述文件扩展名
pub const DESCRIPTOR_EXT: &str = "testproj";

/// 缺省目标平台
const DEFAULT_PLATFORM: &str = "any";
/// 缺省产物路径模式
const DEFAULT_ARTIFACT: &str = "target/{platform}/{assembly}.unit";

/// 描述文件错误
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Failed to read descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse descriptor {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 描述文件的原始字段；三个字段都可缺省
#[derive(Debug, Clone, Default, Deserialize)]
struct DescriptorFile {
    assembly: Option<String>,
    platform: Option<String>,
    artifact: Option<String>,
}

/// 解析后的项目描述
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDescriptor {
    /// 程序集名
    pub assembly_name: String,

    /// 目标平台标识
    pub target_platform: String,

    /// 解析后的产物路径
    pub artifact_path: PathBuf,
}

impl ProjectDescriptor {
    /// 从描述文件解析项目信息
    ///
    /// 缺省规则：assembly 取描述文件名主干，platform 取 "any"，
    /// artifact 模式里的 {assembly}/{platform} 替换后拼在项目目录下。
    pub fn parse(descriptor_path: &Path, project_dir: &Path) -> Result<Self, DescriptorError> {
        let content = fs::read_to_string(descriptor_path).map_err(|source| DescriptorError::Io {
            path: descriptor_path.to_path_buf(),
            source,
        })?;
        let raw: DescriptorFile =
            toml::from_str(&content).map_err(|source| DescriptorError::Parse {
                path: descriptor_path.to_path_buf(),
                source,
            })?;

        let stem = descriptor_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let assembly_name = raw.assembly.unwrap_or(stem);
        let target_platform = raw.platform.unwrap_or_else(|| DEFAULT_PLATFORM.to_string());
        let pattern = raw.artifact.unwrap_or_else(|| DEFAULT_ARTIFACT.to_string());

        let relative = pattern
            .replace("{assembly}", &assembly_name)
            .replace("{platform}", &target_platform);
        let artifact_path = if relative.is_empty() {
            PathBuf::new()
        } else {
            project_dir.join(relative)
        };

        Ok(Self {
            assembly_name,
            target_platform,
            artifact_path,
        })
    }

    /// 三个字段全部非空才是有效候选
    pub fn is_valid(&self) -> bool {
        !self.assembly_name.is_empty()
            && !self.target_platform.is_empty()
            && !self.artifact_path.as_os_str().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_descriptor(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_with_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(
            dir.path(),
            "math.testproj",
            r#"
assembly = "math_suite"
platform = "x86_64"
artifact = "build/{assembly}.module"
"#,
        );

        let info = ProjectDescriptor::parse(&path, dir.path()).unwrap();
        assert_eq!(info.assembly_name, "math_suite");
        assert_eq!(info.target_platform, "x86_64");
        assert_eq!(info.artifact_path, dir.path().join("build/math_suite.module"));
        assert!(info.is_valid());
    }

    #[test]
    fn test_parse_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(dir.path(), "math.testproj", "");

        let info = ProjectDescriptor::parse(&path, dir.path()).unwrap();
        assert_eq!(info.assembly_name, "math");
        assert_eq!(info.target_platform, "any");
        assert_eq!(info.artifact_path, dir.path().join("target/any/math.unit"));
        assert!(info.is_valid());
    }

    #[test]
    fn test_empty_assembly_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(dir.path(), "math.testproj", r#"assembly = """#);

        let info = ProjectDescriptor::parse(&path, dir.path()).unwrap();
        assert!(!info.is_valid());
    }

    #[test]
    fn test_empty_artifact_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(dir.path(), "math.testproj", r#"artifact = """#);

        let info = ProjectDescriptor::parse(&path, dir.path()).unwrap();
        assert!(!info.is_valid());
    }

    #[test]
    fn test_unparseable_descriptor_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(dir.path(), "math.testproj", "assembly = [broken");

        let result = ProjectDescriptor::parse(&path, dir.path());
        assert!(matches!(result, Err(DescriptorError::Parse { .. })));
    }

    #[test]
    fn test_missing_descriptor_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProjectDescriptor::parse(&dir.path().join("gone.testproj"), dir.path());
        assert!(matches!(result, Err(DescriptorError::Io { .. })));
    }
}
