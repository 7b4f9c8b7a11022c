//! 文件配置源
//!
//! 在搜索路径与用户主目录中定位文件，支持 `.properties` 属性文件以及
//! JSON/YAML/TOML 格式的配置对象文件

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use smart_default::SmartDefault;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{ConfError, Result};
use super::properties_parser::PropertiesParser;
use super::value::PropertyMap;

/// 文件定位器的配置
#[derive(Debug, Clone, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct ResourceLocatorConfig {
    /// 配置文件所在目录，按顺序查找
    #[default(vec![".".to_string()])]
    pub search_paths: Vec<String>,

    /// 是否在用户主目录中查找
    #[default = true]
    pub search_home: bool,
}

/// 文件定位器
///
/// 查找顺序：绝对路径本身、各搜索目录、用户主目录
///
/// # 示例
/// ```no_run
/// use easyconf::cfg::{ResourceLocator, ResourceLocatorConfig};
///
/// let locator = ResourceLocator::new(ResourceLocatorConfig {
///     search_paths: vec!["config".to_string()],
///     search_home: false,
/// });
///
/// // 查找 config/demo.properties
/// let path = locator.locate("demo.properties");
/// ```
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    search_paths: Vec<PathBuf>,
}

impl ResourceLocator {
    pub fn new(config: ResourceLocatorConfig) -> Self {
        let mut search_paths: Vec<PathBuf> =
            config.search_paths.into_iter().map(PathBuf::from).collect();
        if config.search_home {
            if let Some(home) = dirs::home_dir() {
                search_paths.push(home);
            }
        }
        Self { search_paths }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// 查找存在的文件
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        self.search_paths
            .iter()
            .map(|dir| dir.join(name))
            .find(|path| path.is_file())
    }

    /// 依次尝试各扩展名，返回第一个存在的文件及其扩展名
    pub fn locate_with_extensions(
        &self,
        base_name: &str,
        extensions: &[&'static str],
    ) -> Option<(PathBuf, &'static str)> {
        extensions.iter().find_map(|ext| {
            self.locate(&format!("{}.{}", base_name, ext))
                .map(|path| (path, *ext))
        })
    }
}

impl Default for ResourceLocator {
    fn default() -> Self {
        Self::new(ResourceLocatorConfig::default())
    }
}

impl From<ResourceLocatorConfig> for ResourceLocator {
    fn from(config: ResourceLocatorConfig) -> Self {
        Self::new(config)
    }
}

/// 已定位的 `.properties` 文件来源
pub struct FileSource {
    path: PathBuf,
    parser: Arc<PropertiesParser>,
}

impl FileSource {
    pub fn new(path: PathBuf, parser: Arc<PropertiesParser>) -> Self {
        Self { path, parser }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<PropertyMap> {
        let content = std::fs::read_to_string(&self.path)?;
        self.parser.parse(&self.path.to_string_lossy(), &content)
    }
}

/// 根据扩展名解析结构化配置
pub fn parse_structured(content: &str, ext: &str, source_name: &str) -> Result<JsonValue> {
    let parse_error = |message: String| ConfError::Parse {
        source_name: source_name.to_string(),
        message,
    };
    match ext {
        "json" => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
        "toml" => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
        _ => Err(parse_error(format!("unsupported file format: {}", ext))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::value::PropertyValue;
    use std::fs;
    use tempfile::TempDir;

    fn locator_for(dir: &TempDir) -> ResourceLocator {
        ResourceLocator::new(ResourceLocatorConfig {
            search_paths: vec![dir.path().to_string_lossy().to_string()],
            search_home: false,
        })
    }

    #[test]
    fn test_locate_in_search_path() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("demo.properties"), "k=v").unwrap();

        let locator = locator_for(&temp_dir);
        assert_eq!(
            locator.locate("demo.properties"),
            Some(temp_dir.path().join("demo.properties"))
        );
        assert_eq!(locator.locate("missing.properties"), None);
    }

    #[test]
    fn test_locate_absolute_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("abs.properties");
        fs::write(&path, "k=v").unwrap();

        let locator = ResourceLocator::new(ResourceLocatorConfig {
            search_paths: vec![],
            search_home: false,
        });
        assert_eq!(locator.locate(&path.to_string_lossy()), Some(path));
    }

    #[test]
    fn test_locate_first_search_path_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(second.path().join("a.properties"), "k=second").unwrap();
        fs::write(first.path().join("a.properties"), "k=first").unwrap();

        let locator = ResourceLocator::new(ResourceLocatorConfig {
            search_paths: vec![
                first.path().to_string_lossy().to_string(),
                second.path().to_string_lossy().to_string(),
            ],
            search_home: false,
        });
        assert_eq!(locator.locate("a.properties"), Some(first.path().join("a.properties")));
    }

    #[test]
    fn test_locate_with_extensions() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("demo.yaml"), "host: localhost").unwrap();

        let locator = locator_for(&temp_dir);
        let (path, ext) = locator
            .locate_with_extensions("demo", &["json", "yaml", "toml"])
            .unwrap();
        assert_eq!(ext, "yaml");
        assert_eq!(path, temp_dir.path().join("demo.yaml"));
    }

    #[test]
    fn test_file_source_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("demo.properties");
        fs::write(&path, "host=localhost\nport=3306").unwrap();

        let source = FileSource::new(path, Arc::new(PropertiesParser::default()));
        let map = source.load().unwrap();
        assert_eq!(map.get("host"), Some(&PropertyValue::from("localhost")));
        assert_eq!(map.get("port"), Some(&PropertyValue::from("3306")));
    }

    #[test]
    fn test_parse_structured() -> Result<()> {
        let json = parse_structured(r#"{"host": "localhost", "port": 3306}"#, "json", "t.json")?;
        assert_eq!(json["port"], 3306);

        let yaml = parse_structured("host: localhost\nport: 3306\n", "yaml", "t.yaml")?;
        assert_eq!(yaml["host"], "localhost");

        let toml = parse_structured("host = \"localhost\"\nport = 3306\n", "toml", "t.toml")?;
        assert_eq!(toml["port"], 3306);

        assert!(parse_structured("x", "ini", "t.ini").is_err());
        Ok(())
    }
}
