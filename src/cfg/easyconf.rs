//! 组件配置注册表
//!
//! 按 (companyId, componentName) 缓存组件配置，直到显式刷新。
//! 注册表是一个普通对象，由调用方创建并传递，不依赖隐藏的全局状态。

use dashmap::DashMap;
use garde::Validate;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::path::Path;
use std::sync::{Arc, RwLock};

use super::class_registry::ClassRegistry;
use super::component::ComponentConfiguration;
use super::conventions::GLOBAL_CONFIGURATION_FILE;
use super::datasource_source::DatasourceRegistry;
use super::error::{ConfError, Result};
use super::file_source::{parse_structured, ResourceLocator, ResourceLocatorConfig};
use super::jndi_source::NamingContext;
use super::loader::ConfigurationLoader;
use super::properties_parser::PropertiesParser;
use super::resolver::SourceResolver;
use super::serializer::{serializer_by_name, ConfigurationSerializer, JsonSerializer};
use super::system::SystemProperties;

/// EasyConf 配置
#[derive(Debug, Clone, Deserialize, Serialize, SmartDefault, Validate)]
#[serde(default)]
pub struct EasyConfConfig {
    /// 配置文件搜索目录，按顺序查找
    #[default(vec![".".to_string()])]
    #[garde(skip)]
    pub search_paths: Vec<String>,

    /// 是否在用户主目录中查找
    #[default = true]
    #[garde(skip)]
    pub search_home: bool,

    /// 是否以环境变量初始化系统属性
    #[default = true]
    #[garde(skip)]
    pub load_env: bool,

    /// 是否加载 `<name>-<companyId>.properties` 形式的公司专属文件
    #[default = false]
    #[garde(skip)]
    pub company_specific_files: bool,

    /// 全局配置是否优先于组件基础配置
    #[default = false]
    #[garde(skip)]
    pub global_overrides_base: bool,

    /// 属性不存在时是否返回错误
    #[default = true]
    #[garde(skip)]
    pub throw_on_missing: bool,

    /// 全局配置文件名（不含扩展名）
    #[default(GLOBAL_CONFIGURATION_FILE.to_string())]
    #[garde(length(min = 1))]
    pub global_file_name: String,

    /// 配置对象的序列化格式: "json" / "yaml"
    #[default = "json"]
    #[garde(pattern("^(json|yaml|yml)$"))]
    pub serializer: String,
}

impl EasyConfConfig {
    /// 从 JSON/YAML/TOML 文件读取配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;
        let value = parse_structured(&content, ext, &path.to_string_lossy())?;
        let config: EasyConfConfig =
            serde_json::from_value(value).map_err(|e| ConfError::Parse {
                source_name: path.to_string_lossy().to_string(),
                message: e.to_string(),
            })?;
        config
            .validate()
            .map_err(|e| ConfError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }
}

/// 组件配置注册表
///
/// # 示例
/// ```no_run
/// use easyconf::cfg::{EasyConf, EasyConfConfig, Filter};
///
/// let easyconf = EasyConf::new(EasyConfConfig {
///     search_paths: vec!["config".to_string()],
///     ..Default::default()
/// })
/// .unwrap();
///
/// let props = easyconf.get_configuration("demo").get_properties().unwrap();
/// let timeout = props.get_i32("timeout", &Filter::by(["env", "prod"])).unwrap();
///
/// // 配置文件修改后丢弃缓存，下次访问重新加载
/// easyconf.refresh_component("demo");
/// ```
pub struct EasyConf {
    config: Arc<EasyConfConfig>,
    system: Arc<SystemProperties>,
    locator: ResourceLocator,
    datasources: Arc<DatasourceRegistry>,
    classes: Arc<ClassRegistry>,
    naming: RwLock<Option<Arc<dyn NamingContext>>>,
    serializer: RwLock<Arc<dyn ConfigurationSerializer>>,
    cache: DashMap<(Option<String>, String), Arc<ComponentConfiguration>>,
}

impl EasyConf {
    pub fn new(config: EasyConfConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ConfError::InvalidConfig(e.to_string()))?;

        let system = if config.load_env {
            SystemProperties::from_env()
        } else {
            SystemProperties::new()
        };
        let locator = ResourceLocator::new(ResourceLocatorConfig {
            search_paths: config.search_paths.clone(),
            search_home: config.search_home,
        });
        let serializer: Arc<dyn ConfigurationSerializer> = match serializer_by_name(&config.serializer) {
            Some(serializer) => Arc::from(serializer),
            None => Arc::new(JsonSerializer),
        };

        Ok(Self {
            config: Arc::new(config),
            system: Arc::new(system),
            locator,
            datasources: Arc::new(DatasourceRegistry::new()),
            classes: Arc::new(ClassRegistry::new()),
            naming: RwLock::new(None),
            serializer: RwLock::new(serializer),
            cache: DashMap::new(),
        })
    }

    pub fn config(&self) -> &EasyConfConfig {
        &self.config
    }

    pub fn system_properties(&self) -> &Arc<SystemProperties> {
        &self.system
    }

    pub fn class_registry(&self) -> &Arc<ClassRegistry> {
        &self.classes
    }

    pub fn datasources(&self) -> &Arc<DatasourceRegistry> {
        &self.datasources
    }

    /// 设置 `jndi:` 来源使用的命名服务，对之后创建的组件配置生效
    pub fn set_naming_context(&self, context: Arc<dyn NamingContext>) {
        if let Ok(mut naming) = self.naming.write() {
            *naming = Some(context);
        }
    }

    /// 替换配置对象序列化器，对之后创建的组件配置生效
    pub fn set_serializer(&self, serializer: Arc<dyn ConfigurationSerializer>) {
        if let Ok(mut current) = self.serializer.write() {
            *current = serializer;
        }
    }

    pub fn get_configuration(&self, component_name: &str) -> Arc<ComponentConfiguration> {
        self.lookup(None, component_name)
    }

    pub fn get_company_configuration(
        &self,
        company_id: &str,
        component_name: &str,
    ) -> Arc<ComponentConfiguration> {
        self.lookup(Some(company_id), component_name)
    }

    fn lookup(&self, company_id: Option<&str>, component_name: &str) -> Arc<ComponentConfiguration> {
        let key = (company_id.map(str::to_string), component_name.to_string());
        if let Some(conf) = self.cache.get(&key) {
            return conf.value().clone();
        }

        let conf = Arc::new(ComponentConfiguration::new(
            company_id,
            component_name,
            Arc::new(self.loader()),
        ));
        self.cache.entry(key).or_insert(conf).value().clone()
    }

    fn loader(&self) -> ConfigurationLoader {
        let naming = self.naming.read().ok().and_then(|naming| naming.clone());
        let serializer = match self.serializer.read() {
            Ok(serializer) => serializer.clone(),
            Err(_) => Arc::new(JsonSerializer),
        };
        let resolver = SourceResolver::new(self.locator.clone(), PropertiesParser::default())
            .with_datasources(self.datasources.clone())
            .with_classes(self.classes.clone())
            .with_naming_context(naming);
        ConfigurationLoader::new(self.config.clone(), self.system.clone(), resolver, serializer)
    }

    /// 丢弃组件在所有公司下的缓存
    pub fn refresh_component(&self, component_name: &str) {
        self.cache.retain(|(_, name), _| name != component_name);
        log::info!("refreshed configuration of component {}", component_name);
    }

    pub fn refresh_company_component(&self, company_id: &str, component_name: &str) {
        self.cache
            .remove(&(Some(company_id.to_string()), component_name.to_string()));
        log::info!(
            "refreshed configuration of component {} for company {}",
            component_name,
            company_id
        );
    }

    pub fn refresh_all(&self) {
        self.cache.clear();
        log::info!("refreshed all component configurations");
    }

    /// 已缓存的组件配置数量
    pub fn cached_components(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for EasyConf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EasyConf")
            .field("config", &self.config)
            .field("cached_components", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn easyconf(dir: &TempDir) -> EasyConf {
        EasyConf::new(EasyConfConfig {
            search_paths: vec![dir.path().to_string_lossy().to_string()],
            search_home: false,
            load_env: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = EasyConfConfig::default();
        assert_eq!(config.search_paths, vec!["."]);
        assert!(config.throw_on_missing);
        assert!(!config.global_overrides_base);
        assert_eq!(config.global_file_name, "global-configuration");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = EasyConfConfig {
            serializer: "xml".to_string(),
            ..Default::default()
        };
        assert!(matches!(EasyConf::new(config), Err(ConfError::InvalidConfig(_))));

        let config = EasyConfConfig {
            global_file_name: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("easyconf.yaml");
        fs::write(&path, "search_paths: [conf]\nthrow_on_missing: false\n").unwrap();

        let config = EasyConfConfig::from_file(&path).unwrap();
        assert_eq!(config.search_paths, vec!["conf"]);
        assert!(!config.throw_on_missing);
        assert!(config.search_home);

        let path = temp_dir.path().join("easyconf.toml");
        fs::write(&path, "serializer = \"xml\"\n").unwrap();
        assert!(matches!(
            EasyConfConfig::from_file(&path),
            Err(ConfError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_cache_and_refresh() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("demo.properties"), "k=v").unwrap();
        let easyconf = easyconf(&temp_dir);

        let first = easyconf.get_configuration("demo");
        assert!(Arc::ptr_eq(&first, &easyconf.get_configuration("demo")));

        let company = easyconf.get_company_configuration("acme", "demo");
        assert!(!Arc::ptr_eq(&first, &company));
        assert_eq!(company.company_id(), Some("acme"));
        assert_eq!(easyconf.cached_components(), 2);

        easyconf.refresh_component("demo");
        assert_eq!(easyconf.cached_components(), 0);
        assert!(!Arc::ptr_eq(&first, &easyconf.get_configuration("demo")));

        easyconf.get_company_configuration("acme", "demo");
        easyconf.refresh_company_component("acme", "demo");
        assert_eq!(easyconf.cached_components(), 1);

        easyconf.refresh_all();
        assert_eq!(easyconf.cached_components(), 0);
    }
}
