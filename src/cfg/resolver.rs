//! 来源标识解析
//!
//! 按前缀把来源标识解析为具体来源：
//! - `datasource:<name>`：数据源中的属性表
//! - `jndi:<prefix>`：命名服务中 prefix 下的绑定
//! - `class:<name>`：类注册表中的来源类型
//! - 其它：在搜索路径中查找的属性文件
//!
//! 找不到对应资源时返回 None，可选来源缺失是正常情况

use std::sync::Arc;

use super::class_registry::ClassRegistry;
use super::conventions::{CLASS_PREFIX, PROPERTIES_TABLE};
use super::datasource_source::{DatasourceRegistry, DatasourceSource, DatasourceUrl};
use super::file_source::{FileSource, ResourceLocator};
use super::jndi_source::{JndiSource, JndiUrl, NamingContext};
use super::properties_parser::PropertiesParser;
use super::source::Source;

#[derive(Clone)]
pub struct SourceResolver {
    locator: Arc<ResourceLocator>,
    parser: Arc<PropertiesParser>,
    datasources: Arc<DatasourceRegistry>,
    naming: Option<Arc<dyn NamingContext>>,
    classes: Arc<ClassRegistry>,
}

impl SourceResolver {
    pub fn new(locator: ResourceLocator, parser: PropertiesParser) -> Self {
        Self {
            locator: Arc::new(locator),
            parser: Arc::new(parser),
            datasources: Arc::new(DatasourceRegistry::new()),
            naming: None,
            classes: Arc::new(ClassRegistry::new()),
        }
    }

    pub fn with_datasources(mut self, datasources: Arc<DatasourceRegistry>) -> Self {
        self.datasources = datasources;
        self
    }

    pub fn with_naming_context(mut self, naming: Option<Arc<dyn NamingContext>>) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_classes(mut self, classes: Arc<ClassRegistry>) -> Self {
        self.classes = classes;
        self
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    pub fn datasources(&self) -> &DatasourceRegistry {
        &self.datasources
    }

    pub fn classes(&self) -> &Arc<ClassRegistry> {
        &self.classes
    }

    /// 解析来源标识
    ///
    /// # 参数
    /// - `identifier`: 来源标识
    /// - `company_id`: 公司标识，数据源来源用它构造行条件
    /// - `component_name`: 组件名称
    pub fn resolve(
        &self,
        identifier: &str,
        company_id: Option<&str>,
        component_name: &str,
    ) -> Option<Source> {
        let identifier = identifier.trim();
        if DatasourceUrl::is_datasource(identifier) {
            let url = DatasourceUrl::new(identifier, company_id, component_name, PROPERTIES_TABLE);
            let Some(backend) = self.datasources.lookup(url.datasource_name()) else {
                log::debug!("datasource source {} not found", identifier);
                return None;
            };
            return Some(Source::Datasource(DatasourceSource::new(url, backend)));
        }

        if JndiUrl::is_jndi(identifier) {
            let Some(context) = &self.naming else {
                log::debug!("no naming context configured, ignoring {}", identifier);
                return None;
            };
            return Some(Source::Jndi(JndiSource::new(
                JndiUrl::new(identifier),
                context.clone(),
            )));
        }

        if let Some(class_name) = identifier.strip_prefix(CLASS_PREFIX) {
            return match self.classes.create_source(class_name) {
                Some(source) => Some(Source::Class(source)),
                None if self.classes.is_registered(class_name) => {
                    log::warn!("class {} is not a property source", class_name);
                    None
                }
                None => {
                    log::warn!("class source {} is not registered", class_name);
                    None
                }
            };
        }

        match self.locator.locate(identifier) {
            Some(path) => Some(Source::File(FileSource::new(path, self.parser.clone()))),
            None => {
                log::debug!("configuration file {} not found", identifier);
                None
            }
        }
    }
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::new(ResourceLocator::default(), PropertiesParser::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::datasource_source::{Datasource, MemoryDatasource};
    use crate::cfg::file_source::ResourceLocatorConfig;
    use crate::cfg::jndi_source::MemoryNamingContext;
    use crate::cfg::source::PropertySource;
    use crate::cfg::value::PropertyMap;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct StaticSource;

    impl PropertySource for StaticSource {
        fn name(&self) -> String {
            "static".to_string()
        }

        fn load(&self) -> anyhow::Result<PropertyMap> {
            Ok(PropertyMap::new())
        }
    }

    fn resolver_for(dir: &TempDir) -> SourceResolver {
        SourceResolver::new(
            ResourceLocator::new(ResourceLocatorConfig {
                search_paths: vec![dir.path().to_string_lossy().to_string()],
                search_home: false,
            }),
            PropertiesParser::default(),
        )
    }

    #[test]
    fn test_resolve_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("demo.properties"), "k=v").unwrap();
        let resolver = resolver_for(&temp_dir);

        let source = resolver.resolve("demo.properties", None, "demo").unwrap();
        assert_eq!(source.kind(), "file");
        assert!(resolver.resolve("missing.properties", None, "demo").is_none());
    }

    #[test]
    fn test_resolve_datasource() {
        let temp_dir = TempDir::new().unwrap();
        let datasources = Arc::new(DatasourceRegistry::new());
        let backend = Arc::new(MemoryDatasource::new());
        backend.store(PROPERTIES_TABLE, "acme:demo", "k", "v").unwrap();
        datasources.register("conf", backend);

        let resolver = resolver_for(&temp_dir).with_datasources(datasources);
        let source = resolver
            .resolve("datasource:conf", Some("acme"), "demo")
            .unwrap();
        assert_eq!(source.kind(), "datasource");
        assert_eq!(source.load().unwrap().unwrap().len(), 1);

        assert!(resolver.resolve("datasource:missing", None, "demo").is_none());
    }

    #[test]
    fn test_resolve_jndi_requires_context() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver_for(&temp_dir);
        assert!(resolver.resolve("jndi:demo", None, "demo").is_none());

        let context: Arc<dyn NamingContext> = Arc::new(MemoryNamingContext::new());
        let resolver = resolver.with_naming_context(Some(context));
        assert_eq!(resolver.resolve("jndi:demo", None, "demo").unwrap().kind(), "jndi");
    }

    #[test]
    fn test_resolve_class() {
        let temp_dir = TempDir::new().unwrap();
        let classes = Arc::new(ClassRegistry::new());
        classes.register_source::<StaticSource>("static").unwrap();

        let resolver = resolver_for(&temp_dir).with_classes(classes);
        assert_eq!(resolver.resolve("class:static", None, "demo").unwrap().kind(), "class");
        assert!(resolver.resolve("class:missing", None, "demo").is_none());
    }

    #[test]
    fn test_resolve_plain_class_is_not_a_source() {
        #[derive(Default)]
        struct Plain;

        let temp_dir = TempDir::new().unwrap();
        let classes = Arc::new(ClassRegistry::new());
        classes.register_class::<Plain>("plain").unwrap();

        let resolver = resolver_for(&temp_dir).with_classes(classes.clone());
        assert!(classes.is_registered("plain"));
        assert!(classes.create_source("plain").is_none());
        assert!(resolver.resolve("class:plain", None, "demo").is_none());
    }
}
