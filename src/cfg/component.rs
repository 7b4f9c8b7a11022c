//! 组件配置：组件属性与配置对象的入口

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::component_properties::ComponentProperties;
use super::configuration_object::ConfigurationObjectCache;
use super::conventions::DEFAULT_CONF_OBJECT_NAME;
use super::error::{ConfError, Result};
use super::loader::ConfigurationLoader;
use super::serializer::{from_value, to_value};

pub struct ComponentConfiguration {
    company_id: Option<String>,
    component_name: String,
    loader: Arc<ConfigurationLoader>,
    properties: OnceCell<Arc<ComponentProperties>>,
    objects: DashMap<String, Arc<ConfigurationObjectCache>>,
}

impl ComponentConfiguration {
    pub fn new(company_id: Option<&str>, component_name: &str, loader: Arc<ConfigurationLoader>) -> Self {
        Self {
            company_id: company_id.map(str::to_string),
            component_name: component_name.to_string(),
            loader,
            properties: OnceCell::new(),
            objects: DashMap::new(),
        }
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    pub fn company_id(&self) -> Option<&str> {
        self.company_id.as_deref()
    }

    /// 组件属性；没有找到任何基础属性文件时返回 ConfigurationNotFound
    pub fn get_properties(&self) -> Result<Arc<ComponentProperties>> {
        let properties = self.available_properties();
        if !properties.has_base_configuration() {
            return Err(ConfError::ConfigurationNotFound {
                component: self.component_name.clone(),
                message: "The base properties file was not found".to_string(),
            });
        }
        Ok(properties)
    }

    /// 组件属性，不要求基础配置存在
    pub fn available_properties(&self) -> Arc<ComponentProperties> {
        self.properties
            .get_or_init(|| {
                Arc::new(
                    self.loader
                        .read_properties_configuration(self.company_id.as_deref(), &self.component_name),
                )
            })
            .clone()
    }

    pub fn get_configuration_object<T: DeserializeOwned>(&self) -> Result<T> {
        self.get_named_configuration_object(DEFAULT_CONF_OBJECT_NAME)
    }

    pub fn get_named_configuration_object<T: DeserializeOwned>(&self, conf_name: &str) -> Result<T> {
        let value = self.get_configuration_value(conf_name)?;
        from_value(JsonValue::clone(&value))
    }

    /// 配置对象的中间表示，首次访问时读取并缓存
    pub fn get_configuration_value(&self, conf_name: &str) -> Result<Arc<JsonValue>> {
        let properties = self.available_properties();
        if let Some(cache) = self.objects.get(conf_name).map(|entry| entry.value().clone()) {
            return Ok(cache.get(&properties));
        }

        let cache = Arc::new(self.loader.read_configuration_object(&properties, conf_name)?);
        log::debug!("obtained configuration object cache for {}: {:?}", conf_name, cache);
        self.objects.insert(conf_name.to_string(), cache.clone());
        Ok(cache.get(&properties))
    }

    pub fn save_configuration_object<T: Serialize>(&self, object: &T) -> Result<()> {
        self.save_named_configuration_object(DEFAULT_CONF_OBJECT_NAME, object)
    }

    /// 保存配置对象到组件配置的对象数据源，并替换缓存中的对象
    pub fn save_named_configuration_object<T: Serialize>(&self, conf_name: &str, object: &T) -> Result<()> {
        let properties = self.available_properties();
        let value = to_value(object)?;
        self.loader
            .save_configuration_object_into_database(&properties, conf_name, &value)?;
        self.objects.insert(
            conf_name.to_string(),
            Arc::new(ConfigurationObjectCache::new(conf_name, value)),
        );
        Ok(())
    }
}

impl PartialEq for ComponentConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.company_id == other.company_id && self.component_name == other.component_name
    }
}

impl std::fmt::Debug for ComponentConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentConfiguration")
            .field("company_id", &self.company_id)
            .field("component_name", &self.component_name)
            .field("loaded", &self.properties.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::datasource_source::{DatasourceRegistry, MemoryDatasource};
    use crate::cfg::easyconf::EasyConfConfig;
    use crate::cfg::file_source::{ResourceLocator, ResourceLocatorConfig};
    use crate::cfg::properties_parser::PropertiesParser;
    use crate::cfg::resolver::SourceResolver;
    use crate::cfg::serializer::YamlSerializer;
    use crate::cfg::system::SystemProperties;
    use serde::Deserialize;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Pool {
        size: u32,
        name: String,
    }

    fn configuration(dir: &TempDir, datasources: Arc<DatasourceRegistry>) -> ComponentConfiguration {
        let resolver = SourceResolver::new(
            ResourceLocator::new(ResourceLocatorConfig {
                search_paths: vec![dir.path().to_string_lossy().to_string()],
                search_home: false,
            }),
            PropertiesParser::default(),
        )
        .with_datasources(datasources);
        let loader = ConfigurationLoader::new(
            Arc::new(EasyConfConfig::default()),
            Arc::new(SystemProperties::new()),
            resolver,
            Arc::new(YamlSerializer),
        );
        ComponentConfiguration::new(None, "demo", Arc::new(loader))
    }

    #[test]
    fn test_configuration_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let conf = configuration(&temp_dir, Arc::new(DatasourceRegistry::new()));

        assert!(matches!(
            conf.get_properties(),
            Err(ConfError::ConfigurationNotFound { component, .. }) if component == "demo"
        ));
        assert!(!conf.available_properties().has_base_configuration());
    }

    #[test]
    fn test_properties_loaded_once() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("demo.properties"), "k=v").unwrap();
        let conf = configuration(&temp_dir, Arc::new(DatasourceRegistry::new()));

        let first = conf.get_properties().unwrap();
        let second = conf.get_properties().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_object_from_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("demo.properties"), "pool.name=main").unwrap();
        fs::write(temp_dir.path().join("demo.yaml"), "size: 8\nname: ${pool.name}\n").unwrap();
        let conf = configuration(&temp_dir, Arc::new(DatasourceRegistry::new()));

        let pool: Pool = conf.get_configuration_object().unwrap();
        assert_eq!(
            pool,
            Pool {
                size: 8,
                name: "main".to_string()
            }
        );
    }

    #[test]
    fn test_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("demo.properties"),
            "easyconf:configuration-objects-source=datasource:objects",
        )
        .unwrap();
        let datasources = Arc::new(DatasourceRegistry::new());
        datasources.register("objects", Arc::new(MemoryDatasource::new()));

        let pool = Pool {
            size: 3,
            name: "saved".to_string(),
        };
        let conf = configuration(&temp_dir, datasources.clone());
        conf.save_named_configuration_object("pool", &pool).unwrap();
        assert_eq!(conf.get_named_configuration_object::<Pool>("pool").unwrap(), pool);

        // 新的组件配置从数据源读取
        let fresh = configuration(&temp_dir, datasources);
        assert_eq!(fresh.get_named_configuration_object::<Pool>("pool").unwrap(), pool);
    }

    #[test]
    fn test_save_without_source_is_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("demo.properties"), "k=v").unwrap();
        let conf = configuration(&temp_dir, Arc::new(DatasourceRegistry::new()));

        let pool = Pool {
            size: 1,
            name: "x".to_string(),
        };
        assert!(matches!(
            conf.save_configuration_object(&pool),
            Err(ConfError::UnconfiguredPersistence { .. })
        ));
    }
}
