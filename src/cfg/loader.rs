//! 组件配置的读取与保存

use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::aggregated::AggregatedProperties;
use super::component_properties::ComponentProperties;
use super::configuration_object::ConfigurationObjectCache;
use super::conventions::{
    company_file_name, properties_file_name, COMPANY_SEPARATOR, CONFIGURATION_OBJECTS_SOURCE_PROPERTY,
    CONFIGURATION_OBJECTS_TABLE, DEFAULT_CONF_OBJECT_NAME, DOT, OBJECT_FILE_EXTENSIONS,
};
use super::datasource_source::{DatasourceSource, DatasourceUrl};
use super::easyconf::EasyConfConfig;
use super::error::{ConfError, Result};
use super::resolver::SourceResolver;
use super::serializer::ConfigurationSerializer;
use super::system::SystemProperties;

pub struct ConfigurationLoader {
    config: Arc<EasyConfConfig>,
    system: Arc<SystemProperties>,
    resolver: SourceResolver,
    serializer: Arc<dyn ConfigurationSerializer>,
}

impl ConfigurationLoader {
    pub fn new(
        config: Arc<EasyConfConfig>,
        system: Arc<SystemProperties>,
        resolver: SourceResolver,
        serializer: Arc<dyn ConfigurationSerializer>,
    ) -> Self {
        Self {
            config,
            system,
            resolver,
            serializer,
        }
    }

    pub fn serializer(&self) -> &dyn ConfigurationSerializer {
        self.serializer.as_ref()
    }

    /// 组合全局配置与组件基础配置
    ///
    /// 开启公司专属文件时，`<name>-<companyId>.properties` 排在通用文件之前
    pub fn read_properties_configuration(
        &self,
        company_id: Option<&str>,
        component_name: &str,
    ) -> ComponentProperties {
        let mut properties = AggregatedProperties::new(
            company_id,
            component_name,
            self.system.clone(),
            self.resolver.clone(),
        )
        .with_global_overrides_base(self.config.global_overrides_base);

        let global = &self.config.global_file_name;
        if let (true, Some(company_id)) = (self.config.company_specific_files, company_id) {
            properties.add_global_file_name(&company_file_name(global, company_id));
        }
        properties.add_global_file_name(&properties_file_name(global));

        if let (true, Some(company_id)) = (self.config.company_specific_files, company_id) {
            properties.add_base_file_name(&company_file_name(component_name, company_id));
        }
        properties.add_base_file_name(&properties_file_name(component_name));

        log::info!(
            "properties for {} loaded from {:?}",
            component_name,
            properties.loaded_sources()
        );
        let properties = ComponentProperties::new(properties);
        properties.set_throw_on_missing(self.config.throw_on_missing);
        properties
    }

    /// 读取配置对象
    ///
    /// `easyconf:configuration-objects-source` 指向数据源时先从对象表读取，
    /// 表中没有记录时再读取配置对象文件
    pub fn read_configuration_object(
        &self,
        properties: &ComponentProperties,
        conf_name: &str,
    ) -> Result<ConfigurationObjectCache> {
        let component_name = properties.component_name();
        log::info!("reading the configuration object for {}", component_name);

        if let Some(source) = self.objects_source(properties)? {
            let payload = source.get(conf_name)?;
            if let Some(payload) = payload {
                let value = self.serializer.deserialize(&payload)?;
                return Ok(ConfigurationObjectCache::new(conf_name, value));
            }
        }
        self.read_configuration_object_from_file(properties, conf_name)
    }

    fn read_configuration_object_from_file(
        &self,
        properties: &ComponentProperties,
        conf_name: &str,
    ) -> Result<ConfigurationObjectCache> {
        let component_name = properties.component_name();
        let base_name = if conf_name == DEFAULT_CONF_OBJECT_NAME {
            component_name.to_string()
        } else {
            format!("{}{}{}", component_name, DOT, conf_name)
        };

        let locator = self.resolver.locator();
        let company_candidate = properties.company_id().and_then(|company_id| {
            let company_name = format!("{}{}{}", base_name, COMPANY_SEPARATOR, company_id);
            let found = locator.locate_with_extensions(&company_name, &OBJECT_FILE_EXTENSIONS);
            log::info!("loaded {}: {:?}", company_name, found);
            found
        });

        let Some((path, ext)) = company_candidate
            .or_else(|| locator.locate_with_extensions(&base_name, &OBJECT_FILE_EXTENSIONS))
        else {
            return Err(ConfError::ObjectNotFound {
                component: component_name.to_string(),
                file: format!("{}.{{{}}}", base_name, OBJECT_FILE_EXTENSIONS.join(",")),
            });
        };

        ConfigurationObjectCache::from_file(
            conf_name,
            path,
            ext,
            properties,
            properties.delay_period(),
        )
    }

    /// 保存配置对象到对象表
    pub fn save_configuration_object_into_database(
        &self,
        properties: &ComponentProperties,
        conf_name: &str,
        value: &JsonValue,
    ) -> Result<()> {
        log::info!(
            "saving the configuration object into the database for {}",
            properties.component_name()
        );
        let Some(source) = self.objects_source(properties)? else {
            return Err(ConfError::UnconfiguredPersistence {
                component: properties.component_name().to_string(),
                key: CONFIGURATION_OBJECTS_SOURCE_PROPERTY.to_string(),
            });
        };
        let payload = self.serializer.serialize(value)?;
        source.store(conf_name, &payload)
    }

    /// 组件配置的对象数据源；未设置时返回 None，设置了但不是可用的数据源时返回错误
    fn objects_source(&self, properties: &ComponentProperties) -> Result<Option<DatasourceSource>> {
        let Some(source_name) = properties
            .get_property(CONFIGURATION_OBJECTS_SOURCE_PROPERTY)
            .map(|value| value.joined())
        else {
            return Ok(None);
        };

        let invalid = || ConfError::InvalidObjectSource {
            component: properties.component_name().to_string(),
            source_name: source_name.clone(),
        };
        if !DatasourceUrl::is_datasource(&source_name) {
            return Err(invalid());
        }

        let url = DatasourceUrl::new(
            &source_name,
            properties.company_id(),
            properties.component_name(),
            CONFIGURATION_OBJECTS_TABLE,
        );
        let backend = self
            .resolver
            .datasources()
            .lookup(url.datasource_name())
            .ok_or_else(invalid)?;
        Ok(Some(DatasourceSource::new(url, backend)))
    }
}
