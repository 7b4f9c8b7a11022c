//! cfg 模块 - 分层配置解析
//!
//! 把系统属性、全局配置与组件配置组合为一条按优先级排列的查找链，
//! 支持选择器后缀回退、`key+` 追加合并、`${name}` 变量替换以及按文件修改时间重载

// 模块声明
pub mod aggregated;
pub mod class_registry;
pub mod component;
pub mod component_properties;
pub mod composite;
pub mod configuration_object;
pub mod conventions;
pub mod datasource_source;
pub mod easyconf;
pub mod error;
pub mod file_source;
pub mod filter;
pub mod interpolate;
pub mod jndi_source;
pub mod loader;
pub mod parse_value;
pub mod properties_parser;
pub mod reload;
pub mod resolver;
pub mod serializer;
pub mod source;
pub mod system;
pub mod value;

// 重新导出公共 API
pub use aggregated::AggregatedProperties;
pub use class_registry::{ClassRef, ClassRegistry};
pub use component::ComponentConfiguration;
pub use component_properties::ComponentProperties;
pub use composite::{merge, CompositeProperties};
pub use configuration_object::ConfigurationObjectCache;
pub use datasource_source::{
    Datasource, DatasourceRegistry, DatasourceSource, DatasourceUrl, MemoryDatasource,
};
pub use easyconf::{EasyConf, EasyConfConfig};
pub use error::{ConfError, Result};
pub use file_source::{FileSource, ResourceLocator, ResourceLocatorConfig};
pub use filter::Filter;
pub use jndi_source::{JndiSource, JndiUrl, MemoryNamingContext, NamingContext};
pub use loader::ConfigurationLoader;
pub use parse_value::FromProperty;
pub use properties_parser::{PropertiesParser, PropertiesParserConfig};
pub use reload::{FileChangedStrategy, ReloadStrategy};
pub use resolver::SourceResolver;
pub use serializer::{ConfigurationSerializer, JsonSerializer, YamlSerializer};
pub use source::{Layer, PropertySource, Source};
pub use system::SystemProperties;
pub use value::{PropertyMap, PropertyValue};
