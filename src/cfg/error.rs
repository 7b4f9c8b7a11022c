use thiserror::Error;

/// 配置相关错误
#[derive(Error, Debug)]
pub enum ConfError {
    /// 显式要求组件基础配置，但没有找到任何基础属性文件
    #[error("Configuration of component {component} not found: {message}")]
    ConfigurationNotFound { component: String, message: String },

    #[error("Property with key={key} was not found")]
    MissingProperty { key: String },

    #[error("Cannot convert property {key}='{value}' to {target}: {reason}")]
    Conversion {
        key: String,
        target: &'static str,
        value: String,
        reason: String,
    },

    #[error("Class {name} was not found in the class registry")]
    ClassNotFound { name: String },

    /// 配置对象中的变量格式错误或引用了未定义的属性
    #[error(
        "Invalid property in configuration of component {component}: {message}. \
         A variable is either malformed or makes a reference to a property \
         which is not defined for this component in any of its configuration files"
    )]
    InvalidProperty { component: String, message: String },

    #[error(
        "It is impossible to save the configuration object of component {component}. \
         Please specify a valid datasource in property {key}"
    )]
    UnconfiguredPersistence { component: String, key: String },

    #[error("The configuration objects source of component {component} is not valid: {source_name}")]
    InvalidObjectSource {
        component: String,
        source_name: String,
    },

    #[error("Configuration object file {file} of component {component} not found")]
    ObjectNotFound { component: String, file: String },

    #[error("Failed to parse {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error("Invalid easyconf config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl ConfError {
    pub fn missing(key: impl Into<String>) -> Self {
        ConfError::MissingProperty { key: key.into() }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ConfError::MissingProperty { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConfError>;
