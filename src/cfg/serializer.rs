//! 配置对象序列化
//!
//! 配置对象以 `serde_json::Value` 作为中间表示，可序列化为 JSON 或 YAML 文本保存

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::error::{ConfError, Result};

pub trait ConfigurationSerializer: Send + Sync {
    fn name(&self) -> &'static str;

    fn serialize(&self, value: &JsonValue) -> Result<String>;

    fn deserialize(&self, content: &str) -> Result<JsonValue>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl ConfigurationSerializer for JsonSerializer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn serialize(&self, value: &JsonValue) -> Result<String> {
        serde_json::to_string_pretty(value).map_err(|e| parse_error(self.name(), e))
    }

    fn deserialize(&self, content: &str) -> Result<JsonValue> {
        serde_json::from_str(content).map_err(|e| parse_error(self.name(), e))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlSerializer;

impl ConfigurationSerializer for YamlSerializer {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn serialize(&self, value: &JsonValue) -> Result<String> {
        serde_yaml::to_string(value).map_err(|e| parse_error(self.name(), e))
    }

    fn deserialize(&self, content: &str) -> Result<JsonValue> {
        serde_yaml::from_str(content).map_err(|e| parse_error(self.name(), e))
    }
}

/// 按名称选择序列化器，未知名称时返回 None
pub fn serializer_by_name(name: &str) -> Option<Box<dyn ConfigurationSerializer>> {
    match name.to_ascii_lowercase().as_str() {
        "json" => Some(Box::new(JsonSerializer)),
        "yaml" | "yml" => Some(Box::new(YamlSerializer)),
        _ => None,
    }
}

/// 对象转为中间表示
pub fn to_value<T: Serialize>(object: &T) -> Result<JsonValue> {
    serde_json::to_value(object).map_err(|e| parse_error("object", e))
}

/// 中间表示转为对象
pub fn from_value<T: DeserializeOwned>(value: JsonValue) -> Result<T> {
    serde_json::from_value(value).map_err(|e| parse_error("object", e))
}

fn parse_error(source_name: &str, e: impl std::fmt::Display) -> ConfError {
    ConfError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    }
}
