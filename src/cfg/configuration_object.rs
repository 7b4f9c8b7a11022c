//! 配置对象缓存
//!
//! 从文件读取的配置对象在组件设置了重载间隔时按文件修改时间重新读取，
//! 重新读取失败时保留旧对象

use arc_swap::ArcSwap;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::component_properties::ComponentProperties;
use super::error::{ConfError, Result};
use super::file_source::parse_structured;
use super::interpolate::{first_unresolved, has_variables, interpolate};
use super::reload::ReloadStrategy;

#[derive(Debug, Clone)]
struct ObjectFile {
    path: PathBuf,
    ext: &'static str,
}

pub struct ConfigurationObjectCache {
    conf_name: String,
    value: ArcSwap<JsonValue>,
    file: Option<ObjectFile>,
    reload: Option<Mutex<ReloadStrategy>>,
}

impl ConfigurationObjectCache {
    /// 不关联文件的配置对象，如从数据源读取或刚保存的对象
    pub fn new(conf_name: impl Into<String>, value: JsonValue) -> Self {
        Self {
            conf_name: conf_name.into(),
            value: ArcSwap::from_pointee(value),
            file: None,
            reload: None,
        }
    }

    /// 读取配置对象文件
    ///
    /// # 参数
    /// - `path`: 文件路径
    /// - `ext`: 文件格式（json/yaml/yml/toml）
    /// - `properties`: 用于替换 `${name}` 的组件属性
    /// - `delay`: 重载间隔（秒），None 表示不重载
    pub fn from_file(
        conf_name: impl Into<String>,
        path: PathBuf,
        ext: &'static str,
        properties: &ComponentProperties,
        delay: Option<u64>,
    ) -> Result<Self> {
        let value = load_object_file(&path, ext, properties)?;
        let reload = delay.map(|delay| Mutex::new(ReloadStrategy::file_changed(&path, delay)));
        Ok(Self {
            conf_name: conf_name.into(),
            value: ArcSwap::from_pointee(value),
            file: Some(ObjectFile { path, ext }),
            reload,
        })
    }

    pub fn conf_name(&self) -> &str {
        &self.conf_name
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_ref().map(|file| file.path.as_path())
    }

    /// 当前对象；必要时先重新读取文件
    pub fn get(&self, properties: &ComponentProperties) -> Arc<JsonValue> {
        self.reload_if_needed(properties);
        self.value.load_full()
    }

    fn reload_if_needed(&self, properties: &ComponentProperties) {
        let (Some(file), Some(lock)) = (&self.file, &self.reload) else {
            return;
        };
        let Ok(mut strategy) = lock.lock() else {
            return;
        };
        if !strategy.reloading_required() {
            return;
        }
        match load_object_file(&file.path, file.ext, properties) {
            Ok(value) => {
                self.value.store(Arc::new(value));
                strategy.reloading_performed();
                log::info!("read configuration from {}", file.path.display());
            }
            Err(e) => log::error!("error loading {}: {}", file.path.display(), e),
        }
    }
}

impl std::fmt::Debug for ConfigurationObjectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationObjectCache")
            .field("conf_name", &self.conf_name)
            .field("file", &self.file)
            .field("reloadable", &self.reload.is_some())
            .finish()
    }
}

/// 读取并解析对象文件，替换所有字符串中的 `${name}`
pub fn load_object_file(
    path: &Path,
    ext: &str,
    properties: &ComponentProperties,
) -> Result<JsonValue> {
    log::debug!("loading configuration object file: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let mut value = parse_structured(&content, ext, &path.to_string_lossy())?;
    substitute(&mut value, properties)?;
    Ok(value)
}

fn substitute(value: &mut JsonValue, properties: &ComponentProperties) -> Result<()> {
    match value {
        JsonValue::String(s) if has_variables(s) => {
            let replaced = interpolate(s, &|name: &str| properties.get_property(name));
            if let Some(name) = first_unresolved(&replaced) {
                return Err(ConfError::InvalidProperty {
                    component: properties.component_name().to_string(),
                    message: format!("variable ${{{}}} cannot be resolved", name),
                });
            }
            *s = replaced;
        }
        JsonValue::Array(items) => {
            for item in items {
                substitute(item, properties)?;
            }
        }
        JsonValue::Object(fields) => {
            for (_, field) in fields.iter_mut() {
                substitute(field, properties)?;
            }
        }
        _ => {}
    }
    Ok(())
}
