//! 命名服务配置源
//!
//! `jndi:<prefix>` 形式的来源读取命名服务中 `<prefix>` 下的所有绑定，
//! 名称相对于前缀，`/` 转换为 `.` 作为属性键

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::conventions::JNDI_PREFIX;
use super::error::Result;
use super::value::PropertyMap;

/// 命名服务
pub trait NamingContext: Send + Sync {
    /// 列出 prefix 下的所有 (完整名称, 值) 绑定
    fn list(&self, prefix: &str) -> anyhow::Result<Vec<(String, String)>>;
}

/// 内存命名服务，按名称排序
#[derive(Debug, Default)]
pub struct MemoryNamingContext {
    bindings: RwLock<BTreeMap<String, String>>,
}

impl MemoryNamingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut bindings) = self.bindings.write() {
            bindings.insert(name.into(), value.into());
        }
    }

    pub fn unbind(&self, name: &str) {
        if let Ok(mut bindings) = self.bindings.write() {
            bindings.remove(name);
        }
    }
}

impl NamingContext for MemoryNamingContext {
    fn list(&self, prefix: &str) -> anyhow::Result<Vec<(String, String)>> {
        let bindings = self
            .bindings
            .read()
            .map_err(|_| anyhow::anyhow!("Failed to acquire read lock"))?;
        Ok(bindings
            .iter()
            .filter(|(name, _)| in_context(prefix, name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JndiUrl {
    prefix: String,
}

impl JndiUrl {
    pub fn new(path: &str) -> Self {
        Self {
            prefix: path.strip_prefix(JNDI_PREFIX).unwrap_or(path).to_string(),
        }
    }

    pub fn is_jndi(path: &str) -> bool {
        path.starts_with(JNDI_PREFIX)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

pub struct JndiSource {
    url: JndiUrl,
    context: Arc<dyn NamingContext>,
}

impl JndiSource {
    pub fn new(url: JndiUrl, context: Arc<dyn NamingContext>) -> Self {
        Self { url, context }
    }

    pub fn url(&self) -> &JndiUrl {
        &self.url
    }

    pub fn load(&self) -> Result<PropertyMap> {
        let prefix = self.url.prefix();
        let mut map = PropertyMap::new();
        for (name, value) in self.context.list(prefix)? {
            let key = relative_key(prefix, &name);
            if key.is_empty() {
                continue;
            }
            map.add(key, value);
        }
        Ok(map)
    }
}

/// 名称是否位于 prefix 子上下文中，按路径段比较
fn in_context(prefix: &str, name: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match name.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn relative_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if !in_context(prefix, name) {
        return String::new();
    }
    name[prefix.len()..]
        .trim_start_matches('/')
        .replace('/', ".")
}
