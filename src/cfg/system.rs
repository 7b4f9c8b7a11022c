//! 进程级属性表
//!
//! 相当于进程的"系统属性"，可从环境变量初始化，也可在运行期设置。
//! 由 `EasyConf` 持有并通过引用传给各个组件，而不是隐藏的全局状态。

use std::collections::HashMap;
use std::sync::RwLock;

use super::value::{PropertyMap, PropertyValue};

#[derive(Debug, Default)]
pub struct SystemProperties {
    properties: RwLock<HashMap<String, String>>,
}

impl SystemProperties {
    /// 创建空的属性表
    pub fn new() -> Self {
        Self::default()
    }

    /// 以当前进程的环境变量初始化
    pub fn from_env() -> Self {
        // 非 UTF-8 的环境变量直接跳过
        let properties = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self {
            properties: RwLock::new(properties),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.properties
            .read()
            .ok()
            .and_then(|props| props.get(key).cloned())
    }

    pub fn get_value(&self, key: &str) -> Option<PropertyValue> {
        self.get(key).map(PropertyValue::Single)
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut props) = self.properties.write() {
            props.insert(key.into(), value.into());
        }
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.properties
            .write()
            .ok()
            .and_then(|mut props| props.remove(key))
    }

    /// 全部属性的快照
    pub fn snapshot(&self) -> PropertyMap {
        let mut map = PropertyMap::new();
        if let Ok(props) = self.properties.read() {
            let mut keys: Vec<&String> = props.keys().collect();
            keys.sort();
            for key in keys {
                map.insert(key.clone(), props[key].clone());
            }
        }
        map
    }

    /// 以 prefix 开头的属性快照，键去掉前缀
    pub fn prefixed(&self, prefix: &str) -> PropertyMap {
        let mut map = PropertyMap::new();
        for (key, value) in self.snapshot().iter() {
            if let Some(stripped) = key.strip_prefix(prefix) {
                map.insert(stripped, value.clone());
            }
        }
        map
    }
}
