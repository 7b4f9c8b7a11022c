//! 属性值与有序属性表

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 原始属性值
///
/// 属性文件中的逗号分隔值、同一文件中重复出现的键以及合并后的结果都以列表表示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Single(String),
    List(Vec<String>),
}

impl PropertyValue {
    /// 第一个元素（数值、布尔等标量转换使用）
    pub fn first(&self) -> Option<&str> {
        match self {
            PropertyValue::Single(s) => Some(s.as_str()),
            PropertyValue::List(items) => items.first().map(|s| s.as_str()),
        }
    }

    /// 以逗号拼接为单个字符串
    pub fn joined(&self) -> String {
        match self {
            PropertyValue::Single(s) => s.clone(),
            PropertyValue::List(items) => items.join(","),
        }
    }

    /// 展开为扁平列表
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            PropertyValue::Single(s) => vec![s.clone()],
            PropertyValue::List(items) => items.clone(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, PropertyValue::List(_))
    }

    /// 将 other 追加到当前值之后，结果总是列表
    pub fn append(&mut self, other: PropertyValue) {
        let mut items = std::mem::replace(self, PropertyValue::List(Vec::new())).into_vec();
        items.extend(other.into_vec());
        *self = PropertyValue::List(items);
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            PropertyValue::Single(s) => vec![s],
            PropertyValue::List(items) => items,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Single(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Single(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(values: Vec<String>) -> Self {
        PropertyValue::List(values)
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.joined())
    }
}

/// 保持插入顺序的属性表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    keys: Vec<String>,
    values: HashMap<String, PropertyValue>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// 设置属性，覆盖已有值
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        let key = key.into();
        if !self.values.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.values.insert(key, value.into());
    }

    /// 添加属性，已有值时追加为列表
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        let key = key.into();
        match self.values.get_mut(&key) {
            Some(existing) => existing.append(value.into()),
            None => {
                self.keys.push(key.clone());
                self.values.insert(key, value.into());
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.keys.retain(|k| k != key);
        }
        removed
    }

    /// 按插入顺序遍历键
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.keys
            .iter()
            .filter_map(move |k| self.values.get(k).map(|v| (k.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl AsRef<PropertyMap> for PropertyMap {
    fn as_ref(&self) -> &PropertyMap {
        self
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyMap
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (k, v) in iter {
            map.add(k, v);
        }
        map
    }
}
