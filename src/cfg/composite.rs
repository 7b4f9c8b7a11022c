//! 合并式分层存储
//!
//! 多个层按优先级排列，下标 0 优先级最高。
//! 普通键取第一个定义它的层；只要任何一层定义了 `key+`，
//! 结果就是从最低优先级向最高优先级扫描累积出的列表：
//! 遇到 `key` 时重置累积值，遇到 `key+` 时追加。

use std::collections::HashSet;
use std::sync::Arc;

use super::conventions::PLUS_SIGN;
use super::source::Layer;
use super::value::{PropertyMap, PropertyValue};

#[derive(Debug, Clone, Default)]
pub struct CompositeProperties {
    layers: Vec<Arc<Layer>>,
}

impl CompositeProperties {
    pub fn new(layers: Vec<Arc<Layer>>) -> Self {
        Self { layers }
    }

    /// 把 other 的各层接在当前各层之后
    pub fn chain(&self, other: &CompositeProperties) -> Self {
        let mut layers = self.layers.clone();
        layers.extend(other.layers.iter().cloned());
        Self { layers }
    }

    /// 添加一层，优先级低于已有各层
    pub fn push(&mut self, layer: Arc<Layer>) {
        self.layers.push(layer);
    }

    /// 添加一层，优先级高于已有各层
    pub fn push_front(&mut self, layer: Arc<Layer>) {
        self.layers.insert(0, layer);
    }

    pub fn layers(&self) -> &[Arc<Layer>] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn snapshots(&self) -> Vec<Arc<PropertyMap>> {
        self.layers.iter().map(|layer| layer.snapshot()).collect()
    }

    pub fn get(&self, key: &str) -> Option<PropertyValue> {
        merge(&self.snapshots(), key)
    }

    /// 定义了 `key` 或 `key+` 时返回 true
    pub fn contains_key(&self, key: &str) -> bool {
        let additive = additive_key(key);
        self.snapshots()
            .iter()
            .any(|map| map.contains_key(key) || map.contains_key(&additive))
    }

    /// 所有层键的并集，按首次出现的顺序，`key+` 归并为 `key`
    pub fn keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for map in self.snapshots() {
            for key in map.keys() {
                let key = key.strip_suffix(PLUS_SIGN).unwrap_or(key);
                if seen.insert(key.to_string()) {
                    keys.push(key.to_string());
                }
            }
        }
        keys
    }
}

pub fn additive_key(key: &str) -> String {
    format!("{}{}", key, PLUS_SIGN)
}

/// 在按优先级排列的属性表上查找 key
///
/// # 示例
/// ```
/// use easyconf::cfg::{merge, PropertyMap, PropertyValue};
///
/// let mut low = PropertyMap::new();
/// low.insert("k", "v1");
/// low.insert("k+", "v2");
/// let mut high = PropertyMap::new();
/// high.insert("k+", "v3");
///
/// assert_eq!(
///     merge(&[high, low], "k"),
///     Some(PropertyValue::List(vec!["v1".into(), "v2".into(), "v3".into()]))
/// );
/// ```
pub fn merge<M>(maps: &[M], key: &str) -> Option<PropertyValue>
where
    M: AsRef<PropertyMap>,
{
    let additive = additive_key(key);
    if !maps.iter().any(|map| map.as_ref().contains_key(&additive)) {
        return maps.iter().find_map(|map| map.as_ref().get(key).cloned());
    }

    let mut merged: Option<Vec<String>> = None;
    for map in maps.iter().rev() {
        let map = map.as_ref();
        if let Some(value) = map.get(key) {
            merged = Some(value.to_vec());
        }
        if let Some(value) = map.get(&additive) {
            merged.get_or_insert_with(Vec::new).extend(value.to_vec());
        }
    }
    merged.map(PropertyValue::List)
}
