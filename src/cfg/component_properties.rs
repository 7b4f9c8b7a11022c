//! 组件属性的类型化访问

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::aggregated::AggregatedProperties;
use super::class_registry::{ClassRef, ClassRegistry};
use super::conventions::DOT;
use super::error::{ConfError, Result};
use super::filter::Filter;
use super::interpolate::interpolate_value;
use super::parse_value::FromProperty;
use super::value::{PropertyMap, PropertyValue};

/// 组件属性
///
/// 查找时按过滤器的后缀从最具体到最不具体依次尝试，
/// 如选择器 `[a, b]` 依次尝试 `key[a][b]`、`key[a]`、`key`。
///
/// # 示例
/// ```no_run
/// use easyconf::cfg::{EasyConf, EasyConfConfig, Filter};
///
/// let easyconf = EasyConf::new(EasyConfConfig::default()).unwrap();
/// let props = easyconf.get_configuration("demo").get_properties().unwrap();
///
/// let timeout = props.get_i32("timeout", &Filter::by(["env", "prod"])).unwrap();
/// let hosts = props.get_list("hosts", &Filter::none()).unwrap();
/// ```
pub struct ComponentProperties {
    properties: AggregatedProperties,
    classes: Arc<ClassRegistry>,
    throw_on_missing: AtomicBool,
}

impl ComponentProperties {
    pub fn new(properties: AggregatedProperties) -> Self {
        let classes = properties.resolver().classes().clone();
        Self {
            properties,
            classes,
            throw_on_missing: AtomicBool::new(false),
        }
    }

    pub fn set_throw_on_missing(&self, throw_on_missing: bool) {
        self.throw_on_missing.store(throw_on_missing, Ordering::Relaxed);
    }

    pub fn is_throw_on_missing(&self) -> bool {
        self.throw_on_missing.load(Ordering::Relaxed)
    }

    /// 按过滤器查找并转换，所有后缀都不存在时返回 None
    fn resolve<T: FromProperty>(&self, key: &str, filter: &Filter) -> Result<Option<T>> {
        let variables = variables_of(filter);
        for suffix in filter.suffixes() {
            let full_key = format!("{}{}", key, suffix);
            let Some(value) = self.lookup(&full_key, variables.as_ref()) else {
                continue;
            };
            log::debug!("property {} resolved to {}", full_key, value);
            return T::from_property(&value)
                .map(Some)
                .map_err(|reason| ConfError::Conversion {
                    key: full_key,
                    target: T::TYPE_NAME,
                    value: value.joined(),
                    reason,
                });
        }
        Ok(None)
    }

    /// 查找并替换变量；变量只对本次查找生效
    fn lookup(&self, key: &str, variables: Option<&PropertyMap>) -> Option<PropertyValue> {
        let raw = self.properties.get(key, variables)?;
        Some(interpolate_value(&raw, &|name: &str| {
            self.properties.get(name, variables)
        }))
    }

    /// 查找属性
    ///
    /// # 返回
    /// - Ok(Some(T)): 找到并转换成功
    /// - Ok(None): 不存在且未开启 throw on missing
    /// - Err(MissingProperty): 不存在且开启了 throw on missing
    /// - Err(Conversion): 存在但无法转换为 T
    pub fn get<T: FromProperty>(&self, key: &str, filter: &Filter) -> Result<Option<T>> {
        match self.resolve(key, filter)? {
            Some(value) => Ok(Some(value)),
            None if self.is_throw_on_missing() => Err(ConfError::missing(key)),
            None => Ok(None),
        }
    }

    /// 查找属性，不存在时返回默认值
    pub fn get_or<T: FromProperty>(&self, key: &str, filter: &Filter, default: T) -> Result<T> {
        Ok(self.resolve(key, filter)?.unwrap_or(default))
    }

    /// 列表值重新拼接为逗号分隔的字符串
    pub fn get_string(&self, key: &str, filter: &Filter) -> Result<Option<String>> {
        self.get(key, filter)
    }

    pub fn get_bool(&self, key: &str, filter: &Filter) -> Result<Option<bool>> {
        self.get(key, filter)
    }

    pub fn get_i8(&self, key: &str, filter: &Filter) -> Result<Option<i8>> {
        self.get(key, filter)
    }

    pub fn get_i16(&self, key: &str, filter: &Filter) -> Result<Option<i16>> {
        self.get(key, filter)
    }

    pub fn get_i32(&self, key: &str, filter: &Filter) -> Result<Option<i32>> {
        self.get(key, filter)
    }

    pub fn get_i64(&self, key: &str, filter: &Filter) -> Result<Option<i64>> {
        self.get(key, filter)
    }

    pub fn get_i128(&self, key: &str, filter: &Filter) -> Result<Option<i128>> {
        self.get(key, filter)
    }

    pub fn get_f32(&self, key: &str, filter: &Filter) -> Result<Option<f32>> {
        self.get(key, filter)
    }

    pub fn get_f64(&self, key: &str, filter: &Filter) -> Result<Option<f64>> {
        self.get(key, filter)
    }

    /// 列表属性，不存在且未开启 throw on missing 时返回空列表
    pub fn get_list(&self, key: &str, filter: &Filter) -> Result<Vec<String>> {
        Ok(self.get::<Vec<String>>(key, filter)?.unwrap_or_default())
    }

    pub fn get_string_array(&self, key: &str, filter: &Filter) -> Result<Vec<String>> {
        self.get_list(key, filter)
    }

    /// 以属性值为名称在类注册表中查找类型
    pub fn get_class(&self, key: &str, filter: &Filter) -> Result<Option<ClassRef>> {
        match self.get::<String>(key, filter)? {
            Some(name) => self.classes.locate_class(&name).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_class_array(&self, key: &str, filter: &Filter) -> Result<Vec<ClassRef>> {
        self.get_list(key, filter)?
            .iter()
            .map(|name| self.classes.locate_class(name))
            .collect()
    }

    /// 原始值（已替换变量），不受 throw on missing 影响
    pub fn get_property(&self, key: &str) -> Option<PropertyValue> {
        self.lookup(key, None)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.properties.keys()
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.keys()
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect()
    }

    /// `prefix.` 开头的属性，键去掉前缀
    pub fn subset(&self, prefix: &str) -> PropertyMap {
        let dotted = format!("{}{}", prefix, DOT);
        let mut map = PropertyMap::new();
        for key in self.keys() {
            let Some(stripped) = key.strip_prefix(&dotted) else {
                continue;
            };
            if let Some(value) = self.get_property(&key) {
                map.insert(stripped, value);
            }
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    pub fn set_property(&self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.set_property(key, value);
    }

    /// 所有属性的解析结果
    pub fn to_map(&self) -> PropertyMap {
        let mut map = PropertyMap::new();
        for key in self.keys() {
            if let Some(value) = self.get_property(&key) {
                map.insert(key, value);
            }
        }
        map
    }

    pub fn loaded_sources(&self) -> &[String] {
        self.properties.loaded_sources()
    }

    pub fn has_base_configuration(&self) -> bool {
        self.properties.has_base_configuration()
    }

    pub fn delay_period(&self) -> Option<u64> {
        self.properties.delay_period()
    }

    pub fn component_name(&self) -> &str {
        self.properties.component_name()
    }

    pub fn company_id(&self) -> Option<&str> {
        self.properties.company_id()
    }

    pub fn aggregated(&self) -> &AggregatedProperties {
        &self.properties
    }
}

impl std::fmt::Debug for ComponentProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentProperties")
            .field("properties", &self.properties)
            .field("throw_on_missing", &self.is_throw_on_missing())
            .finish()
    }
}

fn variables_of(filter: &Filter) -> Option<PropertyMap> {
    if !filter.has_variables() {
        return None;
    }
    let mut names: Vec<&String> = filter.variables().keys().collect();
    names.sort();
    Some(
        names
            .into_iter()
            .map(|name| (name.clone(), filter.variables()[name].clone()))
            .collect(),
    )
}
