//! 组件属性的组合根
//!
//! 把系统属性、全局配置栈和组件基础配置栈组合成一条固定的查找链

use std::sync::{Arc, RwLock};

use super::composite::CompositeProperties;
use super::conventions::{
    component_prefix, COMPANY_ID_PROPERTY, COMPONENT_NAME_PROPERTY, INCLUDE_PROPERTY,
    RELOAD_DELAY_PROPERTY,
};
use super::interpolate::interpolate_value;
use super::reload::ReloadStrategy;
use super::resolver::SourceResolver;
use super::source::{Layer, Source};
use super::system::SystemProperties;
use super::value::{PropertyMap, PropertyValue};

/// 同一条 include 链的最大嵌套深度
const MAX_INCLUDE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stack {
    Base,
    Global,
}

/// 组件的聚合属性
///
/// `get` 按以下顺序查找，返回第一个存在的值：
/// 0. 本次查找注入的变量、`set_property` 设置的覆盖值
/// 1. 系统属性 `componentName:key`
/// 2. 全局配置栈中的 `componentName:key`
/// 3. 基础配置栈中的 `key`
/// 4. 全局配置栈中的 `key`
/// 5. 基础栈与全局栈合并后的 `key`
/// 6. 系统属性 `key`
/// 7. `easyconf:companyId`
/// 8. `easyconf:componentName`
///
/// `global_overrides_base` 为 true 时第 3、4 步交换，第 5 步中全局栈排在前面
pub struct AggregatedProperties {
    company_id: Option<String>,
    component_name: String,
    prefix: String,
    system: Arc<SystemProperties>,
    resolver: SourceResolver,
    base: CompositeProperties,
    global: CompositeProperties,
    overrides: RwLock<PropertyMap>,
    loaded_sources: Vec<String>,
    base_loaded: bool,
    global_overrides_base: bool,
}

impl AggregatedProperties {
    pub fn new(
        company_id: Option<&str>,
        component_name: &str,
        system: Arc<SystemProperties>,
        resolver: SourceResolver,
    ) -> Self {
        Self {
            company_id: company_id.map(str::to_string),
            component_name: component_name.to_string(),
            prefix: component_prefix(component_name),
            system,
            resolver,
            base: CompositeProperties::default(),
            global: CompositeProperties::default(),
            overrides: RwLock::new(PropertyMap::new()),
            loaded_sources: Vec::new(),
            base_loaded: false,
            global_overrides_base: false,
        }
    }

    pub fn with_global_overrides_base(mut self, global_overrides_base: bool) -> Self {
        self.global_overrides_base = global_overrides_base;
        self
    }

    /// 加载组件基础配置来源；加载到非空内容时标记基础配置已找到
    pub fn add_base_file_name(&mut self, name: &str) {
        let group = self.load_group(name, Stack::Base, None, &mut Vec::new());
        if group.iter().any(|layer| !layer.is_empty()) {
            self.base_loaded = true;
        }
        for layer in group {
            self.base.push(layer);
        }
    }

    /// 加载全局配置来源
    pub fn add_global_file_name(&mut self, name: &str) {
        let group = self.load_group(name, Stack::Global, None, &mut Vec::new());
        for layer in group {
            self.global.push(layer);
        }
    }

    /// 加载一个来源及其 include 的来源
    ///
    /// 返回的各层按优先级排列：include 的来源在前（第一个 include 优先级最高），
    /// 来源自身在最后
    fn load_group(
        &mut self,
        name: &str,
        stack: Stack,
        inherited_delay: Option<u64>,
        visiting: &mut Vec<String>,
    ) -> Vec<Arc<Layer>> {
        let name = name.trim();
        if name.is_empty() {
            return Vec::new();
        }
        if visiting.iter().any(|v| v == name) || visiting.len() >= MAX_INCLUDE_DEPTH {
            log::warn!("configuration source {} is included recursively, ignored", name);
            return Vec::new();
        }

        let Some(source) = self
            .resolver
            .resolve(name, self.company_id.as_deref(), &self.component_name)
        else {
            return Vec::new();
        };

        let (display_name, file_path) = match &source {
            Source::File(file) => (
                file.path().display().to_string(),
                Some(file.path().to_path_buf()),
            ),
            _ => (name.to_string(), None),
        };

        let layer = match Layer::load(display_name.clone(), source) {
            Ok(layer) => layer,
            Err(e) => {
                log::debug!("configuration source {} ignored: {}", name, e);
                return Vec::new();
            }
        };

        let mut group = Vec::new();
        let layer = match file_path {
            Some(path) => {
                // 自身的值优先，其次继承 include 它的文件，最后取已加载的栈
                let delay = reload_delay(layer.get(RELOAD_DELAY_PROPERTY).as_ref())
                    .or(inherited_delay)
                    .or_else(|| reload_delay(self.stack(stack).get(RELOAD_DELAY_PROPERTY).as_ref()));
                log::debug!("adding file: {}", path.display());

                let layer = match delay {
                    Some(delay) => {
                        log::debug!("file {} will be reloaded every {} seconds", path.display(), delay);
                        layer.with_reload(ReloadStrategy::file_changed(path, delay))
                    }
                    None => layer,
                };
                let layer = Arc::new(layer);

                visiting.push(name.to_string());
                let includes = self.includes_of(&layer);
                for include in includes.iter().rev() {
                    let mut sub_group = self.load_group(include, stack, delay, visiting);
                    sub_group.append(&mut group);
                    group = sub_group;
                }
                visiting.pop();
                layer
            }
            None => Arc::new(layer),
        };

        self.loaded_sources.push(display_name);
        group.push(layer);
        group
    }

    /// 在临时组合中解析 include 列表，以便其中的变量引用系统属性和组件标识
    fn includes_of(&self, layer: &Arc<Layer>) -> Vec<String> {
        let mut markers = PropertyMap::new();
        if let Some(company_id) = &self.company_id {
            markers.insert(COMPANY_ID_PROPERTY, company_id.clone());
        }
        markers.insert(COMPONENT_NAME_PROPERTY, self.component_name.clone());

        let temp = CompositeProperties::new(vec![
            Arc::new(Layer::memory("system:prefixed", self.system.prefixed(&self.prefix))),
            layer.clone(),
            Arc::new(Layer::memory("system", self.system.snapshot())),
            Arc::new(Layer::memory("markers", markers)),
        ]);

        let Some(value) = temp.get(INCLUDE_PROPERTY) else {
            return Vec::new();
        };
        interpolate_value(&value, &|name: &str| temp.get(name))
            .into_vec()
            .into_iter()
            .flat_map(|item| {
                item.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn stack(&self, stack: Stack) -> &CompositeProperties {
        match stack {
            Stack::Base => &self.base,
            Stack::Global => &self.global,
        }
    }

    /// 按固定顺序查找
    ///
    /// # 参数
    /// - `key`: 属性键
    /// - `variables`: 仅对本次查找生效的变量，优先级最高
    pub fn get(&self, key: &str, variables: Option<&PropertyMap>) -> Option<PropertyValue> {
        if let Some(value) = variables.and_then(|vars| vars.get(key)) {
            return Some(value.clone());
        }
        if let Some(value) = self
            .overrides
            .read()
            .ok()
            .and_then(|overrides| overrides.get(key).cloned())
        {
            return Some(value);
        }

        let prefixed = format!("{}{}", self.prefix, key);
        if let Some(value) = self.system.get_value(&prefixed) {
            return Some(value);
        }
        if let Some(value) = self.global.get(&prefixed) {
            return Some(value);
        }

        let (first, second) = if self.global_overrides_base {
            (&self.global, &self.base)
        } else {
            (&self.base, &self.global)
        };
        if let Some(value) = first.get(key) {
            return Some(value);
        }
        if let Some(value) = second.get(key) {
            return Some(value);
        }
        if let Some(value) = first.chain(second).get(key) {
            return Some(value);
        }

        if let Some(value) = self.system.get_value(key) {
            return Some(value);
        }
        if key == COMPANY_ID_PROPERTY {
            if let Some(company_id) = &self.company_id {
                return Some(PropertyValue::from(company_id.as_str()));
            }
        }
        if key == COMPONENT_NAME_PROPERTY {
            return Some(PropertyValue::from(self.component_name.as_str()));
        }
        None
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key, None).is_some()
    }

    /// 覆盖值、基础栈、全局栈中所有键的并集
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .overrides
            .read()
            .map(|overrides| overrides.keys().map(str::to_string).collect())
            .unwrap_or_default();
        for key in self.base.chain(&self.global).keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// 设置运行期覆盖值，优先于所有配置来源
    pub fn set_property(&self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        if let Ok(mut overrides) = self.overrides.write() {
            overrides.insert(key, value);
        }
    }

    pub fn clear_property(&self, key: &str) {
        if let Ok(mut overrides) = self.overrides.write() {
            overrides.remove(key);
        }
    }

    /// 已加载的所有来源，按加载顺序
    pub fn loaded_sources(&self) -> &[String] {
        &self.loaded_sources
    }

    pub fn has_base_configuration(&self) -> bool {
        self.base_loaded
    }

    /// 组件配置的重载间隔（秒）
    pub fn delay_period(&self) -> Option<u64> {
        reload_delay(self.get(RELOAD_DELAY_PROPERTY, None).as_ref())
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    pub fn company_id(&self) -> Option<&str> {
        self.company_id.as_deref()
    }

    pub fn system(&self) -> &Arc<SystemProperties> {
        &self.system
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    pub fn base(&self) -> &CompositeProperties {
        &self.base
    }

    pub fn global(&self) -> &CompositeProperties {
        &self.global
    }
}

impl std::fmt::Debug for AggregatedProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatedProperties")
            .field("company_id", &self.company_id)
            .field("component_name", &self.component_name)
            .field("loaded_sources", &self.loaded_sources)
            .field("base_loaded", &self.base_loaded)
            .finish()
    }
}

fn reload_delay(value: Option<&PropertyValue>) -> Option<u64> {
    let raw = value?.first()?.trim();
    match raw.parse::<u64>() {
        Ok(delay) => Some(delay),
        Err(_) => {
            log::warn!("invalid {} value: {}", RELOAD_DELAY_PROPERTY, raw);
            None
        }
    }
}
