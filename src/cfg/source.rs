//! 配置来源抽象
//!
//! 提供统一的来源表示：文件、数据源、JNDI、注册类以及内存属性表。
//! 每种来源都能把自身加载为一个 `PropertyMap`；加载后的来源作为一层（`Layer`）
//! 放入优先级栈中，并按需根据重载策略刷新内容。

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex};

use super::datasource_source::DatasourceSource;
use super::error::Result;
use super::file_source::FileSource;
use super::jndi_source::JndiSource;
use super::reload::ReloadStrategy;
use super::value::{PropertyMap, PropertyValue};

/// 可注册为 `class:<name>` 的自定义来源
///
/// # 示例
/// ```no_run
/// use easyconf::cfg::{PropertyMap, PropertySource};
///
/// #[derive(Default)]
/// struct BuildInfo;
///
/// impl PropertySource for BuildInfo {
///     fn name(&self) -> String {
///         "build-info".to_string()
///     }
///
///     fn load(&self) -> anyhow::Result<PropertyMap> {
///         let mut map = PropertyMap::new();
///         map.insert("version", env!("CARGO_PKG_VERSION"));
///         Ok(map)
///     }
/// }
/// ```
pub trait PropertySource: Send + Sync {
    /// 来源名称，用于日志和 loaded sources 列表
    fn name(&self) -> String;

    /// 加载全部属性
    fn load(&self) -> anyhow::Result<PropertyMap>;
}

/// 来源类型
pub enum Source {
    File(FileSource),
    Datasource(DatasourceSource),
    Jndi(JndiSource),
    Class(Box<dyn PropertySource>),
    /// 内存属性表，内容在创建时给定，不会重新加载
    Memory,
}

impl Source {
    pub fn kind(&self) -> &'static str {
        match self {
            Source::File(_) => "file",
            Source::Datasource(_) => "datasource",
            Source::Jndi(_) => "jndi",
            Source::Class(_) => "class",
            Source::Memory => "memory",
        }
    }

    /// 从后端读取全部属性
    pub fn load(&self) -> Result<Option<PropertyMap>> {
        match self {
            Source::File(source) => source.load().map(Some),
            Source::Datasource(source) => source.load().map(Some),
            Source::Jndi(source) => source.load().map(Some),
            Source::Class(source) => Ok(Some(source.load()?)),
            Source::Memory => Ok(None),
        }
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(source) => write!(f, "File({})", source.path().display()),
            Source::Datasource(source) => write!(f, "Datasource({})", source.url()),
            Source::Jndi(source) => write!(f, "Jndi({})", source.url().prefix()),
            Source::Class(source) => write!(f, "Class({})", source.name()),
            Source::Memory => write!(f, "Memory"),
        }
    }
}

/// 优先级栈中的一层
///
/// 内容保存在 `ArcSwap` 中，读者总是看到完整的旧内容或完整的新内容；
/// 重载检查与替换在该层自己的锁内完成。
pub struct Layer {
    name: String,
    source: Source,
    content: ArcSwap<PropertyMap>,
    reload: Option<Mutex<ReloadStrategy>>,
}

impl Layer {
    /// 加载来源并创建一层，来源不存在内容时返回空表
    pub fn load(name: impl Into<String>, source: Source) -> Result<Self> {
        let content = source.load()?.unwrap_or_default();
        Ok(Self {
            name: name.into(),
            source,
            content: ArcSwap::from_pointee(content),
            reload: None,
        })
    }

    /// 内存层
    pub fn memory(name: impl Into<String>, content: PropertyMap) -> Self {
        Self {
            name: name.into(),
            source: Source::Memory,
            content: ArcSwap::from_pointee(content),
            reload: None,
        }
    }

    pub fn with_reload(mut self, strategy: ReloadStrategy) -> Self {
        self.reload = match strategy {
            ReloadStrategy::Invariant => None,
            strategy => Some(Mutex::new(strategy)),
        };
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn is_reloadable(&self) -> bool {
        self.reload.is_some()
    }

    /// 当前内容；必要时先执行重载
    pub fn snapshot(&self) -> Arc<PropertyMap> {
        self.reload_if_needed();
        self.content.load_full()
    }

    pub fn get(&self, key: &str) -> Option<PropertyValue> {
        self.snapshot().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.snapshot().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn reload_if_needed(&self) {
        let Some(lock) = &self.reload else {
            return;
        };
        let Ok(mut strategy) = lock.lock() else {
            return;
        };
        if !strategy.reloading_required() {
            return;
        }

        match self.source.load() {
            Ok(Some(content)) => {
                self.content.store(Arc::new(content));
                strategy.reloading_performed();
                log::info!("reloaded configuration source {}", self.name);
            }
            Ok(None) => strategy.reloading_performed(),
            // 重载失败时保留旧内容
            Err(e) => log::error!("error reloading {}: {}", self.name, e),
        }
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("reloadable", &self.is_reloadable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource;

    impl PropertySource for StaticSource {
        fn name(&self) -> String {
            "static".to_string()
        }

        fn load(&self) -> anyhow::Result<PropertyMap> {
            let mut map = PropertyMap::new();
            map.insert("from", "class");
            Ok(map)
        }
    }

    #[test]
    fn test_memory_layer() {
        let mut map = PropertyMap::new();
        map.insert("k", "v");
        let layer = Layer::memory("vars", map);

        assert_eq!(layer.get("k"), Some(PropertyValue::from("v")));
        assert!(!layer.contains_key("missing"));
        assert!(!layer.is_reloadable());
        assert_eq!(layer.source().kind(), "memory");
    }

    #[test]
    fn test_class_layer() {
        let layer = Layer::load("class:static", Source::Class(Box::new(StaticSource))).unwrap();
        assert_eq!(layer.get("from"), Some(PropertyValue::from("class")));
        assert_eq!(layer.name(), "class:static");
    }
}
