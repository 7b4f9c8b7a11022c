// 按名称注册的类型工厂
//
// 属性值中的类名（`class:<name>` 来源或 get_class 类访问器）在这里解析为工厂函数。
// 类型约束在注册时由编译器检查，查找时只需要名称。

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use super::error::{ConfError, Result};
use super::source::PropertySource;

// 构造函数类型
type Constructor = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

// 来源构造函数类型
type SourceConstructor = Arc<dyn Fn() -> Box<dyn PropertySource> + Send + Sync>;

/// 已解析的类引用
#[derive(Clone)]
pub struct ClassRef {
    name: String,
    type_name: &'static str,
    ctor: Constructor,
}

impl ClassRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 注册类型的完整 Rust 类型名
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 创建一个新实例
    pub fn new_instance(&self) -> Box<dyn Any + Send + Sync> {
        (self.ctor)()
    }

    /// 创建实例并转换为具体类型，类型不匹配时返回 None
    pub fn instantiate<T: 'static>(&self) -> Option<T> {
        self.new_instance().downcast::<T>().ok().map(|b| *b)
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRef")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_name == other.type_name
    }
}

/// 类型注册表
///
/// # 示例
/// ```
/// use easyconf::cfg::ClassRegistry;
///
/// #[derive(Default, Debug, PartialEq)]
/// struct RoundRobin;
///
/// let registry = ClassRegistry::new();
/// registry.register_class::<RoundRobin>("com.example.RoundRobin").unwrap();
///
/// let class = registry.locate_class("com.example.RoundRobin").unwrap();
/// assert_eq!(class.instantiate::<RoundRobin>(), Some(RoundRobin));
/// assert!(registry.locate_class("com.example.Missing").is_err());
/// ```
#[derive(Default)]
pub struct ClassRegistry {
    classes: RwLock<HashMap<String, ClassRef>>,
    sources: RwLock<HashMap<String, SourceConstructor>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定名称注册类型
    pub fn register_class<T>(&self, name: &str) -> Result<()>
    where
        T: Default + Send + Sync + 'static,
    {
        let class = ClassRef {
            name: name.to_string(),
            type_name: type_name::<T>(),
            ctor: Arc::new(|| Box::new(T::default())),
        };
        let mut classes = self
            .classes
            .write()
            .map_err(|_| ConfError::InvalidConfig("Failed to acquire write lock".to_string()))?;
        classes.insert(name.to_string(), class);
        Ok(())
    }

    /// 同时以完整类型名和简短类型名注册
    pub fn register<T>(&self) -> Result<()>
    where
        T: Default + Send + Sync + 'static,
    {
        let full_type_name = type_name::<T>();
        self.register_class::<T>(full_type_name)?;
        self.register_class::<T>(short_type_name(full_type_name))?;
        Ok(())
    }

    /// 注册可作为 `class:<name>` 使用的来源类型
    ///
    /// 类型必须实现 `PropertySource`，同时也会注册为普通类
    pub fn register_source<T>(&self, name: &str) -> Result<()>
    where
        T: PropertySource + Default + 'static,
    {
        self.register_class::<T>(name)?;
        let ctor: SourceConstructor = Arc::new(|| Box::new(T::default()));
        let mut sources = self
            .sources
            .write()
            .map_err(|_| ConfError::InvalidConfig("Failed to acquire write lock".to_string()))?;
        sources.insert(name.to_string(), ctor);
        Ok(())
    }

    /// 按名称查找类型
    pub fn locate_class(&self, name: &str) -> Result<ClassRef> {
        let name = name.trim();
        self.classes
            .read()
            .ok()
            .and_then(|classes| classes.get(name).cloned())
            .ok_or_else(|| ConfError::ClassNotFound {
                name: name.to_string(),
            })
    }

    /// 创建注册的来源实例，未注册或不是来源类型时返回 None
    pub fn create_source(&self, name: &str) -> Option<Box<dyn PropertySource>> {
        let ctor = self.sources.read().ok()?.get(name.trim()).cloned()?;
        Some(ctor())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.classes
            .read()
            .map(|classes| classes.contains_key(name))
            .unwrap_or(false)
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self
            .classes
            .read()
            .map(|classes| classes.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        f.debug_struct("ClassRegistry").field("classes", &names).finish()
    }
}

/// 去掉模块路径，保留类型名，如 `my_crate::lb::RoundRobin` -> `RoundRobin`
fn short_type_name(full_name: &str) -> &str {
    let main_part = full_name.split('<').next().unwrap_or(full_name);
    main_part.rsplit("::").next().unwrap_or(main_part)
}
