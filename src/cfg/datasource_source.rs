//! 数据源配置源
//!
//! `datasource:<name>` 形式的来源从表中读取属性：
//! 行条件为 `component = companyId:componentName`，列为 (component, key, value)。
//! 具体的数据库访问由调用方实现 `Datasource` 并注册到 `DatasourceRegistry`。

use dashmap::DashMap;
use std::sync::{Arc, RwLock};

use super::conventions::DATASOURCE_PREFIX;
use super::error::Result;
use super::value::PropertyMap;

/// 数据源查找时依次尝试的名称前缀
const DATASOURCE_FINDERS: [&str; 2] = ["java:/comp/env/", ""];

/// 表形式的属性后端
///
/// 每张表有 `component`、`key`、`value` 三列，`component` 取值为
/// `companyId:componentName`，没有公司时为 `componentName`
pub trait Datasource: Send + Sync {
    /// 读取某个组件在表中的所有 (key, value) 行
    fn fetch(&self, table: &str, component: &str) -> anyhow::Result<Vec<(String, String)>>;

    /// 写入或更新一行
    fn store(&self, table: &str, component: &str, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    table: String,
    component: String,
    key: String,
    value: String,
}

/// 内存实现，主要用于测试和嵌入式场景
#[derive(Debug, Default)]
pub struct MemoryDatasource {
    rows: RwLock<Vec<Row>>,
}

impl MemoryDatasource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Datasource for MemoryDatasource {
    fn fetch(&self, table: &str, component: &str) -> anyhow::Result<Vec<(String, String)>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| anyhow::anyhow!("Failed to acquire read lock"))?;
        Ok(rows
            .iter()
            .filter(|row| row.table == table && row.component == component)
            .map(|row| (row.key.clone(), row.value.clone()))
            .collect())
    }

    fn store(&self, table: &str, component: &str, key: &str, value: &str) -> anyhow::Result<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| anyhow::anyhow!("Failed to acquire write lock"))?;
        match rows
            .iter_mut()
            .find(|row| row.table == table && row.component == component && row.key == key)
        {
            Some(row) => row.value = value.to_string(),
            None => rows.push(Row {
                table: table.to_string(),
                component: component.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
        Ok(())
    }
}

/// 按名称注册的数据源
#[derive(Default)]
pub struct DatasourceRegistry {
    datasources: DashMap<String, Arc<dyn Datasource>>,
}

impl DatasourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, datasource: Arc<dyn Datasource>) {
        self.datasources.insert(name.into(), datasource);
    }

    /// 先按 `java:/comp/env/<name>` 查找，再按 `<name>` 查找
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Datasource>> {
        DATASOURCE_FINDERS.iter().find_map(|prefix| {
            let candidate = format!("{}{}", prefix, name);
            match self.datasources.get(&candidate) {
                Some(ds) => Some(ds.value().clone()),
                None => {
                    log::debug!("datasource {} not found", candidate);
                    None
                }
            }
        })
    }
}

/// 指向数据源中某张表的地址
#[derive(Debug, Clone, PartialEq)]
pub struct DatasourceUrl {
    datasource_name: String,
    company_id: Option<String>,
    component_name: String,
    table: String,
}

impl DatasourceUrl {
    /// # 参数
    /// - `path`: `datasource:<name>` 形式的来源标识
    pub fn new(path: &str, company_id: Option<&str>, component_name: &str, table: &str) -> Self {
        Self {
            datasource_name: path
                .strip_prefix(DATASOURCE_PREFIX)
                .unwrap_or(path)
                .to_string(),
            company_id: company_id.map(str::to_string),
            component_name: component_name.to_string(),
            table: table.to_string(),
        }
    }

    pub fn is_datasource(path: &str) -> bool {
        path.starts_with(DATASOURCE_PREFIX)
    }

    pub fn datasource_name(&self) -> &str {
        &self.datasource_name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// component 列的取值
    pub fn component_value(&self) -> String {
        match &self.company_id {
            Some(company_id) => format!("{}:{}", company_id, self.component_name),
            None => self.component_name.clone(),
        }
    }
}

impl std::fmt::Display for DatasourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", DATASOURCE_PREFIX, self.datasource_name)
    }
}

/// 绑定了后端的数据源来源
pub struct DatasourceSource {
    url: DatasourceUrl,
    backend: Arc<dyn Datasource>,
}

impl DatasourceSource {
    pub fn new(url: DatasourceUrl, backend: Arc<dyn Datasource>) -> Self {
        Self { url, backend }
    }

    pub fn url(&self) -> &DatasourceUrl {
        &self.url
    }

    pub fn load(&self) -> Result<PropertyMap> {
        let rows = self
            .backend
            .fetch(self.url.table(), &self.url.component_value())?;
        Ok(rows.into_iter().collect())
    }

    /// 读取单个键
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let rows = self
            .backend
            .fetch(self.url.table(), &self.url.component_value())?;
        Ok(rows.into_iter().find(|(k, _)| k == key).map(|(_, v)| v))
    }

    pub fn store(&self, key: &str, value: &str) -> Result<()> {
        self.backend
            .store(self.url.table(), &self.url.component_value(), key, value)?;
        Ok(())
    }
}
