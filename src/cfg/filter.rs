//! 属性过滤器
//!
//! 由有序的选择器（构造 `key[sel1][sel2]` 形式的后缀）和/或替换变量组成

use std::collections::HashMap;

use super::conventions::{SELECTOR_END, SELECTOR_START};

/// 属性过滤器
///
/// # 示例
/// ```
/// use easyconf::cfg::Filter;
///
/// let filter = Filter::by(["env", "prod"]);
/// assert_eq!(filter.suffix(2), "[env][prod]");
/// assert_eq!(filter.suffix(1), "[env]");
/// assert_eq!(filter.suffix(0), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    selectors: Vec<String>,
    variables: HashMap<String, String>,
}

impl Filter {
    /// 不带选择器和变量的空过滤器
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
            variables: HashMap::new(),
        }
    }

    pub fn using_variables<I, K, V>(variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::none().with_variables(variables)
    }

    pub fn with_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn with_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    pub fn num_of_selectors(&self) -> usize {
        self.selectors.len()
    }

    /// 由前 n 个选择器拼接的后缀
    ///
    /// n 超过选择器个数时按全部选择器处理
    pub fn suffix(&self, n: usize) -> String {
        let n = n.min(self.selectors.len());
        let mut suffix = String::new();
        for selector in &self.selectors[..n] {
            suffix.push(SELECTOR_START);
            suffix.push_str(selector);
            suffix.push(SELECTOR_END);
        }
        suffix
    }

    /// 按从最具体到最不具体的顺序返回所有后缀，最后一个总是空后缀
    pub fn suffixes(&self) -> Vec<String> {
        (0..=self.selectors.len()).rev().map(|n| self.suffix(n)).collect()
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix(self.selectors.len()))
    }
}
