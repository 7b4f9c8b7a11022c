//! `${name}` 变量替换

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::value::PropertyValue;

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("variable pattern is valid")
});

/// 嵌套替换的最大深度，防止循环引用
const MAX_DEPTH: usize = 16;

/// 判断字符串中是否包含变量引用
pub fn has_variables(s: &str) -> bool {
    VARIABLE.is_match(s)
}

/// 替换字符串中的 `${name}`
///
/// 变量值本身也可以包含变量，会继续展开；无法解析的引用原样保留
///
/// # 参数
/// - `s`: 待替换的字符串
/// - `lookup`: 变量查找函数
pub fn interpolate<F>(s: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<PropertyValue>,
{
    interpolate_depth(s, lookup, 0)
}

fn interpolate_depth<F>(s: &str, lookup: &F, depth: usize) -> String
where
    F: Fn(&str) -> Option<PropertyValue>,
{
    if depth >= MAX_DEPTH || !has_variables(s) {
        return s.to_string();
    }

    VARIABLE
        .replace_all(s, |caps: &regex_lite::Captures| {
            let name = &caps[1];
            match lookup(name) {
                Some(value) => interpolate_depth(&value.joined(), lookup, depth + 1),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// 对属性值中的每个元素做变量替换
pub fn interpolate_value<F>(value: &PropertyValue, lookup: &F) -> PropertyValue
where
    F: Fn(&str) -> Option<PropertyValue>,
{
    match value {
        PropertyValue::Single(s) => PropertyValue::Single(interpolate(s, lookup)),
        PropertyValue::List(items) => {
            PropertyValue::List(items.iter().map(|s| interpolate(s, lookup)).collect())
        }
    }
}

/// 查找字符串中第一个无法解析的变量
pub fn first_unresolved(s: &str) -> Option<String> {
    VARIABLE.captures(s).map(|caps| caps[1].to_string())
}
