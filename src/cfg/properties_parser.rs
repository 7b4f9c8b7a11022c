use serde::Deserialize;
use smart_default::SmartDefault;

use super::error::{ConfError, Result};
use super::value::{PropertyMap, PropertyValue};

/// PropertiesParser 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct PropertiesParserConfig {
    /// 列表分隔符，值中未转义的分隔符会把值拆分为列表
    #[default = ',']
    pub list_delimiter: char,

    /// 是否拆分列表值
    #[default = true]
    pub delimiter_parsing: bool,
}

/// `.properties` 格式解析器
///
/// 解析规则：
/// - `#` 与 `!` 开头的行为注释，空行忽略
/// - 行尾的 `\` 表示续行
/// - 键值以第一个未转义的 `=` 分隔，没有 `=` 时以第一个空白分隔
/// - 同一文件中重复出现的键累积为列表
///
/// # 示例
/// ```
/// use easyconf::cfg::{PropertiesParser, PropertiesParserConfig};
///
/// let parser = PropertiesParser::new(PropertiesParserConfig::default());
/// let map = parser.parse("demo.properties", "hosts=a,b\ntimeout=30").unwrap();
/// assert_eq!(map.get("timeout").unwrap().joined(), "30");
/// assert_eq!(map.get("hosts").unwrap().to_vec(), vec!["a", "b"]);
/// ```
pub struct PropertiesParser {
    list_delimiter: char,
    delimiter_parsing: bool,
}

impl PropertiesParser {
    pub fn new(config: PropertiesParserConfig) -> Self {
        Self {
            list_delimiter: config.list_delimiter,
            delimiter_parsing: config.delimiter_parsing,
        }
    }

    /// 解析完整文件内容
    ///
    /// # 参数
    /// - source_name: 来源名称，仅用于错误信息
    /// - content: 文件内容
    pub fn parse(&self, source_name: &str, content: &str) -> Result<PropertyMap> {
        let mut map = PropertyMap::new();
        for line in logical_lines(content) {
            let (raw_key, raw_value) = split_key_value(&line);
            let key = unescape(raw_key, source_name)?.trim().to_string();
            if key.is_empty() {
                continue;
            }
            let value = self.parse_value(raw_value.trim(), source_name)?;
            map.add(key, value);
        }
        Ok(map)
    }

    fn parse_value(&self, raw: &str, source_name: &str) -> Result<PropertyValue> {
        if !self.delimiter_parsing {
            return Ok(PropertyValue::Single(unescape(raw, source_name)?));
        }

        let parts = split_unescaped(raw, self.list_delimiter);
        if parts.len() == 1 {
            return Ok(PropertyValue::Single(unescape(parts[0], source_name)?.trim().to_string()));
        }

        let items = parts
            .into_iter()
            .map(|p| unescape(p, source_name).map(|s| s.trim().to_string()))
            .collect::<Result<Vec<_>>>()?;
        Ok(PropertyValue::List(items))
    }
}

impl Default for PropertiesParser {
    fn default() -> Self {
        Self::new(PropertiesParserConfig::default())
    }
}

impl From<PropertiesParserConfig> for PropertiesParser {
    fn from(config: PropertiesParserConfig) -> Self {
        Self::new(config)
    }
}

/// 合并续行并去掉注释与空行
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for physical in content.lines() {
        let trimmed = physical.trim_start();
        let continuing = current.is_some();

        if !continuing && (trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!')) {
            continue;
        }

        let (text, continues) = strip_continuation(trimmed);
        let mut line = current.take().unwrap_or_default();
        line.push_str(text);

        if continues {
            current = Some(line);
        } else {
            lines.push(line);
        }
    }

    if let Some(line) = current {
        lines.push(line);
    }
    lines
}

/// 行尾奇数个反斜杠表示续行
fn strip_continuation(line: &str) -> (&str, bool) {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    if trailing % 2 == 1 {
        (&line[..line.len() - 1], true)
    } else {
        (line, false)
    }
}

fn split_key_value(line: &str) -> (&str, &str) {
    if let Some(idx) = find_unescaped(line, |c| c == '=') {
        return (&line[..idx], &line[idx + 1..]);
    }
    if let Some(idx) = find_unescaped(line, char::is_whitespace) {
        return (&line[..idx], &line[idx + 1..]);
    }
    (line, "")
}

fn find_unescaped(s: &str, pred: impl Fn(char) -> bool) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if pred(c) {
            return Some(idx);
        }
    }
    None
}

fn split_unescaped(s: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(idx) = find_unescaped(rest, |c| c == delimiter) {
        parts.push(&rest[..idx]);
        rest = &rest[idx + delimiter.len_utf8()..];
    }
    parts.push(rest);
    parts
}

fn unescape(s: &str, source_name: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| ConfError::Parse {
                        source_name: source_name.to_string(),
                        message: format!("malformed \\u escape: \\u{}", hex),
                    })?;
                out.push(code);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> PropertyMap {
        PropertiesParser::default().parse("test.properties", content).unwrap()
    }

    #[test]
    fn test_parse_basic() {
        let map = parse(
            r#"
# comment
! another comment
name = demo
empty=
spaced value
"#,
        );

        assert_eq!(map.get("name"), Some(&PropertyValue::from("demo")));
        assert_eq!(map.get("empty"), Some(&PropertyValue::from("")));
        assert_eq!(map.get("spaced"), Some(&PropertyValue::from("value")));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_parse_colon_in_key() {
        let map = parse("easyconf:reload-delay=5\ndemo:timeout = 30");

        assert_eq!(map.get("easyconf:reload-delay"), Some(&PropertyValue::from("5")));
        assert_eq!(map.get("demo:timeout"), Some(&PropertyValue::from("30")));
    }

    #[test]
    fn test_parse_list_and_repeated_keys() {
        let map = parse("k=v1\nk+=v2\nk+=v3\nlist=a, b ,c");

        assert_eq!(map.get("k"), Some(&PropertyValue::from("v1")));
        assert_eq!(
            map.get("k+"),
            Some(&PropertyValue::List(vec!["v2".into(), "v3".into()]))
        );
        assert_eq!(
            map.get("list"),
            Some(&PropertyValue::List(vec!["a".into(), "b".into(), "c".into()]))
        );
    }

    #[test]
    fn test_parse_escapes_and_continuation() {
        let map = parse("path=a\\,b\nmulti=one,\\\n    two\nunicode=\\u0041\\tB\nkey\\=with=eq");

        assert_eq!(map.get("path"), Some(&PropertyValue::from("a,b")));
        assert_eq!(
            map.get("multi"),
            Some(&PropertyValue::List(vec!["one".into(), "two".into()]))
        );
        assert_eq!(map.get("unicode"), Some(&PropertyValue::from("A\tB")));
        assert_eq!(map.get("key=with"), Some(&PropertyValue::from("eq")));
    }

    #[test]
    fn test_parse_without_delimiter_parsing() {
        let parser = PropertiesParser::new(PropertiesParserConfig {
            delimiter_parsing: false,
            ..Default::default()
        });
        let map = parser.parse("t", "list=a,b").unwrap();
        assert_eq!(map.get("list"), Some(&PropertyValue::from("a,b")));
    }

    #[test]
    fn test_parse_malformed_unicode() {
        let result = PropertiesParser::default().parse("bad.properties", "k=\\uZZZZ");
        assert!(matches!(result, Err(ConfError::Parse { .. })));
    }
}
