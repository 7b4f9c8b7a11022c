use super::value::PropertyValue;

/// 从原始属性值转换为目标类型的 trait
///
/// 标量类型取列表的第一个元素；字符串把列表重新拼接为逗号分隔的形式
///
/// 小数只转换为二进制浮点数 `f32`/`f64`，`0.1` 这样的值无法精确表示；
/// 需要精确十进制时用 `String` 取原文，再交给调用方选用的十进制类型解析
pub trait FromProperty: Sized {
    /// 类型名称，用于错误信息
    const TYPE_NAME: &'static str;

    /// 从原始属性值转换
    ///
    /// # 返回
    /// - Ok(T): 转换成功
    /// - Err(String): 转换失败的原因
    fn from_property(value: &PropertyValue) -> Result<Self, String>;
}

impl FromProperty for String {
    const TYPE_NAME: &'static str = "String";

    fn from_property(value: &PropertyValue) -> Result<Self, String> {
        Ok(value.joined())
    }
}

impl FromProperty for Vec<String> {
    const TYPE_NAME: &'static str = "List";

    fn from_property(value: &PropertyValue) -> Result<Self, String> {
        Ok(value.to_vec())
    }
}

fn scalar(value: &PropertyValue) -> Result<&str, String> {
    value
        .first()
        .map(|s| s.trim())
        .ok_or_else(|| "empty list".to_string())
}

// 为数字类型实现的宏
macro_rules! impl_from_property_numeric {
    ($($ty:ty),*) => {
        $(
            impl FromProperty for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_property(value: &PropertyValue) -> Result<Self, String> {
                    let s = scalar(value)?;
                    s.parse::<$ty>().map_err(|e| e.to_string())
                }
            }
        )*
    };
}

impl_from_property_numeric!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

// 为 bool 实现，兼容 yes/no 与 on/off
impl FromProperty for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_property(value: &PropertyValue) -> Result<Self, String> {
        let s = scalar(value)?;
        match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => Ok(true),
            "false" | "no" | "off" => Ok(false),
            _ => Err(format!("'{}' is not a boolean", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_joins_list() {
        let value = PropertyValue::List(vec!["1".into(), "2".into(), "3".into()]);
        let result: String = FromProperty::from_property(&value).unwrap();
        assert_eq!(result, "1,2,3");
    }

    #[test]
    fn test_parse_i32() {
        let result: i32 = FromProperty::from_property(&PropertyValue::from(" 42 ")).unwrap();
        assert_eq!(result, 42);

        let result: Result<i32, _> = FromProperty::from_property(&PropertyValue::from("invalid"));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_byte_overflow() {
        let result: Result<i8, _> = FromProperty::from_property(&PropertyValue::from("300"));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_numeric_from_list_uses_first() {
        let value = PropertyValue::List(vec!["7".into(), "8".into()]);
        let result: i64 = FromProperty::from_property(&value).unwrap();
        assert_eq!(result, 7);
    }

    #[test]
    fn test_parse_bool() {
        for s in ["true", "YES", "on"] {
            let result: bool = FromProperty::from_property(&PropertyValue::from(s)).unwrap();
            assert!(result);
        }
        for s in ["false", "No", "OFF"] {
            let result: bool = FromProperty::from_property(&PropertyValue::from(s)).unwrap();
            assert!(!result);
        }
        let result: Result<bool, _> = FromProperty::from_property(&PropertyValue::from("maybe"));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_f64() {
        let result: f64 = FromProperty::from_property(&PropertyValue::from("1234")).unwrap();
        assert_eq!(result, 1234.0);
    }

    #[test]
    fn test_decimal_text_is_preserved_as_string() {
        let value = PropertyValue::from("0.10");
        let text: String = FromProperty::from_property(&value).unwrap();
        assert_eq!(text, "0.10");

        let result: f64 = FromProperty::from_property(&value).unwrap();
        assert_eq!(result, 0.1);
    }
}
