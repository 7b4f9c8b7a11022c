//! 约定常量
//!
//! 保留属性名、来源前缀以及文件命名规则

pub const SELECTOR_START: char = '[';
pub const SELECTOR_END: char = ']';
pub const DOT: char = '.';
/// 公司专属文件名中的分隔符，如 `demo-acme.properties`
pub const COMPANY_SEPARATOR: char = '-';
/// 追加合并后缀：`key+=value` 表示在已有值之上追加
pub const PLUS_SIGN: &str = "+";
/// 组件前缀分隔符：`componentName:key`
pub const PREFIX_SEPARATOR: &str = ":";

pub const INCLUDE_PROPERTY: &str = "include-and-override";
pub const GLOBAL_CONFIGURATION_FILE: &str = "global-configuration";
pub const PROPERTIES_EXTENSION: &str = ".properties";

pub const DATASOURCE_PREFIX: &str = "datasource:";
pub const JNDI_PREFIX: &str = "jndi:";
pub const CLASS_PREFIX: &str = "class:";

pub const RELOAD_DELAY_PROPERTY: &str = "easyconf:reload-delay";
pub const CONFIGURATION_OBJECTS_SOURCE_PROPERTY: &str = "easyconf:configuration-objects-source";

pub const CONFIGURATION_OBJECTS_TABLE: &str = "easyconf_configuration_objects";
pub const PROPERTIES_TABLE: &str = "easyconf_properties";

pub const COMPANY_ID_PROPERTY: &str = "easyconf:companyId";
pub const COMPONENT_NAME_PROPERTY: &str = "easyconf:componentName";

pub const DEFAULT_CONF_OBJECT_NAME: &str = "DEFAULT_CONF_OBJECT";

/// 配置对象文件支持的扩展名，按查找顺序排列
pub const OBJECT_FILE_EXTENSIONS: [&str; 4] = ["json", "yaml", "yml", "toml"];

/// 属性文件名：`<name>.properties`，用于组件基础文件和全局文件
pub fn properties_file_name(name: &str) -> String {
    format!("{}{}", name, PROPERTIES_EXTENSION)
}

/// 公司专属文件名：在扩展名前插入 `-<companyId>`
pub fn company_file_name(name: &str, company_id: &str) -> String {
    format!("{}{}{}{}", name, COMPANY_SEPARATOR, company_id, PROPERTIES_EXTENSION)
}

/// 组件前缀：`<component>:`
pub fn component_prefix(component_name: &str) -> String {
    format!("{}{}", component_name, PREFIX_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(properties_file_name("demo"), "demo.properties");
        assert_eq!(company_file_name("demo", "acme"), "demo-acme.properties");
        assert_eq!(
            company_file_name(GLOBAL_CONFIGURATION_FILE, "acme"),
            "global-configuration-acme.properties"
        );
        assert_eq!(component_prefix("demo"), "demo:");
    }
}
