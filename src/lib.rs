//! EasyConf - 分层配置聚合库
//!
//! 组件的属性从系统属性、命名服务、数据源以及级联的属性文件中聚合而来，
//! 支持按选择器特化属性值。
//!
//! ## 模块
//!
//! - **cfg**: 配置来源、分层合并、类型化访问以及组件配置注册表
//!
//! ## 查找规则
//!
//! - 按优先级排列的多层来源，下标 0 优先级最高
//! - `key+` 在已有值之上追加，而不是覆盖
//! - `key[sel1][sel2]` 形式的选择器后缀，从最具体向最不具体回退
//! - `${name}` 变量替换
//! - 设置了 `easyconf:reload-delay` 的文件在修改后重新加载

pub mod cfg;

// 重新导出主要的公共 API
pub use cfg::{
    ComponentConfiguration, ComponentProperties, ConfError, EasyConf, EasyConfConfig, Filter,
    PropertyMap, PropertyValue,
};
