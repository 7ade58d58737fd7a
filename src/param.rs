// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由协议参数与常量模块
//!
//! 该模块定义了路由层遵循的 HTTP 协议相关常量和数据结构，包括：
//! - 路由错误对应的 HTTP 状态码及其原因短语（Reason Phrase）。
//! - 路由缓存文件的命名与版本常量。
//! - HTTP 方法的强类型枚举。

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::exception::Exception;

/// 路由缓存文件名，位于配置的缓存目录下
pub const CACHE_FILE_NAME: &str = "cache_routes.json";

/// 缓存文件的结构版本。结构发生变化时递增，旧缓存会被视为失效。
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// 匹配成功后写入请求属性的路由名称键
pub const ROUTE_ATTRIBUTE: &str = "_route";

/// 匹配成功后写入请求属性的控制器键，值为 `控制器标识::入口方法名`
pub const CONTROLLER_ATTRIBUTE: &str = "_controller";

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    ///
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        // 4xx: 客户端错误 (Client Error)
        map.insert(400, "Bad Request");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");

        // 5xx: 服务端错误 (Server Error)
        map.insert(500, "Internal Server Error");
        map
    };
}

/// 标准 HTTP 请求方法
///
/// 派生 `Ord` 以便在路由中以 `BTreeSet` 存放，保证序列化结果稳定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
    /// 获取资源的元数据（不包含响应体）
    Head,
    /// 提交数据或执行操作
    Post,
    /// 整体替换资源
    Put,
    /// 局部更新资源
    Patch,
    /// 删除资源
    Delete,
    /// 查询服务器支持的选项
    Options,
}

impl HttpRequestMethod {
    /// 全部受支持的方法
    pub const ALL: [HttpRequestMethod; 7] = [
        HttpRequestMethod::Get,
        HttpRequestMethod::Head,
        HttpRequestMethod::Post,
        HttpRequestMethod::Put,
        HttpRequestMethod::Patch,
        HttpRequestMethod::Delete,
        HttpRequestMethod::Options,
    ];
}

impl fmt::Display for HttpRequestMethod {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Head => write!(f, "HEAD"),
            HttpRequestMethod::Post => write!(f, "POST"),
            HttpRequestMethod::Put => write!(f, "PUT"),
            HttpRequestMethod::Patch => write!(f, "PATCH"),
            HttpRequestMethod::Delete => write!(f, "DELETE"),
            HttpRequestMethod::Options => write!(f, "OPTIONS"),
        }
    }
}

impl FromStr for HttpRequestMethod {
    type Err = Exception;

    /// 大小写不敏感地解析方法名，前后空白会被忽略。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpRequestMethod::Get),
            "HEAD" => Ok(HttpRequestMethod::Head),
            "POST" => Ok(HttpRequestMethod::Post),
            "PUT" => Ok(HttpRequestMethod::Put),
            "PATCH" => Ok(HttpRequestMethod::Patch),
            "DELETE" => Ok(HttpRequestMethod::Delete),
            "OPTIONS" => Ok(HttpRequestMethod::Options),
            _ => Err(Exception::UnSupportedRequestMethod(s.to_string())),
        }
    }
}

impl Serialize for HttpRequestMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HttpRequestMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(de::Error::custom)
    }
}
