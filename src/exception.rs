// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了路由层在编译路由表、读写路由缓存以及分发请求时可能抛出的各类异常。
//!
//! ## 设计意图
//! - **错误分类**：涵盖请求匹配错误、控制器解析错误、路由元数据错误以及缓存错误。
//! - **语义映射**：每个变体都能通过 [`Exception::status_code`] 映射为对应的 HTTP 状态码。
//! - **边界收敛**：内部细节只写入日志，对外只暴露 [`Exception::public_message`] 给出的状态短语。

use std::fmt;

use crate::param::{HttpRequestMethod, STATUS_CODES};

/// 路由层处理过程中发生的异常类型。
///
/// 该枚举通常作为 `Result` 的 `Err` 部分返回，用于指示处理失败的具体原因。
#[derive(Debug, Clone, PartialEq)]
pub enum Exception {
    /// 使用了路由层无法识别的 HTTP 方法。
    UnSupportedRequestMethod(String),
    /// 没有任何路由模式能匹配请求路径。对应 `404 Not Found`。
    RouteNotFound { path: String },
    /// 路径匹配成功，但该路径上没有路由允许此方法。对应 `405 Method Not Allowed`。
    MethodNotAllowed {
        method: HttpRequestMethod,
        path: String,
        allowed: Vec<HttpRequestMethod>,
    },
    /// 服务定位器中不存在该控制器标识。
    ControllerNotFound(String),
    /// 服务定位器在构造控制器实例时失败。
    ControllerResolution { id: String, reason: String },
    /// 控制器描述信息不合法，整个编译批次被中止。
    MetadataExtraction { controller: String, reason: String },
    /// 在拒绝重名的策略下出现了重复的路由名称。
    DuplicateRoute(String),
    /// 外部匹配库无法接受某个路由模式（例如参数名冲突）。
    RouteCompilation { path: String, reason: String },
    /// 缓存文件内容与预期结构不符，或版本、指纹已过期。调用方应当重新编译。
    CacheCorruption(String),
    /// 读写缓存文件时发生 I/O 错误。
    CacheIo(String),
    /// 配置文件无法读取。
    Config(String),
}

use Exception::*;

impl Exception {
    /// 将异常映射为 HTTP 状态码。
    pub fn status_code(&self) -> u16 {
        match self {
            UnSupportedRequestMethod(_) => 400,
            RouteNotFound { .. } => 404,
            MethodNotAllowed { .. } => 405,
            _ => 500,
        }
    }

    /// 对外可见的错误描述，仅包含状态短语，不泄露内部细节。
    pub fn public_message(&self) -> &'static str {
        STATUS_CODES
            .get(&self.status_code())
            .copied()
            .unwrap_or("Internal Server Error")
    }

    /// 是否应该让调用方重新编译路由表而不是直接失败。
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, CacheCorruption(_))
    }
}

/// 为 `Exception` 实现 `Display` 特性，使其支持字符串格式化输出。
///
/// 这些描述信息用于系统日志，不会直接返回给请求方。
impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnSupportedRequestMethod(method) => write!(f, "Unsupported request method: {}", method),
            RouteNotFound { path } => write!(f, "No route found for {} (404)", path),
            MethodNotAllowed {
                method,
                path,
                allowed,
            } => {
                let allowed: Vec<String> = allowed.iter().map(|m| m.to_string()).collect();
                write!(
                    f,
                    "Method {} not allowed for {}, allowed: {} (405)",
                    method,
                    path,
                    allowed.join(", ")
                )
            }
            ControllerNotFound(id) => write!(f, "Controller '{}' not found", id),
            ControllerResolution { id, reason } => {
                write!(f, "Couldn't resolve controller '{}': {}", id, reason)
            }
            MetadataExtraction { controller, reason } => {
                write!(f, "Invalid route metadata in '{}': {}", controller, reason)
            }
            DuplicateRoute(name) => write!(f, "Route name '{}' is declared more than once", name),
            RouteCompilation { path, reason } => {
                write!(f, "Couldn't compile route pattern '{}': {}", path, reason)
            }
            CacheCorruption(reason) => write!(f, "Route cache is unusable: {}", reason),
            CacheIo(reason) => write!(f, "Route cache I/O error: {}", reason),
            Config(reason) => write!(f, "Configuration error: {}", reason),
        }
    }
}

impl std::error::Error for Exception {}
