// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 请求模型模块
//!
//! 路由层只关心请求的方法、路径与主机名。完整的 HTTP 报文解析由外部框架负责，
//! 这里只提供从请求行（例如 `GET /posts HTTP/1.1`）构造 [`Request`] 的能力。
//! 分发成功后，路径参数会写入请求的属性表 `attributes`。

use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;

use log::{error, warn};
use percent_encoding::percent_decode_str;

use crate::exception::Exception;
use crate::param::HttpRequestMethod;

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// 请求 ID，用于追踪日志
    id: u128,
    method: HttpRequestMethod,
    /// 请求的资源路径（可能包含查询字符串）
    path: String,
    host: Option<String>,
    /// 请求作用域内的属性，分发时写入路径参数
    attributes: HashMap<String, String>,
}

impl Request {
    pub fn new(method: HttpRequestMethod, path: impl Into<String>) -> Self {
        Self {
            id: 0,
            method,
            path: path.into(),
            host: None,
            attributes: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: u128) -> Self {
        self.id = id;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into().to_lowercase());
        self
    }

    /// 从请求行构建请求，例如 `GET /posts/1 HTTP/1.1` 或 `get /posts`。
    pub fn from_line(line: &str, id: u128) -> Result<Self, Exception> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 || parts.len() > 3 {
            error!("[ID{}]请求行格式不正确：{}", id, line);
            return Err(Exception::UnSupportedRequestMethod(line.trim().to_string()));
        }
        let method = parts[0].parse::<HttpRequestMethod>().map_err(|e| {
            error!("[ID{}]不支持的HTTP请求方法：{}", id, parts[0]);
            e
        })?;
        Ok(Self::new(method, parts[1]).with_id(id))
    }

    /// 去掉查询字符串与片段后的路径，用于路由匹配
    pub fn path_info(&self) -> &str {
        let end = self
            .path
            .find(|c: char| c == '?' || c == '#')
            .unwrap_or(self.path.len());
        if end == 0 {
            "/"
        } else {
            &self.path[..end]
        }
    }

    /// 百分号解码后的匹配路径，例如 `/posts/caf%C3%A9` 解码为 `/posts/café`。
    ///
    /// 解码结果不是合法的 UTF-8 时，任何路由都不可能命中，返回 [`Exception::RouteNotFound`]。
    pub fn decoded_path_info(&self) -> Result<Cow<'_, str>, Exception> {
        let path = self.path_info();
        percent_decode_str(path).decode_utf8().map_err(|e| {
            warn!("[ID{}]路径{}解码后不是合法的UTF-8：{}", self.id, path, e);
            Exception::RouteNotFound {
                path: path.to_string(),
            }
        })
    }

    /// 合并属性，同名属性被覆盖
    pub fn add_attributes<I>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.attributes.extend(attributes);
    }
}

// --- Getter 访问器实现 ---

impl Request {
    pub fn id(&self) -> u128 {
        self.id
    }

    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 获取请求路径（含查询参数）
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }
}

impl FromStr for Request {
    type Err = Exception;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Request::from_line(s, 0)
    }
}
