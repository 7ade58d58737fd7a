// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由数据模型
//!
//! [`Route`] 是路由表中的核心实体：名称、允许的方法集合、规范化后的路径模式，
//! 以及一个对路由表而言不透明的控制器引用 [`ControllerRef`]。

use std::collections::BTreeSet;

use serde_derive::{Deserialize, Serialize};

use crate::param::HttpRequestMethod;
use crate::path::compose;

/// 控制器引用：(控制器标识, 入口方法名)。
///
/// 序列化为两个元素的数组，例如 `["app::PostController", "index"]`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerRef(String, String);

impl ControllerRef {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self(controller.into(), action.into())
    }

    /// 控制器标识，分发时交给服务定位器解析
    pub fn controller(&self) -> &str {
        &self.0
    }

    /// 入口方法名
    pub fn action(&self) -> &str {
        &self.1
    }
}

/// 一条命名路由。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    name: String,
    methods: BTreeSet<HttpRequestMethod>,
    path: String,
    controller: ControllerRef,
}

impl Route {
    /// 构造路由。
    ///
    /// 路径会经过 [`compose`] 规范化；方法集合为空时退回 `GET`，
    /// 保证 `methods` 永不为空。
    pub fn new(
        name: impl Into<String>,
        path: &str,
        methods: impl IntoIterator<Item = HttpRequestMethod>,
        controller: ControllerRef,
    ) -> Self {
        let mut methods: BTreeSet<HttpRequestMethod> = methods.into_iter().collect();
        if methods.is_empty() {
            methods.insert(HttpRequestMethod::Get);
        }
        Self {
            name: name.into(),
            methods,
            path: compose("", path),
            controller,
        }
    }

    /// 判断路由是否接受该方法。声明了 `GET` 的路由同样接受 `HEAD`。
    pub fn allows(&self, method: HttpRequestMethod) -> bool {
        self.methods.contains(&method)
            || (method == HttpRequestMethod::Head
                && self.methods.contains(&HttpRequestMethod::Get))
    }
}

// --- Getter 访问器实现 ---

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &BTreeSet<HttpRequestMethod> {
        &self.methods
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn controller(&self) -> &ControllerRef {
        &self.controller
    }
}
