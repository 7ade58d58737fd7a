// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由表模块
//!
//! 路由表是名称到 [`Route`] 的有序映射。它在进程生命周期内只构建一次
//! （冷启动时由控制器描述编译，热启动时从缓存读取），此后只读。
//!
//! ## 重名处理
//! 默认策略为后注册者覆盖（[`DuplicatePolicy::Override`]），被覆盖的路由移动到表尾，
//! 并记录一条警告日志；也可以配置为 [`DuplicatePolicy::Reject`] 直接报错。

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::{debug, error, warn};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserializer, Serializer};
use serde_derive::{Deserialize, Serialize};

use crate::controller::ControllerDescriptor;
use crate::exception::Exception;
use crate::param::HttpRequestMethod;
use crate::path::compose;
use crate::route::{ControllerRef, Route};

/// 遇到重复路由名称时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// 后注册者覆盖先注册者
    #[default]
    Override,
    /// 直接返回 [`Exception::DuplicateRoute`]
    Reject,
}

/// 编译路由表时的选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub duplicates: DuplicatePolicy,
    /// 路由未声明任何方法时使用的默认方法
    pub default_method: HttpRequestMethod,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::Override,
            default_method: HttpRequestMethod::Get,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 显式注册一条路由，重名时覆盖。
    ///
    /// ```
    /// use hermite::param::HttpRequestMethod;
    /// use hermite::route::ControllerRef;
    /// use hermite::table::RouteTable;
    ///
    /// let table = RouteTable::new()
    ///     .register("posts.index", "posts", [HttpRequestMethod::Get], ControllerRef::new("PostController", "index"))
    ///     .register("posts.show", "/posts/{id}/", [HttpRequestMethod::Get], ControllerRef::new("PostController", "show"));
    /// assert_eq!(table.get("posts.show").unwrap().path(), "/posts/{id}");
    /// ```
    pub fn register(
        mut self,
        name: &str,
        path: &str,
        methods: impl IntoIterator<Item = HttpRequestMethod>,
        controller: ControllerRef,
    ) -> Self {
        self.insert(Route::new(name, path, methods, controller));
        self
    }

    /// 插入路由，返回被覆盖的旧路由（如果有）。
    ///
    /// 被覆盖时旧路由被移除，新路由追加到表尾。
    pub fn insert(&mut self, route: Route) -> Option<Route> {
        let replaced = match self.index.remove(route.name()) {
            Some(position) => {
                let old = self.routes.remove(position);
                for slot in self.index.values_mut() {
                    if *slot > position {
                        *slot -= 1;
                    }
                }
                Some(old)
            }
            None => None,
        };
        self.index.insert(route.name().to_string(), self.routes.len());
        self.routes.push(route);
        replaced
    }

    /// 按策略插入路由。
    pub fn insert_with(&mut self, route: Route, policy: DuplicatePolicy) -> Result<(), Exception> {
        if self.contains(route.name()) {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(Exception::DuplicateRoute(route.name().to_string()));
                }
                DuplicatePolicy::Override => {
                    warn!("路由名称'{}'被重复声明，后注册的定义将覆盖之前的定义", route.name());
                }
            }
        }
        self.insert(route);
        Ok(())
    }

    /// 由控制器描述编译路由表。
    ///
    /// 任一描述不合法时整个批次中止，不会产生部分路由表。
    pub fn build(
        controllers: &[ControllerDescriptor],
        options: &BuildOptions,
    ) -> Result<Self, Exception> {
        let mut table = Self::new();
        for controller in controllers {
            if let Err(e) = controller.validate() {
                error!("控制器元数据不合法，中止路由编译：{}", e);
                return Err(e);
            }
            for descriptor in controller.declared_routes() {
                let mut methods = descriptor.parsed_methods().map_err(|reason| {
                    Exception::MetadataExtraction {
                        controller: controller.id().to_string(),
                        reason,
                    }
                })?;
                if methods.is_empty() {
                    methods.push(options.default_method);
                }
                let path = compose(controller.prefix(), descriptor.path());
                debug!(
                    "注册路由：{} {} -> {}::{}",
                    descriptor.name(),
                    path,
                    controller.id(),
                    descriptor.action()
                );
                let route = Route::new(
                    descriptor.name(),
                    &path,
                    methods,
                    ControllerRef::new(controller.id(), descriptor.action()),
                );
                table.insert_with(route, options.duplicates)?;
            }
        }
        Ok(table)
    }
}

// --- 查询接口 ---

impl RouteTable {
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.index.get(name).map(|&position| &self.routes[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.name())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// 按插入顺序排列的路由切片，供匹配器按位置引用
    pub(crate) fn as_slice(&self) -> &[Route] {
        &self.routes
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

/// 缓存中单条路由的记录，名称作为外层映射的键。
#[derive(Debug, Serialize, Deserialize)]
struct RouteRecord {
    methods: BTreeSet<HttpRequestMethod>,
    path: String,
    controller: ControllerRef,
}

impl serde::Serialize for RouteTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.routes.iter().map(|route| {
            (
                route.name(),
                RouteRecord {
                    methods: route.methods().clone(),
                    path: route.path().to_string(),
                    controller: route.controller().clone(),
                },
            )
        }))
    }
}

struct RouteTableVisitor;

impl<'de> Visitor<'de> for RouteTableVisitor {
    type Value = RouteTable;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of route name to route record")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = RouteTable::new();
        while let Some((name, record)) = access.next_entry::<String, RouteRecord>()? {
            if name.is_empty() {
                return Err(de::Error::custom("empty route name"));
            }
            if record.methods.is_empty() {
                return Err(de::Error::custom(format!("route '{}' has no methods", name)));
            }
            if compose("", &record.path) != record.path {
                return Err(de::Error::custom(format!(
                    "route '{}' has a non-normalized path '{}'",
                    name, record.path
                )));
            }
            table.insert(Route::new(name, &record.path, record.methods, record.controller));
        }
        Ok(table)
    }
}

impl<'de> serde::Deserialize<'de> for RouteTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RouteTableVisitor)
    }
}
