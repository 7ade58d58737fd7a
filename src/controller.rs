// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 控制器元数据模块
//!
//! 控制器不依赖反射或注解来声明路由，而是显式地提供描述信息：
//! - [`RouteDescriptor`]：方法级别的路由声明（名称、路径片段、HTTP 方法、入口方法）。
//! - [`ControllerDescriptor`]：类级别的描述，包含路由前缀与该控制器声明的全部路由。
//! - [`Controller`]：由控制器类型实现的特性，标识由类型名推导，避免手写字符串。
//! - [`ControllerResolver`]：替代目录扫描的控制器发现机制，[`ControllerRegistry`] 为显式注册实现。

use std::any::type_name;

use lazy_static::lazy_static;
use regex::Regex;

use crate::exception::Exception;
use crate::param::HttpRequestMethod;

lazy_static! {
    /// 路径中的占位符，例如 `{id}`
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([^{}]*)\}").unwrap();
    /// 合法的占位符名称，`*` 前缀表示捕获剩余路径
    static ref PLACEHOLDER_NAME: Regex = Regex::new(r"^\*?[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// 由控制器类型推导出的标识，同时用作服务定位器中的键。
pub fn controller_id<C: ?Sized + 'static>() -> &'static str {
    type_name::<C>()
}

/// 方法级别的路由声明。
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    name: String,
    path: String,
    methods: Vec<String>,
    action: String,
}

impl RouteDescriptor {
    /// 创建一条未限定方法的路由，编译时会使用默认方法。
    pub fn new(name: impl Into<String>, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            methods: vec![],
            action: action.into(),
        }
    }

    pub fn get(name: impl Into<String>, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(name, path, action).methods(["GET"])
    }

    pub fn post(name: impl Into<String>, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(name, path, action).methods(["POST"])
    }

    pub fn put(name: impl Into<String>, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(name, path, action).methods(["PUT"])
    }

    pub fn patch(name: impl Into<String>, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(name, path, action).methods(["PATCH"])
    }

    pub fn delete(name: impl Into<String>, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(name, path, action).methods(["DELETE"])
    }

    /// 追加允许的方法名（大小写不敏感，编译时校验）。
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.extend(methods.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// 解析声明的方法名。空列表返回空集合，由调用方决定默认值。
    pub fn parsed_methods(&self) -> Result<Vec<HttpRequestMethod>, String> {
        self.methods
            .iter()
            .map(|token| {
                token.parse::<HttpRequestMethod>().map_err(|_| {
                    format!("unknown HTTP method '{}' on route '{}'", token, self.name)
                })
            })
            .collect()
    }
}

/// 类级别的控制器描述。
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerDescriptor {
    id: String,
    base_path: String,
    routes: Vec<RouteDescriptor>,
}

impl ControllerDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_path: String::new(),
            routes: vec![],
        }
    }

    /// 以控制器类型构造描述，标识为类型名。
    pub fn of<C: Controller>() -> Self {
        Self::new(controller_id::<C>())
            .base_path(C::base_path())
            .routes(C::routes())
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn route(mut self, route: RouteDescriptor) -> Self {
        self.routes.push(route);
        self
    }

    pub fn routes(mut self, routes: impl IntoIterator<Item = RouteDescriptor>) -> Self {
        self.routes.extend(routes);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prefix(&self) -> &str {
        &self.base_path
    }

    pub fn declared_routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// 校验描述信息，任何一处不合法都会返回 [`Exception::MetadataExtraction`]。
    pub fn validate(&self) -> Result<(), Exception> {
        let fail = |reason: String| Exception::MetadataExtraction {
            controller: if self.id.is_empty() {
                "<anonymous>".to_string()
            } else {
                self.id.clone()
            },
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(fail("controller id is empty".to_string()));
        }
        check_path(&self.base_path).map_err(|e| fail(format!("base path: {}", e)))?;

        for route in &self.routes {
            if route.name.trim().is_empty() {
                return Err(fail(format!("route at '{}' has an empty name", route.path)));
            }
            if route.action.trim().is_empty() {
                return Err(fail(format!("route '{}' has an empty action", route.name)));
            }
            route.parsed_methods().map_err(fail)?;
            check_path(&route.path)
                .map_err(|e| fail(format!("route '{}': {}", route.name, e)))?;
        }
        Ok(())
    }
}

/// 检查路径片段：不允许空白、查询串与锚点，占位符必须成对且命名合法。
fn check_path(path: &str) -> Result<(), String> {
    if let Some(c) = path.chars().find(|c| c.is_whitespace() || *c == '?' || *c == '#') {
        return Err(format!("illegal character {:?} in path '{}'", c, path));
    }
    for capture in PLACEHOLDER.captures_iter(path) {
        let name = &capture[1];
        if !PLACEHOLDER_NAME.is_match(name) {
            return Err(format!("invalid placeholder '{{{}}}' in path '{}'", name, path));
        }
    }
    let rest = PLACEHOLDER.replace_all(path, "");
    if rest.contains('{') || rest.contains('}') {
        return Err(format!("unbalanced braces in path '{}'", path));
    }
    Ok(())
}

/// 控制器类型实现此特性，以声明自己的路由。
///
/// ```
/// use hermite::controller::{Controller, ControllerDescriptor, RouteDescriptor};
///
/// struct PostController;
///
/// impl Controller for PostController {
///     fn base_path() -> &'static str {
///         "posts"
///     }
///
///     fn routes() -> Vec<RouteDescriptor> {
///         vec![
///             RouteDescriptor::get("posts.index", "", "index"),
///             RouteDescriptor::get("posts.show", "{id}", "show"),
///         ]
///     }
/// }
///
/// let descriptor = ControllerDescriptor::of::<PostController>();
/// assert_eq!(descriptor.declared_routes().len(), 2);
/// ```
pub trait Controller: Sized + Send + Sync + 'static {
    /// 类级别的路由前缀
    fn base_path() -> &'static str {
        ""
    }

    fn routes() -> Vec<RouteDescriptor>;
}

/// 控制器发现机制。
pub trait ControllerResolver {
    fn resolve(&self) -> Vec<ControllerDescriptor>;
}

/// 显式注册的控制器清单，由应用启动代码构建。
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    controllers: Vec<ControllerDescriptor>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: Controller>(self) -> Self {
        self.add(ControllerDescriptor::of::<C>())
    }

    pub fn add(mut self, descriptor: ControllerDescriptor) -> Self {
        self.controllers.push(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl ControllerResolver for ControllerRegistry {
    fn resolve(&self) -> Vec<ControllerDescriptor> {
        self.controllers.clone()
    }
}
