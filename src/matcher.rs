// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # URL 匹配模块
//!
//! 路径模式的编译与逐段匹配交给 [`matchit`] 完成，本模块只负责：
//! 1. 将路由表按路径分组后交给 `matchit` 编译。
//! 2. 在路径匹配成功后检查方法约束，区分 404 与 405。
//! 3. 把 `matchit` 提取出的路径参数转换为字符串映射。

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::exception::Exception;
use crate::param::HttpRequestMethod;
use crate::route::Route;
use crate::table::RouteTable;

/// 一次成功的匹配：命中的路由以及提取出的路径参数（均为字符串，不做类型转换）。
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// 编译后的匹配器，持有其编译所用的路由表。
pub struct UrlMatcher {
    table: RouteTable,
    /// 路径模式 -> 该路径上所有路由在表中的位置（保持表顺序）
    router: matchit::Router<Vec<usize>>,
}

impl UrlMatcher {
    /// 编译路由表。同一路径上的多条路由共享一个模式，按方法区分。
    pub fn compile(table: RouteTable) -> Result<Self, Exception> {
        let mut groups: Vec<(String, Vec<usize>)> = vec![];
        let mut by_path: HashMap<&str, usize> = HashMap::new();
        for (position, route) in table.as_slice().iter().enumerate() {
            match by_path.get(route.path()) {
                Some(&group) => groups[group].1.push(position),
                None => {
                    by_path.insert(route.path(), groups.len());
                    groups.push((route.path().to_string(), vec![position]));
                }
            }
        }

        let mut router = matchit::Router::new();
        for (path, positions) in groups {
            router
                .insert(path.as_str(), positions)
                .map_err(|e| Exception::RouteCompilation {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
        }
        debug!("路由匹配器编译完成，共{}条路由", table.len());
        Ok(Self { table, router })
    }

    /// 匹配请求路径与方法。
    ///
    /// - 没有路径模式命中：[`Exception::RouteNotFound`]
    /// - 路径命中但方法不符：[`Exception::MethodNotAllowed`]，附带该路径允许的方法
    pub fn matches(&self, method: HttpRequestMethod, path: &str) -> Result<RouteMatch<'_>, Exception> {
        let matched = self.router.at(path).map_err(|_| Exception::RouteNotFound {
            path: path.to_string(),
        })?;

        let routes = self.table.as_slice();
        let candidate = matched
            .value
            .iter()
            .map(|&position| &routes[position])
            .find(|route| route.allows(method));

        match candidate {
            Some(route) => {
                let params = matched
                    .params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect();
                Ok(RouteMatch { route, params })
            }
            None => {
                let allowed: BTreeSet<HttpRequestMethod> = matched
                    .value
                    .iter()
                    .flat_map(|&position| routes[position].methods().iter().copied())
                    .collect();
                Err(Exception::MethodNotAllowed {
                    method,
                    path: path.to_string(),
                    allowed: allowed.into_iter().collect(),
                })
            }
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::ControllerRef;
    use crate::param::HttpRequestMethod::*;

    fn posts_table() -> RouteTable {
        RouteTable::new()
            .register("posts.index", "/posts", [Get], ControllerRef::new("Post", "index"))
            .register("posts.store", "/posts", [Post], ControllerRef::new("Post", "store"))
            .register("posts.show", "/posts/{id}", [Get], ControllerRef::new("Post", "show"))
            .register("posts.update", "/posts/{id}", [Put], ControllerRef::new("Post", "update"))
            .register("home", "/", [Get], ControllerRef::new("Home", "index"))
    }

    #[test]
    fn test_static_match() {
        let matcher = UrlMatcher::compile(posts_table()).unwrap();
        let found = matcher.matches(Get, "/posts").unwrap();
        assert_eq!(found.route.name(), "posts.index");
        assert!(found.params.is_empty());

        let found = matcher.matches(Post, "/posts").unwrap();
        assert_eq!(found.route.name(), "posts.store");
    }

    #[test]
    fn test_root_match() {
        let matcher = UrlMatcher::compile(posts_table()).unwrap();
        assert_eq!(matcher.matches(Get, "/").unwrap().route.name(), "home");
    }

    #[test]
    fn test_params_are_strings() {
        let matcher = UrlMatcher::compile(posts_table()).unwrap();
        let found = matcher.matches(Put, "/posts/123").unwrap();
        assert_eq!(found.route.name(), "posts.update");
        assert_eq!(found.params.get("id").map(String::as_str), Some("123"));
    }

    #[test]
    fn test_not_found() {
        let matcher = UrlMatcher::compile(posts_table()).unwrap();
        assert_eq!(
            matcher.matches(Get, "/unknown"),
            Err(Exception::RouteNotFound {
                path: "/unknown".to_string()
            })
        );
        // 占位符只匹配单个路径段
        assert!(matches!(
            matcher.matches(Get, "/posts/1/edit"),
            Err(Exception::RouteNotFound { .. })
        ));
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let matcher = UrlMatcher::compile(posts_table()).unwrap();
        assert_eq!(
            matcher.matches(Delete, "/posts"),
            Err(Exception::MethodNotAllowed {
                method: Delete,
                path: "/posts".to_string(),
                allowed: vec![Get, Post],
            })
        );
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let matcher = UrlMatcher::compile(posts_table()).unwrap();
        assert_eq!(matcher.matches(Head, "/posts/7").unwrap().route.name(), "posts.show");
    }

    #[test]
    fn test_empty_table_is_not_found() {
        let matcher = UrlMatcher::compile(RouteTable::new()).unwrap();
        assert!(matches!(
            matcher.matches(Get, "/"),
            Err(Exception::RouteNotFound { .. })
        ));
    }

    #[test]
    fn test_conflicting_patterns_fail_compilation() {
        let table = RouteTable::new()
            .register("a", "/posts/{id}", [Get], ControllerRef::new("A", "a"))
            .register("b", "/posts/{slug}", [Post], ControllerRef::new("B", "b"));
        match UrlMatcher::compile(table) {
            Err(Exception::RouteCompilation { path, .. }) => assert_eq!(path, "/posts/{slug}"),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("expected a compilation error"),
        }
    }
}
