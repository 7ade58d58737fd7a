// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 请求分发模块
//!
//! 分发器持有编译后的只读路由表，每次调用都是无状态的：
//! 1. 交给匹配器按 (路径, 方法) 查找路由，区分 404 与 405。
//! 2. 收集路径参数（字符串，不做类型转换）。
//! 3. 通过服务定位器解析控制器实例，定位器返回的错误原样传播。
//! 4. 返回 (实例, 入口方法名) 组成的 [`Callable`]，实际调用由外部完成。

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error};

use crate::container::{Instance, ServiceLocator};
use crate::exception::Exception;
use crate::matcher::UrlMatcher;
use crate::param::HttpRequestMethod;
use crate::table::RouteTable;

/// 分发结果：控制器实例、控制器标识、入口方法名、命中的路由名称以及路径参数。
#[derive(Debug, Clone)]
pub struct Callable<I> {
    instance: I,
    controller: String,
    action: String,
    route: String,
    params: HashMap<String, String>,
}

impl<I> Callable<I> {
    pub fn instance(&self) -> &I {
        &self.instance
    }

    pub fn into_instance(self) -> I {
        self.instance
    }

    /// 控制器标识
    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl Callable<Instance> {
    /// 将实例还原为具体的控制器类型
    pub fn downcast<C: Any + Send + Sync>(&self) -> Option<Arc<C>> {
        Arc::clone(&self.instance).downcast::<C>().ok()
    }
}

pub struct Dispatcher {
    matcher: UrlMatcher,
}

impl Dispatcher {
    /// 编译路由表并构造分发器，此后路由表不再变化。
    pub fn new(table: RouteTable) -> Result<Self, Exception> {
        Ok(Self {
            matcher: UrlMatcher::compile(table)?,
        })
    }

    pub fn dispatch<L: ServiceLocator>(
        &self,
        locator: &L,
        method: HttpRequestMethod,
        path: &str,
    ) -> Result<Callable<L::Instance>, Exception> {
        let found = self.matcher.matches(method, path)?;
        let controller = found.route.controller();
        debug!(
            "{} {} 命中路由'{}'，控制器：{}::{}",
            method,
            path,
            found.route.name(),
            controller.controller(),
            controller.action()
        );

        if !locator.has(controller.controller()) {
            error!("路由'{}'的控制器'{}'未注册", found.route.name(), controller.controller());
            return Err(Exception::ControllerNotFound(
                controller.controller().to_string(),
            ));
        }
        let instance = locator.get(controller.controller())?;

        Ok(Callable {
            instance,
            controller: controller.controller().to_string(),
            action: controller.action().to_string(),
            route: found.route.name().to_string(),
            params: found.params,
        })
    }

    /// 在启动阶段检查路由表中的每个控制器标识都能被定位器识别。
    pub fn verify<L: ServiceLocator>(&self, locator: &L) -> Result<(), Exception> {
        for route in self.matcher.table() {
            let id = route.controller().controller();
            if !locator.has(id) {
                error!("路由'{}'引用了未注册的控制器'{}'", route.name(), id);
                return Err(Exception::ControllerNotFound(id.to_string()));
            }
        }
        Ok(())
    }

    pub fn table(&self) -> &RouteTable {
        self.matcher.table()
    }
}
