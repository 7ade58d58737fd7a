// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由引擎
//!
//! 组织控制器发现、路由元数据编译、路由缓存与请求分发。
//!
//! ## 数据流
//! - 冷启动：控制器描述 -> 路径拼接 -> 路由表 -> 编译匹配器 -> 校验控制器 -> 写入缓存
//! - 热启动：缓存 -> 路由表 -> 编译匹配器 -> 校验控制器
//! - 请求：请求 -> 分发器 -> 服务定位器 -> [`Callable`]
//!
//! 缓存损坏或过期时记录日志并回退到冷启动，不会以空路由表继续运行。

use log::{debug, error, info, warn};

use crate::cache::RouteCache;
use crate::config::Config;
use crate::container::ServiceLocator;
use crate::controller::{ControllerDescriptor, ControllerResolver};
use crate::dispatcher::{Callable, Dispatcher};
use crate::exception::Exception;
use crate::param::{CONTROLLER_ATTRIBUTE, ROUTE_ATTRIBUTE};
use crate::request::Request;
use crate::table::RouteTable;

/// 路由表的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// 从缓存文件读取
    Cache,
    /// 由控制器描述重新编译
    Compiled,
}

pub struct Router<L: ServiceLocator> {
    config: Config,
    cache: RouteCache,
    locator: L,
    resolver: Box<dyn ControllerResolver>,
    dispatcher: Option<Dispatcher>,
}

impl<L: ServiceLocator> Router<L> {
    pub fn new(config: Config, locator: L, resolver: impl ControllerResolver + 'static) -> Self {
        let cache = RouteCache::from_dir(config.cache_dir()).with_fingerprint(config.fingerprint());
        Self {
            config,
            cache,
            locator,
            resolver: Box::new(resolver),
            dispatcher: None,
        }
    }

    /// 加载路由。
    ///
    /// 优先读取缓存；缓存不存在、损坏或过期时，将 `controllers` 与发现机制返回的控制器合并后重新编译，
    /// 并把结果写回缓存。元数据不合法或控制器校验失败时整个加载失败，不会写入任何缓存。
    ///
    /// 开启 `verify_controllers` 时，缓存中引用了未注册控制器的路由表同样视为过期。
    pub fn load(&mut self, controllers: Vec<ControllerDescriptor>) -> Result<LoadSource, Exception> {
        let (dispatcher, source) = match self.load_cached() {
            Some(dispatcher) => (dispatcher, LoadSource::Cache),
            None => (self.compile(controllers)?, LoadSource::Compiled),
        };
        info!("路由加载完成（{:?}），共{}条路由", source, dispatcher.table().len());
        self.dispatcher = Some(dispatcher);
        Ok(source)
    }

    fn load_cached(&self) -> Option<Dispatcher> {
        if !self.config.cache_enabled() || !self.cache.exists() {
            return None;
        }
        let table = match self.cache.load() {
            Ok(table) => table,
            Err(e) if e.is_cache_miss() => {
                warn!("{}，将重新编译路由", e);
                return None;
            }
            Err(e) => {
                error!("{}，将重新编译路由", e);
                return None;
            }
        };
        let dispatcher = match Dispatcher::new(table) {
            Ok(dispatcher) => dispatcher,
            Err(e) => {
                warn!("缓存中的路由无法编译：{}，将重新编译路由", e);
                return None;
            }
        };
        if let Err(e) = self.verify(&dispatcher) {
            warn!("缓存中的路由已过期：{}，将重新编译路由", e);
            return None;
        }
        Some(dispatcher)
    }

    fn verify(&self, dispatcher: &Dispatcher) -> Result<(), Exception> {
        if self.config.verify_controllers() {
            dispatcher.verify(&self.locator)?;
        }
        Ok(())
    }

    fn compile(&self, mut controllers: Vec<ControllerDescriptor>) -> Result<Dispatcher, Exception> {
        controllers.extend(self.resolver.resolve());
        debug!("开始编译路由，共{}个控制器", controllers.len());

        let table = RouteTable::build(&controllers, &self.config.build_options())?;
        let dispatcher = Dispatcher::new(table)?;
        self.verify(&dispatcher)?;

        if self.config.cache_enabled() {
            // 缓存只是加速手段，写入失败不影响本次运行
            if let Err(e) = self.cache.store(dispatcher.table()) {
                error!("{}", e);
            }
        }
        Ok(dispatcher)
    }

    /// 将请求解析为可调用的控制器。
    ///
    /// 匹配前路径先做百分号解码，因此路径参数是解码后的值。
    /// 成功时路径参数、路由名称（`_route`）与控制器（`_controller`，形如 `标识::方法`）会写入请求属性。
    /// 失败时内部细节写入日志，调用方只应通过 [`Exception::public_message`] 向外暴露信息。
    pub fn get_callable(&self, request: &mut Request) -> Result<Callable<L::Instance>, Exception> {
        let id = request.id();
        let path = request.decoded_path_info()?.into_owned();

        let dispatcher = match &self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => {
                warn!("[ID{}]路由尚未加载，{}无法匹配", id, path);
                return Err(Exception::RouteNotFound { path });
            }
        };

        match dispatcher.dispatch(&self.locator, request.method(), &path) {
            Ok(callable) => {
                debug!(
                    "[ID{}]{} {}（host: {}）解析为路由'{}'",
                    id,
                    request.method(),
                    path,
                    request.host().unwrap_or("-"),
                    callable.route()
                );
                request.add_attributes(callable.params().clone());
                request.add_attributes([
                    (ROUTE_ATTRIBUTE.to_string(), callable.route().to_string()),
                    (
                        CONTROLLER_ATTRIBUTE.to_string(),
                        format!("{}::{}", callable.controller(), callable.action()),
                    ),
                ]);
                Ok(callable)
            }
            Err(e) => {
                if e.status_code() < 500 {
                    warn!("[ID{}]{}", id, e);
                } else {
                    error!("[ID{}]{}", id, e);
                }
                Err(e)
            }
        }
    }

    /// 删除缓存文件，下一次 `load` 会重新编译
    pub fn clear_cache(&self) -> Result<bool, Exception> {
        self.cache.clear()
    }
}

// --- Getter 访问器实现 ---

impl<L: ServiceLocator> Router<L> {
    pub fn routes(&self) -> Option<&RouteTable> {
        self.dispatcher.as_ref().map(Dispatcher::table)
    }

    pub fn is_loaded(&self) -> bool {
        self.dispatcher.is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }
}
