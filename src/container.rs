// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 服务定位器模块
//!
//! 分发器只依赖 [`ServiceLocator`] 特性（`has` / `get`），实例的构造与生命周期由外部负责。
//! [`Container`] 是一个最小实现：已注册的单例，加上首次访问时才调用、结果会被缓存的工厂。
//! 以控制器类型注册时，键由 [`controller_id`] 推导，与路由表中的控制器标识一致。

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use log::debug;

use crate::controller::{controller_id, Controller};
use crate::exception::Exception;

/// 容器中存放的控制器实例
pub type Instance = Arc<dyn Any + Send + Sync>;

type Factory = Box<dyn Fn(&Container) -> Result<Instance, Exception> + Send + Sync>;

/// 服务定位能力。
#[cfg_attr(test, mockall::automock(type Instance = std::sync::Arc<String>;))]
pub trait ServiceLocator {
    type Instance;

    fn has(&self, id: &str) -> bool;

    /// 解析实例。失败时返回的错误会被分发器原样传播。
    fn get(&self, id: &str) -> Result<Self::Instance, Exception>;
}

#[derive(Default)]
pub struct Container {
    services: Mutex<HashMap<String, Instance>>,
    factories: HashMap<String, Factory>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以字符串标识注册一个现成的实例
    pub fn set(self, id: impl Into<String>, instance: Instance) -> Self {
        self.services_mut().insert(id.into(), instance);
        self
    }

    /// 以字符串标识注册工厂，首次 `get` 时调用并缓存结果
    pub fn define<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Container) -> Result<Instance, Exception> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
        self
    }

    /// 以控制器类型注册单例
    pub fn singleton<C: Controller>(self, controller: C) -> Self {
        self.set(controller_id::<C>(), Arc::new(controller))
    }

    /// 以控制器类型注册工厂
    pub fn factory<C, F>(self, factory: F) -> Self
    where
        C: Controller,
        F: Fn(&Container) -> Result<C, Exception> + Send + Sync + 'static,
    {
        self.define(controller_id::<C>(), move |container| {
            factory(container).map(|controller| Arc::new(controller) as Instance)
        })
    }

    /// 已注册的全部标识，排序后返回
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.services_mut().keys().cloned().collect();
        ids.extend(self.factories.keys().cloned());
        ids.sort();
        ids.dedup();
        ids
    }

    fn services_mut(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instance>> {
        // 工厂在锁外执行，锁中毒只可能来自 HashMap 操作本身，数据仍然可用
        self.services.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ServiceLocator for Container {
    type Instance = Instance;

    fn has(&self, id: &str) -> bool {
        self.services_mut().contains_key(id) || self.factories.contains_key(id)
    }

    fn get(&self, id: &str) -> Result<Instance, Exception> {
        if let Some(instance) = self.services_mut().get(id) {
            return Ok(Arc::clone(instance));
        }
        match self.factories.get(id) {
            Some(factory) => {
                debug!("首次解析服务'{}'，调用工厂", id);
                let instance = factory(self)?;
                // 工厂在锁外执行，其他线程可能已经写入；以先写入者为准
                let mut services = self.services_mut();
                let kept = services.entry(id.to_string()).or_insert(instance);
                Ok(Arc::clone(kept))
            }
            None => Err(Exception::ControllerResolution {
                id: id.to_string(),
                reason: "service is not registered".to_string(),
            }),
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container").field("ids", &self.ids()).finish()
    }
}
