pub mod cache;
pub mod config;
pub mod container;
pub mod controller;
pub mod dispatcher;
pub mod exception;
pub mod matcher;
pub mod param;
pub mod path;
pub mod request;
pub mod route;
pub mod router;
pub mod table;

pub use cache::RouteCache;
pub use config::Config;
pub use container::{Container, Instance, ServiceLocator};
pub use controller::{Controller, ControllerDescriptor, ControllerRegistry, ControllerResolver, RouteDescriptor};
pub use dispatcher::{Callable, Dispatcher};
pub use exception::Exception;
pub use param::HttpRequestMethod;
pub use request::Request;
pub use route::{ControllerRef, Route};
pub use router::{LoadSource, Router};
pub use table::{BuildOptions, DuplicatePolicy, RouteTable};
