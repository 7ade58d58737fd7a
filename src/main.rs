// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由控制台
//!
//! 加载示例控制器，编译（或从缓存读取）路由表，然后从标准输入读取指令：
//! - `<METHOD> <path>`：模拟一次请求并打印分发结果
//! - `routes`：列出路由表
//! - `clear`：删除路由缓存
//! - `help` / `stop`

use std::io::{self, BufRead};

use log::{error, info, warn};

use hermite::controller::{Controller, ControllerRegistry, RouteDescriptor};
use hermite::{Config, Container, Exception, Request, Router};

struct HomeController;

impl Controller for HomeController {
    fn routes() -> Vec<RouteDescriptor> {
        vec![RouteDescriptor::get("home", "/", "index")]
    }
}

struct PostController;

impl Controller for PostController {
    fn base_path() -> &'static str {
        "/posts"
    }

    fn routes() -> Vec<RouteDescriptor> {
        vec![
            RouteDescriptor::get("posts.index", "", "index"),
            RouteDescriptor::post("posts.store", "", "store"),
            RouteDescriptor::get("posts.show", "{id}", "show"),
            RouteDescriptor::new("posts.update", "{id}", "update").methods(["PUT", "PATCH"]),
            RouteDescriptor::delete("posts.destroy", "{id}", "destroy"),
        ]
    }
}

fn main() {
    if let Err(e) = log4rs::init_file("config/log4rs.yaml", Default::default()) {
        eprintln!("无法初始化日志系统：{}", e);
    }

    let config = match Config::from_toml("config/development.toml") {
        Ok(config) => config,
        Err(e) => {
            warn!("{}，使用默认配置", e);
            Config::new()
        }
    };
    info!("配置文件已载入");
    info!("路由缓存目录：{}", config.cache_dir().display());

    let container = Container::new()
        .singleton(HomeController)
        .singleton(PostController);
    let resolver = ControllerRegistry::new()
        .register::<HomeController>()
        .register::<PostController>();

    let mut router = Router::new(config, container, resolver);
    match router.load(vec![]) {
        Ok(source) => info!("路由已就绪（{:?}）", source),
        Err(e) => {
            error!("路由加载失败：{}", e);
            std::process::exit(1);
        }
    }

    let stdin = io::stdin();
    let mut id: u128 = 0;
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("读取标准输入失败：{}", e);
                break;
            }
        };
        let cmd = line.trim();
        match cmd {
            "" => continue,
            "stop" => {
                println!("控制台已退出");
                break;
            }
            "help" => {
                println!("== Router Help ==");
                println!("<METHOD> <path> - 模拟请求，例如 GET /posts/1");
                println!("routes          - 列出全部路由");
                println!("clear           - 删除路由缓存");
                println!("stop            - 退出控制台");
                println!("help            - 显示此帮助信息");
                println!("=================");
            }
            "routes" => {
                if let Some(table) = router.routes() {
                    for route in table {
                        let methods: Vec<String> = route.methods().iter().map(|m| m.to_string()).collect();
                        println!(
                            "{:<16} {:<12} {:<20} {}::{}",
                            route.name(),
                            methods.join("|"),
                            route.path(),
                            route.controller().controller(),
                            route.controller().action()
                        );
                    }
                }
            }
            "clear" => match router.clear_cache() {
                Ok(true) => println!("路由缓存已删除"),
                Ok(false) => println!("没有可删除的路由缓存"),
                Err(e) => println!("删除失败：{}", e),
            },
            _ => {
                id += 1;
                simulate(&router, cmd, id);
            }
        }
    }
}

fn simulate(router: &Router<Container>, line: &str, id: u128) {
    let mut request = match Request::from_line(line, id) {
        Ok(request) => request,
        Err(_) => {
            println!("无效的命令：{}", line);
            return;
        }
    };
    match router.get_callable(&mut request) {
        Ok(callable) => {
            let mut attributes: Vec<_> = request.attributes().iter().collect();
            attributes.sort();
            println!("200 -> {}::{} {:?}", callable.route(), callable.action(), attributes);
        }
        Err(e) => print_error(&e),
    }
}

fn print_error(e: &Exception) {
    match e {
        Exception::MethodNotAllowed { allowed, .. } => {
            let allowed: Vec<String> = allowed.iter().map(|m| m.to_string()).collect();
            println!("{} {} (Allow: {})", e.status_code(), e.public_message(), allowed.join(", "));
        }
        _ => println!("{} {}", e.status_code(), e.public_message()),
    }
}

