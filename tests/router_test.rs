use std::fs;
use std::path::Path;
use std::sync::Arc;

use hermite::controller::{controller_id, Controller, ControllerDescriptor, ControllerRegistry, RouteDescriptor};
use hermite::{Config, Container, DuplicatePolicy, Exception, HttpRequestMethod, LoadSource, Request, Router};

struct HomeController;

impl Controller for HomeController {
    fn base_path() -> &'static str {
        "/"
    }

    fn routes() -> Vec<RouteDescriptor> {
        vec![RouteDescriptor::get("home", "/", "index")]
    }
}

struct PostController {
    per_page: usize,
}

impl Controller for PostController {
    fn base_path() -> &'static str {
        "/posts/"
    }

    fn routes() -> Vec<RouteDescriptor> {
        vec![
            RouteDescriptor::get("posts.index", "", "index"),
            RouteDescriptor::post("posts.store", "/", "store"),
            RouteDescriptor::get("posts.show", "{id}", "show"),
            RouteDescriptor::put("posts.update", "/{id}", "update"),
            RouteDescriptor::delete("posts.destroy", "{id}/", "destroy"),
        ]
    }
}

fn container() -> Container {
    Container::new()
        .singleton(HomeController)
        .singleton(PostController { per_page: 20 })
}

fn registry() -> ControllerRegistry {
    ControllerRegistry::new()
        .register::<HomeController>()
        .register::<PostController>()
}

fn config(dir: &Path) -> Config {
    Config::new().set_cache_dir(dir).set_fingerprint("router-test")
}

fn loaded_router(dir: &Path) -> Router<Container> {
    let mut router = Router::new(config(dir), container(), registry());
    router.load(vec![]).unwrap();
    router
}

fn call(router: &Router<Container>, line: &str) -> Result<(String, Request), Exception> {
    let mut request: Request = line.parse().unwrap();
    let callable = router.get_callable(&mut request)?;
    Ok((callable.action().to_string(), request))
}

#[test]
fn test_resource_routes() {
    let dir = tempfile::tempdir().unwrap();
    let router = loaded_router(dir.path());

    assert_eq!(call(&router, "GET /posts").unwrap().0, "index");
    assert_eq!(call(&router, "POST /posts").unwrap().0, "store");
    assert_eq!(call(&router, "PUT /posts/1").unwrap().0, "update");
    assert_eq!(call(&router, "DELETE /posts/1").unwrap().0, "destroy");
    assert_eq!(call(&router, "GET /").unwrap().0, "index");

    let (action, request) = call(&router, "GET /posts/123").unwrap();
    assert_eq!(action, "show");
    assert_eq!(request.attribute("id"), Some("123"));
    assert_eq!(request.attribute("_route"), Some("posts.show"));
    assert_eq!(
        request.attribute("_controller"),
        Some(format!("{}::show", controller_id::<PostController>()).as_str())
    );
}

#[test]
fn test_encoded_params_are_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let router = loaded_router(dir.path());

    let (action, request) = call(&router, "GET /posts/caf%C3%A9").unwrap();
    assert_eq!(action, "show");
    assert_eq!(request.attribute("id"), Some("café"));

    let (_, request) = call(&router, "GET /posts/hello%20world").unwrap();
    assert_eq!(request.attribute("id"), Some("hello world"));
}

#[test]
fn test_invalid_encoding_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let router = loaded_router(dir.path());
    let err = call(&router, "GET /posts/%FF").unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert!(matches!(err, Exception::RouteNotFound { .. }));
}

#[test]
fn test_composed_paths_are_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let router = loaded_router(dir.path());
    let table = router.routes().unwrap();

    assert_eq!(table.get("home").unwrap().path(), "/");
    assert_eq!(table.get("posts.index").unwrap().path(), "/posts");
    assert_eq!(table.get("posts.store").unwrap().path(), "/posts");
    assert_eq!(table.get("posts.update").unwrap().path(), "/posts/{id}");
    assert_eq!(table.get("posts.destroy").unwrap().path(), "/posts/{id}");
}

#[test]
fn test_instance_is_the_registered_controller() {
    let dir = tempfile::tempdir().unwrap();
    let router = loaded_router(dir.path());
    let mut request = Request::new(HttpRequestMethod::Get, "/posts");
    let callable = router.get_callable(&mut request).unwrap();
    let controller = callable.downcast::<PostController>().unwrap();
    assert_eq!(controller.per_page, 20);
}

#[test]
fn test_head_falls_back_to_get() {
    let dir = tempfile::tempdir().unwrap();
    let router = loaded_router(dir.path());
    assert_eq!(call(&router, "HEAD /posts/9").unwrap().0, "show");
}

#[test]
fn test_unknown_path_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let router = loaded_router(dir.path());
    let err = call(&router, "GET /unknown").unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert!(matches!(err, Exception::RouteNotFound { .. }));
}

#[test]
fn test_wrong_method_is_not_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let router = loaded_router(dir.path());
    match call(&router, "PUT /posts") {
        Err(Exception::MethodNotAllowed { method, allowed, .. }) => {
            assert_eq!(method, HttpRequestMethod::Put);
            assert_eq!(allowed, vec![HttpRequestMethod::Get, HttpRequestMethod::Post]);
        }
        other => panic!("unexpected {:?}", other.map(|(action, _)| action)),
    }
}

#[test]
fn test_query_string_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let router = loaded_router(dir.path());
    let (action, request) = call(&router, "GET /posts/7?page=2").unwrap();
    assert_eq!(action, "show");
    assert_eq!(request.attribute("id"), Some("7"));
}

#[test]
fn test_warm_start_reads_cache() {
    let dir = tempfile::tempdir().unwrap();
    let mut cold = Router::new(config(dir.path()), container(), registry());
    assert_eq!(cold.load(vec![]), Ok(LoadSource::Compiled));
    assert!(cold.cache().exists());

    // 没有任何控制器描述，路由只能来自缓存
    let mut warm = Router::new(config(dir.path()), container(), ControllerRegistry::new());
    assert_eq!(warm.load(vec![]), Ok(LoadSource::Cache));
    assert_eq!(warm.routes(), cold.routes());
    assert_eq!(call(&warm, "GET /posts/5").unwrap().0, "show");
}

#[test]
fn test_cache_with_renamed_controller_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = ControllerDescriptor::new("app::OldPostController")
        .base_path("/legacy")
        .route(RouteDescriptor::get("legacy.show", "{id}", "show"));
    let old_container = Container::new().set("app::OldPostController", Arc::new(()));
    let mut cold = Router::new(config(dir.path()), old_container, ControllerRegistry::new());
    assert_eq!(cold.load(vec![legacy]), Ok(LoadSource::Compiled));

    // 指纹不变，但缓存引用的控制器已不在容器中
    let verified = config(dir.path()).set_verify_controllers(true);
    let mut router = Router::new(verified.clone(), container(), registry());
    assert_eq!(router.load(vec![]), Ok(LoadSource::Compiled));
    let table = router.routes().unwrap();
    assert!(!table.contains("legacy.show"));
    assert!(table.contains("posts.show"));

    let mut warm = Router::new(verified, container(), registry());
    assert_eq!(warm.load(vec![]), Ok(LoadSource::Cache));
}

#[test]
fn test_failed_verification_writes_no_cache() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path()).set_verify_controllers(true);
    let mut router = Router::new(config, Container::new(), registry());
    assert!(matches!(router.load(vec![]), Err(Exception::ControllerNotFound(_))));
    assert!(!dir.path().join("cache_routes.json").exists());
}

#[test]
fn test_corrupt_cache_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let cache_file = dir.path().join("cache_routes.json");
    fs::write(&cache_file, "{ not json").unwrap();

    let mut router = Router::new(config(dir.path()), container(), registry());
    assert_eq!(router.load(vec![]), Ok(LoadSource::Compiled));
    assert_eq!(call(&router, "GET /posts").unwrap().0, "index");

    let content = fs::read_to_string(&cache_file).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["fingerprint"], "router-test");
    assert_eq!(json["routes"]["posts.show"]["path"], "/posts/{id}");
}

#[test]
fn test_fingerprint_change_invalidates_cache() {
    let dir = tempfile::tempdir().unwrap();
    loaded_router(dir.path());

    let config = config(dir.path()).set_fingerprint("next-release");
    let mut router = Router::new(config, container(), registry());
    assert_eq!(router.load(vec![]), Ok(LoadSource::Compiled));
}

#[test]
fn test_clear_cache_forces_recompile() {
    let dir = tempfile::tempdir().unwrap();
    let router = loaded_router(dir.path());
    assert_eq!(router.clear_cache(), Ok(true));
    assert_eq!(router.clear_cache(), Ok(false));

    let mut router = Router::new(config(dir.path()), container(), registry());
    assert_eq!(router.load(vec![]), Ok(LoadSource::Compiled));
}

#[test]
fn test_cache_disabled_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path()).set_cache_enabled(false);
    let mut router = Router::new(config, container(), registry());
    assert_eq!(router.load(vec![]), Ok(LoadSource::Compiled));
    assert!(!dir.path().join("cache_routes.json").exists());
}

#[test]
fn test_explicit_controllers_are_merged() {
    let dir = tempfile::tempdir().unwrap();
    let extra = ControllerDescriptor::new(controller_id::<HomeController>())
        .base_path("/about")
        .route(RouteDescriptor::get("about", "", "about"));

    let mut router = Router::new(config(dir.path()), container(), registry());
    router.load(vec![extra]).unwrap();
    assert_eq!(router.routes().unwrap().len(), 7);
    assert_eq!(call(&router, "GET /about").unwrap().0, "about");
}

#[test]
fn test_invalid_metadata_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    let broken = ControllerDescriptor::new("BrokenController")
        .route(RouteDescriptor::get("broken", "/items/{id", "show"));

    let mut router = Router::new(config(dir.path()), container(), registry());
    assert!(matches!(
        router.load(vec![broken]),
        Err(Exception::MetadataExtraction { .. })
    ));
    assert!(!router.is_loaded());
    assert!(!dir.path().join("cache_routes.json").exists());
}

#[test]
fn test_duplicate_names_override_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let shadow = ControllerDescriptor::new(controller_id::<HomeController>())
        .route(RouteDescriptor::get("posts.index", "/all-posts", "index"));

    // 显式传入的控制器先注册，因此被发现机制返回的同名路由覆盖
    let mut router = Router::new(config(dir.path()), container(), registry());
    router.load(vec![shadow.clone()]).unwrap();
    assert_eq!(router.routes().unwrap().get("posts.index").unwrap().path(), "/posts");

    let config = config(dir.path())
        .set_cache_enabled(false)
        .set_duplicate_routes(DuplicatePolicy::Reject);
    let mut router = Router::new(config, container(), registry());
    assert_eq!(
        router.load(vec![shadow]),
        Err(Exception::DuplicateRoute("posts.index".to_string()))
    );
}

#[test]
fn test_verify_rejects_unregistered_controller() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path()).set_verify_controllers(true);
    let container = Container::new().singleton(HomeController);
    let mut router = Router::new(config, container, registry());
    assert_eq!(
        router.load(vec![]),
        Err(Exception::ControllerNotFound(
            controller_id::<PostController>().to_string()
        ))
    );
}

#[test]
fn test_missing_controller_at_dispatch_time() {
    let dir = tempfile::tempdir().unwrap();
    let container = Container::new().singleton(HomeController);
    let mut router = Router::new(config(dir.path()), container, registry());
    router.load(vec![]).unwrap();

    assert_eq!(call(&router, "GET /").unwrap().0, "index");
    let err = call(&router, "GET /posts").unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.public_message(), "Internal Server Error");
}
