use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use crate::cache::default_fingerprint;
use crate::exception::Exception;
use crate::param::HttpRequestMethod;
use crate::table::{BuildOptions, DuplicatePolicy};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_cache_dir")]
    cache_dir: PathBuf,
    #[serde(default = "default_cache_enabled")]
    cache_enabled: bool,
    #[serde(default)]
    duplicate_routes: DuplicatePolicy,
    #[serde(default = "default_method")]
    default_method: String,
    #[serde(default)]
    verify_controllers: bool,
    #[serde(default)]
    fingerprint: Option<String>,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("var/cache")
}

fn default_cache_enabled() -> bool {
    true
}

fn default_method() -> String {
    "GET".to_string()
}

impl Config {
    pub fn new() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            cache_enabled: default_cache_enabled(),
            duplicate_routes: DuplicatePolicy::default(),
            default_method: default_method(),
            verify_controllers: false,
            fingerprint: None,
        }
    }

    /// 从 TOML 文件读取配置。
    ///
    /// 文件无法读取时返回错误；内容无法解析时记录日志并退回默认配置。
    pub fn from_toml(filename: impl AsRef<Path>) -> Result<Self, Exception> {
        let filename = filename.as_ref();
        let mut file = File::open(filename)
            .map_err(|e| Exception::Config(format!("no such file {}: {}", filename.display(), e)))?;
        let mut str_val = String::new();
        file.read_to_string(&mut str_val)
            .map_err(|e| Exception::Config(format!("Error Reading file: {}", e)))?;

        let mut raw_config = match toml::from_str::<Config>(&str_val) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置：{}", e);
                Config::new()
            }
        };
        if raw_config.default_method.parse::<HttpRequestMethod>().is_err() {
            warn!(
                "default_method被设置为{}，这不是受支持的HTTP方法，因此该值将被改为GET。",
                raw_config.default_method
            );
            raw_config.default_method = default_method();
        }
        Ok(raw_config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn duplicate_routes(&self) -> DuplicatePolicy {
        self.duplicate_routes
    }

    pub fn default_method(&self) -> HttpRequestMethod {
        self.default_method
            .parse()
            .unwrap_or(HttpRequestMethod::Get)
    }

    pub fn verify_controllers(&self) -> bool {
        self.verify_controllers
    }

    /// 缓存指纹，未配置时使用包名与版本号
    pub fn fingerprint(&self) -> String {
        self.fingerprint.clone().unwrap_or_else(default_fingerprint)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            duplicates: self.duplicate_routes,
            default_method: self.default_method(),
        }
    }
}

impl Config {
    pub fn set_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn set_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn set_duplicate_routes(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_routes = policy;
        self
    }

    pub fn set_verify_controllers(mut self, verify: bool) -> Self {
        self.verify_controllers = verify;
        self
    }

    pub fn set_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }
}
