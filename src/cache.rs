// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由缓存模块
//!
//! 将编译好的路由表序列化为 JSON 文件，后续启动时直接读取，跳过控制器元数据的编译。
//!
//! ## 文件结构
//! ```json
//! {
//!   "version": 1,
//!   "fingerprint": "hermite-0.1.0",
//!   "generated_at": "2026-10-19T08:00:00+00:00",
//!   "routes": {
//!     "posts.index": { "methods": ["GET"], "path": "/posts", "controller": ["PostController", "index"] }
//!   }
//! }
//! ```
//!
//! ## 失效与并发
//! - 结构版本或指纹不一致时，读取结果为 [`Exception::CacheCorruption`]，调用方应重新编译。
//! - 写入先落到同目录下的临时文件，再原子地重命名为目标文件，读者不会看到写了一半的内容。

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};
use serde_derive::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::exception::Exception;
use crate::param::{CACHE_FILE_NAME, CACHE_SCHEMA_VERSION};
use crate::table::RouteTable;

/// 默认指纹：包名 + 版本号。控制器标识由类型名推导，升级后旧缓存自动失效。
pub fn default_fingerprint() -> String {
    format!("{}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    version: u32,
    fingerprint: &'a str,
    generated_at: String,
    routes: &'a RouteTable,
}

/// 只解析头部，版本不符时不必理会路由部分的结构
#[derive(Deserialize)]
struct CacheHeader {
    version: u32,
    fingerprint: String,
}

#[derive(Deserialize)]
struct CacheFile {
    routes: RouteTable,
}

#[derive(Debug, Clone)]
pub struct RouteCache {
    path: PathBuf,
    fingerprint: String,
}

impl RouteCache {
    /// 缓存文件位于 `dir/cache_routes.json`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CACHE_FILE_NAME),
            fingerprint: default_fingerprint(),
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// 读取缓存。任何内容上的问题都返回 [`Exception::CacheCorruption`]，不会返回空表。
    pub fn load(&self) -> Result<RouteTable, Exception> {
        let content = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::InvalidData => Exception::CacheCorruption(format!("not UTF-8: {}", e)),
            _ => Exception::CacheIo(format!("{}: {}", self.path.display(), e)),
        })?;

        let header: CacheHeader = serde_json::from_str(&content)
            .map_err(|e| Exception::CacheCorruption(format!("invalid header: {}", e)))?;
        if header.version != CACHE_SCHEMA_VERSION {
            return Err(Exception::CacheCorruption(format!(
                "schema version {} does not match {}",
                header.version, CACHE_SCHEMA_VERSION
            )));
        }
        if header.fingerprint != self.fingerprint {
            return Err(Exception::CacheCorruption(format!(
                "fingerprint '{}' does not match '{}'",
                header.fingerprint, self.fingerprint
            )));
        }

        let file: CacheFile = serde_json::from_str(&content)
            .map_err(|e| Exception::CacheCorruption(format!("invalid routes: {}", e)))?;
        debug!("从{}读取了{}条路由", self.path.display(), file.routes.len());
        Ok(file.routes)
    }

    /// 写入缓存，覆盖已有文件。写入过程是原子的。
    pub fn store(&self, table: &RouteTable) -> Result<(), Exception> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let io_error = |e: std::io::Error| Exception::CacheIo(format!("{}: {}", dir.display(), e));

        fs::create_dir_all(&dir).map_err(io_error)?;

        let content = serde_json::to_vec_pretty(&CacheFileRef {
            version: CACHE_SCHEMA_VERSION,
            fingerprint: &self.fingerprint,
            generated_at: Utc::now().to_rfc3339(),
            routes: table,
        })
        .map_err(|e| Exception::CacheIo(format!("serialization failed: {}", e)))?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(io_error)?;
        temp.write_all(&content).map_err(io_error)?;
        temp.as_file().sync_all().map_err(io_error)?;
        temp.persist(&self.path)
            .map_err(|e| Exception::CacheIo(format!("{}: {}", self.path.display(), e)))?;

        info!("路由缓存已写入{}，共{}条路由", self.path.display(), table.len());
        Ok(())
    }

    /// 删除缓存文件，返回文件此前是否存在。
    pub fn clear(&self) -> Result<bool, Exception> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("路由缓存{}已删除", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Exception::CacheIo(format!("{}: {}", self.path.display(), e))),
        }
    }
}
