use std::path::Path;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "kiosk.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 商品查询服务地址
    pub lookup_base_url: String,
    /// 打印服务地址
    pub print_base_url: String,
    /// 是否在查询成功后打印标签
    pub print_enabled: bool,
    /// 本地持久化目录
    pub storage_dir: String,
    /// Excel 导出目录
    pub export_dir: String,
    /// 请求超时（秒），0 表示不限时
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup_base_url: "http://localhost:8386".to_string(),
            print_base_url: "http://localhost:8387".to_string(),
            print_enabled: true,
            storage_dir: ".kiosk_data".to_string(),
            export_dir: ".".to_string(),
            request_timeout_secs: 0,
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|name| std::env::var(name).ok())
    }

    /// 默认值 → TOML 配置文件 → 环境变量
    pub fn load() -> AppResult<Self> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// 与 [`Self::load`] 相同，但从 `var` 读取变量
    ///
    /// 显式设置的 `CONFIG_FILE` 必须存在；只有默认的 `kiosk.toml` 缺失时才跳过
    pub fn load_with<F>(var: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match var("CONFIG_FILE") {
            Some(path) => Self::from_toml_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        Ok(base.with_env_overrides(var))
    }

    /// 从 TOML 文件加载，缺失字段使用默认值
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })?;
        Ok(config)
    }

    /// 用环境变量覆盖当前值，无法解析的值保持原样
    pub fn with_env_overrides<F>(self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            lookup_base_url: var("LOOKUP_BASE_URL").unwrap_or(self.lookup_base_url),
            print_base_url: var("PRINT_BASE_URL").unwrap_or(self.print_base_url),
            print_enabled: var("PRINT_ENABLED").and_then(|v| v.parse().ok()).unwrap_or(self.print_enabled),
            storage_dir: var("STORAGE_DIR").unwrap_or(self.storage_dir),
            export_dir: var("EXPORT_DIR").unwrap_or(self.export_dir),
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
        }
    }
}
