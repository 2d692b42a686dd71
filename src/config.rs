use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{ClassificationMode, MarkerSet};

/// 未指定配置文件时，当前目录下会自动读取的文件名
pub const DEFAULT_CONFIG_FILE: &str = "sku_check.toml";

/// 会话类型
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    /// Chromium 页面，等待脚本渲染结果
    #[default]
    Browser,
    /// 纯 HTTP 请求，只看服务端返回的 HTML
    Http,
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" | "chromium" => Ok(SessionKind::Browser),
            "http" => Ok(SessionKind::Http),
            other => Err(format!("未知的会话类型 '{}' (可选: browser, http)", other)),
        }
    }
}

impl Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKind::Browser => write!(f, "browser"),
            SessionKind::Http => write!(f, "http"),
        }
    }
}

/// 程序配置
///
/// 优先级：命令行 > 环境变量 > 配置文件 > 默认值
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 输入文件（.xlsx 或 .csv）
    pub input_path: PathBuf,
    /// 输出文件（.xlsx 或 .csv）
    pub output_path: PathBuf,
    /// SKU 所在列的表头
    pub sku_column: String,
    /// 搜索页地址，SKU 以 `q` 参数追加
    pub search_url: String,
    /// 会话数量，即并发数
    pub pool_size: usize,
    /// 等待结果标记出现的最长时间
    pub wait_timeout_secs: u64,
    /// 检查标记的间隔
    pub poll_interval_ms: u64,
    /// 单次导航的超时时间
    pub navigation_timeout_secs: u64,
    /// 每个 SKU 处理完后的固定等待
    pub request_delay_ms: u64,
    /// 分类模式
    pub mode: ClassificationMode,
    /// 会话类型
    pub session_kind: SessionKind,
    /// 是否无头运行浏览器
    pub headless: bool,
    /// 设置后连接到该调试端口上的浏览器，而不是启动新浏览器
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<PathBuf>,
    /// HTTP 会话使用的 User-Agent
    pub user_agent: String,
    // --- 页面标记 ---
    pub results_selector: String,
    pub item_selector: String,
    pub no_results_selector: String,
    pub title_selector: String,
    /// 负向容器中表示“无结果”的文本
    pub no_results_phrase: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("products.xlsx"),
            output_path: PathBuf::from("sku_search_results.xlsx"),
            sku_column: "Item Code".to_string(),
            search_url: "https://www.paddypallin.com.au/nsearch".to_string(),
            pool_size: 5,
            wait_timeout_secs: 10,
            poll_interval_ms: 250,
            navigation_timeout_secs: 30,
            request_delay_ms: 0,
            mode: ClassificationMode::FourWay,
            session_kind: SessionKind::Browser,
            headless: true,
            browser_debug_port: None,
            chrome_executable: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            results_selector: "#amasty-shopby-product-list".to_string(),
            item_selector: ".product-item".to_string(),
            no_results_selector: ".nxt-nrf-container".to_string(),
            title_selector: ".page-title-wrapper".to_string(),
            no_results_phrase: "did not match any products".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：配置文件（可选）+ 环境变量
    ///
    /// `path` 为 `None` 时，若当前目录存在 [`DEFAULT_CONFIG_FILE`] 则读取它。
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.with_env_from(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取，未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    pub fn from_toml_str(content: &str, source: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| {
            AppError::Config(ConfigError::TomlParseFailed {
                path: source.to_string(),
                source: e,
            })
        })
    }

    /// 用 `SKU_*` 环境变量覆盖配置
    pub fn with_env_from<F>(mut self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = &lookup;
        if let Some(v) = lookup("SKU_INPUT_PATH") {
            self.input_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SKU_OUTPUT_PATH") {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SKU_COLUMN") {
            self.sku_column = v;
        }
        if let Some(v) = lookup("SKU_SEARCH_URL") {
            self.search_url = v;
        }
        if let Some(v) = lookup("SKU_USER_AGENT") {
            self.user_agent = v;
        }
        if let Some(v) = lookup("SKU_CHROME_EXECUTABLE") {
            self.chrome_executable = Some(PathBuf::from(v));
        }
        self.pool_size = env_parse(lookup, "SKU_POOL_SIZE", "usize")?.unwrap_or(self.pool_size);
        self.wait_timeout_secs = env_parse(lookup, "SKU_WAIT_TIMEOUT_SECS", "u64")?
            .unwrap_or(self.wait_timeout_secs);
        self.poll_interval_ms = env_parse(lookup, "SKU_POLL_INTERVAL_MS", "u64")?
            .unwrap_or(self.poll_interval_ms);
        self.navigation_timeout_secs = env_parse(lookup, "SKU_NAVIGATION_TIMEOUT_SECS", "u64")?
            .unwrap_or(self.navigation_timeout_secs);
        self.request_delay_ms = env_parse(lookup, "SKU_REQUEST_DELAY_MS", "u64")?
            .unwrap_or(self.request_delay_ms);
        self.mode = env_parse(lookup, "SKU_MODE", "four-way | existence-only")?.unwrap_or(self.mode);
        self.session_kind =
            env_parse(lookup, "SKU_SESSION_KIND", "browser | http")?.unwrap_or(self.session_kind);
        self.headless = env_parse(lookup, "SKU_HEADLESS", "bool")?.unwrap_or(self.headless);
        self.verbose_logging =
            env_parse(lookup, "SKU_VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging);
        if let Some(port) = env_parse(lookup, "SKU_BROWSER_DEBUG_PORT", "u16")? {
            self.browser_debug_port = Some(port);
        }
        Ok(self)
    }

    /// 启动前检查配置
    pub fn validate(&self) -> AppResult<()> {
        if self.pool_size == 0 {
            return Err(AppError::invalid_config("pool_size", "必须大于 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(AppError::invalid_config("poll_interval_ms", "必须大于 0"));
        }
        if self.sku_column.trim().is_empty() {
            return Err(AppError::invalid_config("sku_column", "不能为空"));
        }
        url::Url::parse(&self.search_url)
            .map_err(|e| AppError::invalid_config("search_url", e.to_string()))?;
        self.markers()?;
        Ok(())
    }

    /// 编译页面标记
    pub fn markers(&self) -> AppResult<MarkerSet> {
        Ok(MarkerSet::new(
            &self.results_selector,
            &self.item_selector,
            &self.no_results_selector,
            &self.title_selector,
        )?)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

fn env_parse<T, F>(lookup: &F, var_name: &str, expected_type: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.wait_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_toml_overrides_only_given_fields() {
        let config = Config::from_toml_str(
            r#"
            sku_column = "SKU"
            pool_size = 2
            mode = "existence-only"
            session_kind = "http"
            "#,
            "inline",
        )
        .unwrap();

        assert_eq!(config.sku_column, "SKU");
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.mode, ClassificationMode::ExistenceOnly);
        assert_eq!(config.session_kind, SessionKind::Http);
        assert_eq!(config.no_results_phrase, "did not match any products");
    }

    #[test]
    fn test_bad_toml_is_reported() {
        let err = Config::from_toml_str("pool_size = \"five\"", "bad.toml").unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::TomlParseFailed { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_env_from(env(&[
                ("SKU_POOL_SIZE", "3"),
                ("SKU_MODE", "existence-only"),
                ("SKU_HEADLESS", "false"),
                ("SKU_BROWSER_DEBUG_PORT", "9222"),
            ]))
            .unwrap();

        assert_eq!(config.pool_size, 3);
        assert_eq!(config.mode, ClassificationMode::ExistenceOnly);
        assert!(!config.headless);
        assert_eq!(config.browser_debug_port, Some(9222));
    }

    #[test]
    fn test_unparsable_env_is_an_error() {
        let err = Config::default()
            .with_env_from(env(&[("SKU_POOL_SIZE", "many")]))
            .unwrap_err();
        match err {
            AppError::Config(ConfigError::EnvVarParseFailed { var_name, value, .. }) => {
                assert_eq!(var_name, "SKU_POOL_SIZE");
                assert_eq!(value, "many");
            }
            other => panic!("意外的错误: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_zero_pool_and_bad_selector() {
        let config = Config {
            pool_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            item_selector: "li[".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AppError::Config(ConfigError::InvalidSelector { .. }))
        ));

        let config = Config {
            search_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
