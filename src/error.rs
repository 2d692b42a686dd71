use thiserror::Error;

/// 应用程序错误类型
///
/// 只有会话池构建/释放、配置和输入输出错误才会以 `AppError` 的形式向上传播；
/// 单个 SKU 的错误一律在 workflow 层转换为结果记录。
#[derive(Debug, Error)]
pub enum AppError {
    /// 会话（浏览器页面 / HTTP 客户端）相关错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 会话资源错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
    /// 创建会话失败
    #[error("创建会话失败 (槽位 {slot}): {source}")]
    CreationFailed {
        slot: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 关闭会话失败
    #[error("关闭会话失败 (槽位 {slot}): {source}")]
    CloseFailed {
        slot: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 关闭浏览器失败
    #[error("关闭浏览器失败: {source}")]
    ShutdownFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 会话池大小非法
    #[error("会话池大小必须大于 0")]
    EmptyPool,
}

/// 单个 SKU 抓取过程中的传输错误
///
/// 不会中断批处理，只会被分类为 `Error` 结果。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// 导航失败（DNS、连接被拒绝等）
    #[error("导航到 {url} 失败: {message}")]
    Navigation { url: String, message: String },
    /// 导航超时
    #[error("导航到 {url} 超时 ({secs} 秒)")]
    NavigationTimeout { url: String, secs: u64 },
    /// 服务器返回非成功状态码
    #[error("HTTP 状态码 {status}: {url}")]
    Status { url: String, status: u16 },
    /// 页面脚本执行或读取页面内容失败
    #[error("读取页面失败: {0}")]
    Page(String),
    /// 会话已被释放（批处理被中断）
    #[error("会话已释放 (槽位 {0})")]
    SessionReleased(usize),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// CSV 解析失败
    #[error("CSV解析失败 ({path}): {source}")]
    CsvParseFailed {
        path: String,
        #[source]
        source: csv::Error,
    },
    /// Excel 工作簿读写失败
    #[error("Excel 文件处理失败 ({path}): {message}")]
    SpreadsheetFailed { path: String, message: String },
    /// 输入表缺少 SKU 列
    #[error("输入文件 {path} 缺少列 '{column}'")]
    MissingColumn { path: String, column: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// CSS 选择器无法解析
    #[error("无法解析选择器 '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
    /// 其他非法取值
    #[error("配置项 {field} 非法: {message}")]
    InvalidValue { field: String, message: String },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for FetchError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        FetchError::Page(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Page(err.to_string())
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建配置取值错误
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            field: field.into(),
            message: message.into(),
        })
    }
}

impl SessionError {
    /// 创建会话创建错误
    pub fn creation_failed(
        slot: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SessionError::CreationFailed {
            slot,
            source: Box::new(source),
        }
    }

    /// 创建会话关闭错误
    pub fn close_failed(slot: usize, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        SessionError::CloseFailed {
            slot,
            source: Box::new(source),
        }
    }
}

impl FileError {
    /// 创建 Excel 处理错误
    pub fn spreadsheet_failed(path: impl Into<String>, source: impl std::fmt::Display) -> Self {
        FileError::SpreadsheetFailed {
            path: path.into(),
            message: source.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
