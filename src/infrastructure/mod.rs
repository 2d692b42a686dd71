//! 基础设施层：持有稀缺资源（浏览器页面、HTTP 客户端），只暴露能力

pub mod chromium_session;
pub mod http_session;
pub mod session;
pub mod session_pool;

pub use chromium_session::ChromiumSession;
pub use http_session::HttpSession;
pub use session::Session;
pub use session_pool::{SessionPool, SessionSlot};
