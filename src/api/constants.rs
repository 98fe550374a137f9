//! API 模块常量定义

/// 管理员会话 Cookie 名称
pub const ADMIN_SESSION_COOKIE: &str = "admin_session";

/// 后台登录页
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// 后台页面前缀（页面守卫作用范围）
pub const ADMIN_PAGE_PREFIX: &str = "/admin";

/// `/go` 的决策依赖 UA，不能被缓存
pub const CACHE_NO_STORE: &str = "no-store";

/// 健康检查超时
pub const HEALTH_TIMEOUT_SECS: u64 = 5;
