//! HTTP 层：会话、中间件、路由处理

pub mod constants;
pub mod middleware;
pub mod services;
pub mod session;
