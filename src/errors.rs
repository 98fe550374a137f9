use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum ReviewHubError {
    Config(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    Serialization(String),
}

impl ReviewHubError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ReviewHubError::Config(_) => "E001",
            ReviewHubError::DatabaseConfig(_) => "E002",
            ReviewHubError::DatabaseConnection(_) => "E003",
            ReviewHubError::DatabaseOperation(_) => "E004",
            ReviewHubError::FileOperation(_) => "E005",
            ReviewHubError::Validation(_) => "E006",
            ReviewHubError::Serialization(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ReviewHubError::Config(_) => "Configuration Error",
            ReviewHubError::DatabaseConfig(_) => "Database Configuration Error",
            ReviewHubError::DatabaseConnection(_) => "Database Connection Error",
            ReviewHubError::DatabaseOperation(_) => "Database Operation Error",
            ReviewHubError::FileOperation(_) => "File Operation Error",
            ReviewHubError::Validation(_) => "Validation Error",
            ReviewHubError::Serialization(_) => "Serialization Error",
        }
    }

    /// 对外 JSON 中的 `error` 字段
    pub fn api_tag(&self) -> &'static str {
        match self {
            ReviewHubError::DatabaseConfig(_)
            | ReviewHubError::DatabaseConnection(_)
            | ReviewHubError::DatabaseOperation(_) => "DBError",
            ReviewHubError::Validation(_) => "ValidationError",
            _ => "InternalError",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ReviewHubError::Config(msg)
            | ReviewHubError::DatabaseConfig(msg)
            | ReviewHubError::DatabaseConnection(msg)
            | ReviewHubError::DatabaseOperation(msg)
            | ReviewHubError::FileOperation(msg)
            | ReviewHubError::Validation(msg)
            | ReviewHubError::Serialization(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            ReviewHubError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ReviewHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ReviewHubError {}

// 便捷的构造函数
impl ReviewHubError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        ReviewHubError::Config(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ReviewHubError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ReviewHubError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ReviewHubError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ReviewHubError::Validation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ReviewHubError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for ReviewHubError {
    fn from(err: sea_orm::DbErr) -> Self {
        ReviewHubError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ReviewHubError {
    fn from(err: std::io::Error) -> Self {
        ReviewHubError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ReviewHubError {
    fn from(err: serde_json::Error) -> Self {
        ReviewHubError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReviewHubError>;
