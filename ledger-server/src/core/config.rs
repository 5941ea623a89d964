use chrono_tz::Tz;

/// 账本服务配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | ./data/ledger.db | SQLite 数据库文件 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | false | 是否输出 JSON 日志 |
/// | LOG_DIR | (无) | 日志目录，设置后按天滚动写文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DB_MAX_CONNECTIONS | 5 | 连接池大小 |
/// | DB_BUSY_TIMEOUT_MS | 5000 | 写锁等待时间(毫秒) |
/// | BUSINESS_TIMEZONE | UTC | 业务时区 (IANA 名称)，决定月末边界 |
///
/// # 示例
///
/// ```ignore
/// DATABASE_PATH=/var/lib/ledger/ledger.db BUSINESS_TIMEZONE=Europe/Istanbul cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 数据库文件路径
    pub database_path: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub db_max_connections: u32,
    pub db_busy_timeout_ms: u64,
    /// 业务时区
    pub business_timezone: Tz,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置或无法解析的值使用默认值
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/ledger.db".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            db_busy_timeout_ms: std::env::var("DB_BUSY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            business_timezone: std::env::var("BUSINESS_TIMEZONE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Tz::UTC),
        }
    }

    /// 覆盖数据库路径
    ///
    /// 常用于测试场景
    pub fn with_database_path(database_path: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_database_path() {
        let config = Config::with_database_path("/tmp/ledger-test.db");
        assert_eq!(config.database_path, "/tmp/ledger-test.db");
        assert!(config.db_max_connections >= 1);
    }

    #[test]
    fn test_environment_flags() {
        let mut config = Config::with_database_path("x.db");
        config.environment = "production".into();
        assert!(config.is_production());
        config.environment = "development".into();
        assert!(!config.is_production());
    }
}
