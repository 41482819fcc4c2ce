use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server / database / logging: 基础设施
/// - auth: JWT 与管理员身份
/// - app: 品牌文案与公开地址（邮件模板、跳转链接）
/// - redirect / email / shortener / cors
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub redirect: RedirectConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub shortener: ShortenerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl StaticConfig {
    /// 从 config.toml 和环境变量加载配置
    pub fn load() -> Self {
        Self::load_from("config.toml")
    }

    /// 从指定 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > TOML > 默认值
    /// ENV 前缀：AA，分隔符：__
    /// 示例：AA__SERVER__PORT=9999
    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix("AA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    /// 默认配置 + 新生成的 JWT 密钥，用于写出样例文件
    pub fn sample() -> Self {
        let mut config = Self::default();
        config.auth.jwt_secret = crate::utils::generate_random_code(48);
        config
    }

    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::sample())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    /// 读操作最大重试次数（写操作从不重试）
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 签名密钥
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// 管理员邮箱，留空则禁用管理功能
    #[serde(default)]
    pub admin_email: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

/// 品牌与公开地址
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_brand_name")]
    pub brand_name: String,
    #[serde(default = "default_brand_domain")]
    pub brand_domain: String,
    /// 生成跳转链接时使用的公开地址
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
    /// 新商家合作请求的通知收件人
    #[serde(default = "default_admin_notification_email")]
    pub admin_notification_email: String,
    #[serde(default = "default_team_signature")]
    pub team_signature: String,
}

/// 跳转配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// 0 表示直接 307 跳转
    #[serde(default = "default_redirect_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

/// SMTP 配置，smtp_host 为空时只记录日志不发送
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_user: String,
    #[serde(default)]
    pub smtp_password: String,
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

/// 外部短链服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_shortener_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_shortener_domain")]
    pub domain: String,
    #[serde(default = "default_stats_cache_secs")]
    pub stats_cache_secs: u64,
    #[serde(default = "default_shortener_timeout_secs")]
    pub timeout_secs: u64,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub allow_credentials: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "affiliateaura.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_retry_max_delay_ms() -> u64 {
    4000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

/// 留空：启动时生成进程内随机密钥
fn default_jwt_secret() -> String {
    String::new()
}

fn default_cookie_name() -> String {
    "aa_session".to_string()
}

fn default_token_ttl_secs() -> u64 {
    7 * 24 * 3600
}

fn default_brand_name() -> String {
    "AffiliateAura".to_string()
}

fn default_brand_domain() -> String {
    "affiliateaura.co".to_string()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_dashboard_path() -> String {
    "/dashboard".to_string()
}

fn default_admin_notification_email() -> String {
    "admin@affiliateaura.co".to_string()
}

fn default_team_signature() -> String {
    "The AffiliateAura Team".to_string()
}

fn default_redirect_delay_ms() -> u64 {
    1500
}

fn default_code_length() -> usize {
    6
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_address() -> String {
    "AffiliateAura <noreply@affiliateaura.co>".to_string()
}

fn default_shortener_api_base_url() -> String {
    "https://api.dub.co".to_string()
}

fn default_shortener_domain() -> String {
    "go.affiliateaura.co".to_string()
}

fn default_stats_cache_secs() -> u64 {
    60
}

fn default_shortener_timeout_secs() -> u64 {
    10
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            admin_email: String::new(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            brand_name: default_brand_name(),
            brand_domain: default_brand_domain(),
            public_base_url: default_public_base_url(),
            dashboard_path: default_dashboard_path(),
            admin_notification_email: default_admin_notification_email(),
            team_signature: default_team_signature(),
        }
    }
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_redirect_delay_ms(),
            code_length: default_code_length(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_user: String::new(),
            smtp_password: String::new(),
            from_address: default_from_address(),
        }
    }
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base_url: default_shortener_api_base_url(),
            api_key: String::new(),
            domain: default_shortener_domain(),
            stats_cache_secs: default_stats_cache_secs(),
            timeout_secs: default_shortener_timeout_secs(),
        }
    }
}

impl AuthConfig {
    /// 管理员判定：邮箱相等（忽略大小写），admin_email 为空时无人是管理员
    pub fn is_admin(&self, email: &str) -> bool {
        let admin = self.admin_email.trim();
        !admin.is_empty() && admin.eq_ignore_ascii_case(email.trim())
    }
}

impl AppConfig {
    /// 拼接公开地址，去掉多余的斜杠
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
