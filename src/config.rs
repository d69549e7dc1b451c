/// 运行环境
///
/// 对应后端的三套部署环境，决定所有接口的基础URL
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    /// 生产环境
    Prod,
    /// 测试环境
    Test,
    /// 本地环境
    Local,
}

impl Environment {
    /// 根据环境获取基础URL
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Prod => "https://smp-api.seedlingintl.com",
            Environment::Test => "http://fwos-api-test.seedlingintl.com",
            Environment::Local => "http://localhost:8080",
        }
    }

    /// 解析环境名称，无法识别时回落到测试环境
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "prod" | "production" => Environment::Prod,
            "local" => Environment::Local,
            _ => Environment::Test,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Prod => write!(f, "prod"),
            Environment::Test => write!(f, "test"),
            Environment::Local => write!(f, "local"),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 运行环境
    pub environment: Environment,
    /// 短信登录固定验证码
    pub sms_code: String,
    /// 批量登录每批手机号数量
    pub auth_batch_size: usize,
    /// 元数据接口超时（秒）
    pub metadata_timeout_secs: u64,
    /// 上传接口超时（秒）
    pub upload_timeout_secs: u64,
    /// 任务列表分页大小
    pub task_page_size: i64,
    /// 任务列表查询状态
    pub task_status_type: i64,
    /// 可交付任务的状态标记
    pub deliverable_status: i64,
    /// 单个草稿图片附件上限
    pub max_image_attachments: usize,
    /// 单个草稿文件附件上限
    pub max_file_attachments: usize,
    /// 单个附件大小上限（字节）
    pub max_attachment_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Test,
            sms_code: "987654".to_string(),
            auth_batch_size: 5,
            metadata_timeout_secs: 10,
            upload_timeout_secs: 30,
            task_page_size: 50,
            task_status_type: 0,
            deliverable_status: 2,
            max_image_attachments: 9,
            max_file_attachments: 6,
            max_attachment_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            environment: std::env::var("DELIVERY_ENV").map(|v| Environment::resolve(&v)).unwrap_or(default.environment),
            sms_code: std::env::var("DELIVERY_SMS_CODE").unwrap_or(default.sms_code),
            auth_batch_size: std::env::var("AUTH_BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.auth_batch_size),
            metadata_timeout_secs: std::env::var("METADATA_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.metadata_timeout_secs),
            upload_timeout_secs: std::env::var("UPLOAD_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.upload_timeout_secs),
            task_page_size: std::env::var("TASK_PAGE_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.task_page_size),
            task_status_type: std::env::var("TASK_STATUS_TYPE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.task_status_type),
            deliverable_status: std::env::var("DELIVERABLE_STATUS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.deliverable_status),
            max_image_attachments: std::env::var("MAX_IMAGE_ATTACHMENTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_image_attachments),
            max_file_attachments: std::env::var("MAX_FILE_ATTACHMENTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_file_attachments),
            max_attachment_bytes: std::env::var("MAX_ATTACHMENT_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_attachment_bytes),
        }
    }
}
