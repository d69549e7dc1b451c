use crate::models::{DraftField, DraftKey};
use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 本地校验错误（不触发任何网络请求）
    Validation(ValidationError),
    /// 登录错误
    Auth(AuthError),
    /// 附件上传错误
    Upload(UploadError),
    /// 交付物提交错误
    Submit(SubmitError),
    /// 状态错误（会话/任务/草稿不存在）
    State(StateError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "校验错误: {}", e),
            AppError::Auth(e) => write!(f, "登录错误: {}", e),
            AppError::Upload(e) => write!(f, "上传错误: {}", e),
            AppError::Submit(e) => write!(f, "提交错误: {}", e),
            AppError::State(e) => write!(f, "状态错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Validation(e) => Some(e),
            AppError::Auth(e) => Some(e),
            AppError::Upload(e) => Some(e),
            AppError::Submit(e) => Some(e),
            AppError::State(e) => Some(e),
        }
    }
}

/// 单个字段的校验问题
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub field: DraftField,
    pub reason: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// 本地校验错误
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// 没有解析出任何有效的11位手机号
    NoValidPhoneNumbers,
    /// 草稿字段不符合要求
    FieldErrors { issues: Vec<FieldIssue> },
    /// 草稿没有任何附件
    NoAttachments,
    /// 附件未就绪（上传中/失败/缺少远端路径）
    AttachmentsNotReady {
        uploading: usize,
        failed: usize,
        missing: usize,
    },
    /// 该草稿已有一次提交在途，重复提交被拦截
    SubmitInProgress,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoValidPhoneNumbers => {
                write!(f, "未提供有效的手机号")
            }
            ValidationError::FieldErrors { issues } => {
                let detail: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
                write!(f, "字段校验未通过: {}", detail.join("; "))
            }
            ValidationError::NoAttachments => {
                write!(f, "至少需要一个附件")
            }
            ValidationError::AttachmentsNotReady {
                uploading,
                failed,
                missing,
            } => {
                write!(
                    f,
                    "附件未就绪: 上传中 {} 个, 失败 {} 个, 缺少远端路径 {} 个",
                    uploading, failed, missing
                )
            }
            ValidationError::SubmitInProgress => {
                write!(f, "该草稿正在提交中，请勿重复提交")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// 登录错误（对单个工人是致命的，不影响同批次其他工人）
#[derive(Debug, Clone)]
pub enum AuthError {
    /// 后端拒绝登录
    LoginRejected { phone: String, message: String },
    /// 登录请求超时
    Timeout { phone: String },
    /// 网络连接失败
    Connectivity { phone: String, message: String },
    /// 响应无法解析
    Malformed { phone: String, message: String },
}

impl AuthError {
    /// 将传输层失败归类为登录错误
    pub fn from_api(phone: &str, failure: ApiFailure) -> Self {
        let phone = phone.to_string();
        match failure {
            ApiFailure::Timeout { .. } => AuthError::Timeout { phone },
            ApiFailure::Connectivity { message, .. } => AuthError::Connectivity { phone, message },
            ApiFailure::Server { message, .. } => AuthError::LoginRejected {
                phone,
                message,
            },
            ApiFailure::Malformed { message, .. } => AuthError::Malformed { phone, message },
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::LoginRejected { phone, message } => {
                write!(f, "登录失败 ({}): {}", phone, message)
            }
            AuthError::Timeout { phone } => write!(f, "登录超时 ({})", phone),
            AuthError::Connectivity { phone, message } => {
                write!(f, "登录网络异常 ({}): {}", phone, message)
            }
            AuthError::Malformed { phone, message } => {
                write!(f, "登录响应异常 ({}): {}", phone, message)
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// 附件上传错误
#[derive(Debug, Clone)]
pub enum UploadError {
    Timeout,
    Connectivity { message: String },
    Server { code: i64, message: String },
    Malformed { message: String },
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Timeout => write!(f, "上传超时"),
            UploadError::Connectivity { message } => write!(f, "上传网络异常: {}", message),
            UploadError::Server { code, message } => {
                write!(f, "上传被服务端拒绝 (code={}): {}", code, message)
            }
            UploadError::Malformed { message } => write!(f, "上传响应异常: {}", message),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<ApiFailure> for UploadError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Timeout { .. } => UploadError::Timeout,
            ApiFailure::Connectivity { message, .. } => UploadError::Connectivity { message },
            ApiFailure::Server { code, message, .. } => UploadError::Server { code, message },
            ApiFailure::Malformed { message, .. } => UploadError::Malformed { message },
        }
    }
}

/// 交付物提交错误
#[derive(Debug, Clone)]
pub enum SubmitError {
    Timeout,
    Connectivity { message: String },
    Server { code: i64, message: String },
    Malformed { message: String },
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Timeout => write!(f, "提交超时，请稍后重试"),
            SubmitError::Connectivity { message } => write!(f, "提交网络异常: {}", message),
            SubmitError::Server { code, message } => {
                write!(f, "提交被服务端拒绝 (code={}): {}", code, message)
            }
            SubmitError::Malformed { message } => write!(f, "提交响应异常: {}", message),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<ApiFailure> for SubmitError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Timeout { .. } => SubmitError::Timeout,
            ApiFailure::Connectivity { message, .. } => SubmitError::Connectivity { message },
            ApiFailure::Server { code, message, .. } => SubmitError::Server { code, message },
            ApiFailure::Malformed { message, .. } => SubmitError::Malformed { message },
        }
    }
}

/// 状态错误
#[derive(Debug, Clone)]
pub enum StateError {
    /// 找不到该手机号的会话
    SessionNotFound { phone: String },
    /// 工人队列中找不到该任务
    TaskNotFound { phone: String, assignment_id: i64 },
    /// 找不到对应草稿
    DraftNotFound { key: DraftKey },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::SessionNotFound { phone } => {
                write!(f, "会话不存在: {}", phone)
            }
            StateError::TaskNotFound {
                phone,
                assignment_id,
            } => {
                write!(f, "任务不存在: {}/{}", phone, assignment_id)
            }
            StateError::DraftNotFound { key } => write!(f, "草稿不存在: {}", key),
        }
    }
}

impl std::error::Error for StateError {}

/// 传输层失败
///
/// 拿到响应之前/解析响应过程中的失败分类，
/// 由各组件在调用点映射为对应的领域错误
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiFailure {
    #[error("请求超时: {endpoint}")]
    Timeout { endpoint: String },
    #[error("网络连接失败 ({endpoint}): {message}")]
    Connectivity { endpoint: String, message: String },
    #[error("服务端返回错误 ({endpoint}): code={code}, msg={message}")]
    Server {
        endpoint: String,
        code: i64,
        message: String,
    },
    #[error("响应解析失败 ({endpoint}): {message}")]
    Malformed { endpoint: String, message: String },
}

// ========== 转换 ==========

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        AppError::Upload(e)
    }
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        AppError::Submit(e)
    }
}

impl From<StateError> for AppError {
    fn from(e: StateError) -> Self {
        AppError::State(e)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建会话不存在错误
    pub fn session_not_found(phone: impl Into<String>) -> Self {
        AppError::State(StateError::SessionNotFound {
            phone: phone.into(),
        })
    }

    /// 创建任务不存在错误
    pub fn task_not_found(phone: impl Into<String>, assignment_id: i64) -> Self {
        AppError::State(StateError::TaskNotFound {
            phone: phone.into(),
            assignment_id,
        })
    }

    /// 创建草稿不存在错误
    pub fn draft_not_found(key: &DraftKey) -> Self {
        AppError::State(StateError::DraftNotFound { key: key.clone() })
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
