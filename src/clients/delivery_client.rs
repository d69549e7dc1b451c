//! 交付后端 reqwest 客户端
//!
//! 封装五个后端接口的调用逻辑：统一信封解析、错误分类和超时控制。
//! 元数据接口用短超时，上传接口用长超时，均来自配置。

use crate::clients::{DeliveryApi, ProgressFn, UploadFile};
use crate::config::Config;
use crate::error::ApiFailure;
use crate::models::{
    ApiEnvelope, DeliveryPayload, LoginData, TaskPageData, TaskRecord, UploadData, WorkerInfoData,
};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const LOGIN_ENDPOINT: &str = "/app-api/app/auth/sms-login";
const WORKER_INFO_ENDPOINT: &str = "/app-api/applet/worker/info";
const TASK_PAGE_ENDPOINT: &str = "/app-api/applet/task/myTaskPage";
const UPLOAD_ENDPOINT: &str = "/app-api/infra/file/upload";
const SUBMIT_ENDPOINT: &str = "/app-api/applet/delivery/save";

/// 上传流的分块大小
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// 交付后端客户端
pub struct HttpDeliveryApi {
    http: reqwest::Client,
    base_url: String,
    metadata_timeout: Duration,
    upload_timeout: Duration,
    task_page_size: i64,
}

impl HttpDeliveryApi {
    /// 根据配置创建客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.environment.base_url().to_string(),
            metadata_timeout: Duration::from_secs(config.metadata_timeout_secs),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
            task_page_size: config.task_page_size,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 统一 POST + 信封解析
    async fn post_envelope<T, B>(
        &self,
        endpoint: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<ApiEnvelope<T>, ApiFailure>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self
            .http
            .post(self.url(endpoint))
            .timeout(self.metadata_timeout)
            .json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| classify(endpoint, e))?;
        response
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| classify(endpoint, e))
    }
}

#[async_trait]
impl DeliveryApi for HttpDeliveryApi {
    async fn login(&self, phone: &str, code: &str) -> Result<LoginData, ApiFailure> {
        debug!("登录请求: {}", phone);
        let envelope: ApiEnvelope<LoginData> = self
            .post_envelope(LOGIN_ENDPOINT, None, &json!({ "mobile": phone, "code": code }))
            .await?;
        require_data(LOGIN_ENDPOINT, envelope)
    }

    async fn worker_info(&self, token: &str) -> Result<WorkerInfoData, ApiFailure> {
        let response = self
            .http
            .get(self.url(WORKER_INFO_ENDPOINT))
            .timeout(self.metadata_timeout)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| classify(WORKER_INFO_ENDPOINT, e))?;
        let envelope: ApiEnvelope<WorkerInfoData> = response
            .json()
            .await
            .map_err(|e| classify(WORKER_INFO_ENDPOINT, e))?;
        require_data(WORKER_INFO_ENDPOINT, envelope)
    }

    async fn my_tasks(&self, token: &str, status_type: i64) -> Result<Vec<TaskRecord>, ApiFailure> {
        let body = json!({
            "pageNo": 1,
            "pageSize": self.task_page_size,
            "statusType": status_type,
        });
        let envelope: ApiEnvelope<TaskPageData> = self
            .post_envelope(TASK_PAGE_ENDPOINT, Some(token), &body)
            .await?;
        Ok(require_data(TASK_PAGE_ENDPOINT, envelope)?.list)
    }

    async fn upload(
        &self,
        token: &str,
        file: UploadFile,
        progress: ProgressFn,
    ) -> Result<String, ApiFailure> {
        let total = file.bytes.len();
        debug!("上传文件: {} ({} 字节)", file.file_name, total);

        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(progress_stream(file.bytes.clone(), progress)),
            total as u64,
        )
        .file_name(file.file_name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url(UPLOAD_ENDPOINT))
            .timeout(self.upload_timeout)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify(UPLOAD_ENDPOINT, e))?;
        let envelope: ApiEnvelope<UploadData> = response
            .json()
            .await
            .map_err(|e| classify(UPLOAD_ENDPOINT, e))?;

        require_data(UPLOAD_ENDPOINT, envelope)?
            .into_remote_path()
            .ok_or_else(|| ApiFailure::Malformed {
                endpoint: UPLOAD_ENDPOINT.to_string(),
                message: "上传响应缺少存储路径".to_string(),
            })
    }

    async fn submit(&self, token: &str, payload: &DeliveryPayload) -> Result<(), ApiFailure> {
        let envelope: ApiEnvelope<serde_json::Value> = self
            .post_envelope(SUBMIT_ENDPOINT, Some(token), payload)
            .await?;
        if !envelope.is_success() {
            return Err(ApiFailure::Server {
                endpoint: SUBMIT_ENDPOINT.to_string(),
                code: envelope.code,
                message: envelope.message(),
            });
        }
        Ok(())
    }
}

/// 把文件内容切块成流，每拉取一块就上报一次累计进度
fn progress_stream(
    bytes: Bytes,
    progress: ProgressFn,
) -> impl futures::Stream<Item = Result<Bytes, std::io::Error>> {
    let total = bytes.len();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + UPLOAD_CHUNK_BYTES).min(total);
        chunks.push(bytes.slice(start..end));
        start = end;
    }
    if chunks.is_empty() {
        chunks.push(Bytes::new());
    }

    let sent = Arc::new(AtomicUsize::new(0));
    futures::stream::iter(chunks.into_iter().map(move |chunk| {
        let done = sent.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
        let percent = if total == 0 {
            100
        } else {
            ((done * 100) / total).min(100) as u8
        };
        progress(percent);
        Ok(chunk)
    }))
}

/// 将 reqwest 错误分类为传输层失败
fn classify(endpoint: &str, err: reqwest::Error) -> ApiFailure {
    let endpoint = endpoint.to_string();
    if err.is_timeout() {
        ApiFailure::Timeout { endpoint }
    } else if err.is_decode() {
        ApiFailure::Malformed {
            endpoint,
            message: err.to_string(),
        }
    } else {
        ApiFailure::Connectivity {
            endpoint,
            message: err.to_string(),
        }
    }
}

/// 校验信封并取出 data
fn require_data<T>(endpoint: &str, envelope: ApiEnvelope<T>) -> Result<T, ApiFailure> {
    if !envelope.is_success() {
        return Err(ApiFailure::Server {
            endpoint: endpoint.to_string(),
            code: envelope.code,
            message: envelope.message(),
        });
    }
    envelope.data.ok_or_else(|| ApiFailure::Malformed {
        endpoint: endpoint.to_string(),
        message: "响应缺少 data 字段".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_data_server_error() {
        let envelope = ApiEnvelope::<LoginData> {
            code: 500,
            msg: Some("验证码错误".to_string()),
            data: None,
        };
        match require_data("/x", envelope) {
            Err(ApiFailure::Server { code, message, .. }) => {
                assert_eq!(code, 500);
                assert_eq!(message, "验证码错误");
            }
            other => panic!("意外结果: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_require_data_missing_data() {
        let envelope = ApiEnvelope::<LoginData> {
            code: 0,
            msg: None,
            data: None,
        };
        assert!(matches!(
            require_data("/x", envelope),
            Err(ApiFailure::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_progress_stream_reaches_hundred() {
        use futures::StreamExt;

        let reported = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = reported.clone();
        let progress: ProgressFn = Arc::new(move |p| sink.lock().unwrap().push(p));

        let bytes = Bytes::from(vec![0u8; UPLOAD_CHUNK_BYTES * 2 + 10]);
        let chunks: Vec<_> = progress_stream(bytes, progress).collect().await;

        assert_eq!(chunks.len(), 3);
        let reported = reported.lock().unwrap();
        assert_eq!(*reported.last().unwrap(), 100);
        assert!(reported.windows(2).all(|w| w[0] <= w[1]));
    }
}
