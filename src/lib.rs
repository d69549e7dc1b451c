//! # Delivery Submit
//!
//! 多工人交付编排子系统：同时认证多个外勤工人、维护每个工人的待交付
//! 任务队列、按 (工人, 任务) 维护独立草稿、并发上传附件并驱动提交流程。
//!
//! ## 架构设计
//!
//! 本子系统采用分层架构：
//!
//! ### ① 状态仓库层（Stores）
//! - `stores/` - 全部共享可变状态的唯一归属
//! - `TaskRegistry` - 会话与任务队列，下一个选中策略
//! - `DraftStore` - 按二元键寻址的草稿仓库，按键整体替换
//! - `PreviewRegistry` - 图片预览句柄的分配与恰好一次释放
//!
//! ### ② 接口层（Clients）
//! - `clients/` - 后端五个接口契约的唯一缝隙
//! - `DeliveryApi` - trait，生产走 reqwest，测试走内存替身
//! - 每个调用带显式超时，超时即失败，绝不悬挂
//!
//! ### ③ 业务能力层（Services）
//! - `phone_parser` - 手机号解析（多分隔符、去重）
//! - `AttachmentUploader` - 附件校验、入队、全并行上传
//!
//! ### ④ 编排层（Orchestration）
//! - `SessionAuthenticator` - 分批并发登录，逐个收集结果
//! - `SubmissionCoordinator` - 提交状态机与选中推进
//! - `DeliveryConsole` - 对外门面，持有状态与生命周期
//!
//! ## 并发模型
//!
//! 单一逻辑控制流，网络调用为挂起点；登录按批大小约束出站并发，
//! 第 N 批全部出结果才开第 N+1 批；同一次入队的附件全部并行上传
//! （刻意不限并发）。状态锁从不跨 await 持有。

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod stores;
pub mod utils;

// 重新导出常用类型
pub use clients::{DeliveryApi, HttpDeliveryApi, ProgressFn, UploadFile};
pub use config::{Config, Environment};
pub use error::{
    ApiFailure, AppError, AppResult, AuthError, StateError, SubmitError, UploadError,
    ValidationError,
};
pub use models::{
    Attachment, AttachmentKind, Draft, DraftField, DraftKey, SubmitPhase, Task, UploadState,
    WorkerSession,
};
pub use orchestrator::{AuthReport, DeliveryConsole, SubmitOutcome};
pub use services::{parse_phone_numbers, EnqueueReport, StagedFile};
