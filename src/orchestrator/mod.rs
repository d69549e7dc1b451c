//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责多工人交付流程的调度，是整个子系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `session_authenticator` - 批量登录认证器
//! - 解析手机号文本（多分隔符、去重）
//! - 分批并发登录（批内并发、批间串行）
//! - 工人信息 / 任务列表并发拉取，独立容错降级
//! - 复用 token 的 refresh
//!
//! ### `submission_coordinator` - 提交协调器
//! - 草稿字段校验与附件就绪拦截
//! - 组装提交报文并调用后端
//! - 成功后退役任务、丢弃草稿、推进选中
//!
//! ### `console` - 交付控制台
//! - 子系统对外门面，唯一持有共享状态
//! - 暴露全部操作：认证、刷新、选中、编辑、附件、提交、登出
//!
//! ## 层次关系
//!
//! ```text
//! console (对外门面，持有状态)
//!     ↓
//! session_authenticator / submission_coordinator / uploader
//!     ↓
//! stores (登记处与仓库)    clients (后端接口)
//! ```

pub mod console;
pub mod session_authenticator;
pub mod submission_coordinator;

// 重新导出主要类型
pub use console::DeliveryConsole;
pub use session_authenticator::{AuthReport, FetchKind, PartialFetch, SessionAuthenticator};
pub use submission_coordinator::{SubmissionCoordinator, SubmitOutcome};
