// ==========================================
// 选修课注册系统 - API层
// ==========================================
// 职责: 业务入口，完成权限校验与院系隔离后调用下层
// 约束: 所有操作显式接收调用方 AuthContext
// ==========================================

pub mod admin_api;
pub mod elective_api;
pub mod error;
pub mod import_api;
pub mod registration_api;
pub mod report_api;

pub use admin_api::AdminApi;
pub use elective_api::ElectiveApi;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use import_api::{ImportApi, UploadStudentsResponse, UPLOAD_COMPLETED_MSG};
pub use registration_api::RegistrationApi;
pub use report_api::{ElectiveEnrollment, EnrolledStudent, ReportApi};
