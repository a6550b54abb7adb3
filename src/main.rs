// ==========================================
// 选修课注册系统 - 命令行入口
// ==========================================
// 用法:
//   elective-registration import <file> <admin_roll_no> <password>
//   elective-registration seed-admins
//   elective-registration report <admin_roll_no> <password> [elective_id]
//
// 数据库路径: ELECTIVE_REG_DB_PATH 或用户数据目录
// ELECTIVE_REG_LOG_JSON=1 时日志以 JSON 行输出
// 成功输出写 stdout（JSON / CSV），错误以 ErrorResponse JSON 写 stderr
// ==========================================

use elective_registration::api::{ApiError, ApiResult, ErrorResponse};
use elective_registration::app::{get_default_db_path, AppState};
use elective_registration::logging;
use std::path::Path;
use std::process::ExitCode;

const LOG_JSON_ENV: &str = "ELECTIVE_REG_LOG_JSON";

const USAGE: &str = "usage:
  elective-registration import <file> <admin_roll_no> <password>
  elective-registration seed-admins
  elective-registration report <admin_roll_no> <password> [elective_id]";

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::var(LOG_JSON_ENV).map(|v| v == "1").unwrap_or(false) {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!(
        version = elective_registration::VERSION,
        "{}",
        elective_registration::APP_NAME
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let db_path = get_default_db_path();
    tracing::info!(db_path = %db_path, "使用数据库");

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&state, &args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let response = ErrorResponse::from(&err);
            eprintln!(
                "{}",
                serde_json::to_string(&response).unwrap_or_else(|_| err.to_string())
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(state: &AppState, args: &[String]) -> ApiResult<String> {
    let arg = |idx: usize| args.get(idx).map(String::as_str);

    match (arg(0), args.len()) {
        (Some("import"), 4) => {
            state.seed_admins().await?;
            let ctx = state.auth.login(&args[2], &args[3])?;
            let response = state
                .import_api
                .upload_students_from_path(&ctx, Path::new(&args[1]))
                .await?;
            to_json(&response)
        }
        (Some("seed-admins"), 1) => {
            let created = state.seed_admins().await?;
            to_json(&serde_json::json!({ "created": created }))
        }
        (Some("report"), 3) | (Some("report"), 4) => {
            state.seed_admins().await?;
            let ctx = state.auth.login(&args[1], &args[2])?;
            let elective_id = match arg(3) {
                Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                    ApiError::InvalidInput(format!("elective_id must be an integer, got {}", raw))
                })?),
                None => None,
            };
            state.report_api.export_csv(&ctx, elective_id)
        }
        _ => Err(ApiError::InvalidInput(USAGE.to_string())),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> ApiResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::InternalError(e.to_string()))
}
