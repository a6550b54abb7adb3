// ==========================================
// 选修课注册系统 - SQL 计数与慢查询日志
// ==========================================
// 开关: ELECTIVE_REG_PERF_SQL（debug 构建默认开启）
// 阈值: ELECTIVE_REG_SLOW_SQL_MS（debug 50ms / release 200ms）
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub const PERF_SQL_ENV: &str = "ELECTIVE_REG_PERF_SQL";
pub const SLOW_SQL_MS_ENV: &str = "ELECTIVE_REG_SLOW_SQL_MS";

const SQL_LOG_MAX_CHARS: usize = 420;

static ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static COUNTERS: Counters = const { Counters::new() };
}

/// 线程内计数；只有 PerfGuard 存活期间才累加
struct Counters {
    active_guards: Cell<u32>,
    statements: Cell<u64>,
    slow_statements: Cell<u64>,
}

impl Counters {
    const fn new() -> Self {
        Self {
            active_guards: Cell::new(0),
            statements: Cell::new(0),
            slow_statements: Cell::new(0),
        }
    }

    fn bump(cell: &Cell<u64>) {
        cell.set(cell.get().saturating_add(1));
    }

    fn snapshot(&self) -> (u64, u64) {
        (self.statements.get(), self.slow_statements.get())
    }
}

/// 从环境变量解析出的 SQL 追踪设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PerfSettings {
    enabled: bool,
    slow_ms: u64,
}

impl PerfSettings {
    fn from_env() -> Self {
        Self::parse(
            std::env::var(PERF_SQL_ENV).ok().as_deref(),
            std::env::var(SLOW_SQL_MS_ENV).ok().as_deref(),
        )
    }

    fn parse(enabled: Option<&str>, slow_ms: Option<&str>) -> Self {
        let enabled = match enabled {
            Some(v) => matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ),
            None => cfg!(debug_assertions),
        };
        let default_ms = if cfg!(debug_assertions) { 50 } else { 200 };
        let slow_ms = slow_ms
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(default_ms);
        Self { enabled, slow_ms }
    }
}

/// 为连接挂上 trace/profile 回调
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let settings = PerfSettings::from_env();
    ENABLED.store(settings.enabled, Ordering::Relaxed);
    SLOW_THRESHOLD_MS.store(settings.slow_ms, Ordering::Relaxed);

    if settings.enabled {
        conn.trace(Some(on_statement));
        conn.profile(Some(on_profile));
        tracing::debug!(slow_ms = settings.slow_ms, "SQL 追踪已开启");
    } else {
        conn.trace(None);
        conn.profile(None);
    }
}

fn on_statement(_sql: &str) {
    if !ENABLED.load(Ordering::Relaxed) {
        return;
    }
    COUNTERS.with(|c| {
        if c.active_guards.get() > 0 {
            Counters::bump(&c.statements);
        }
    });
}

fn on_profile(sql: &str, duration: Duration) {
    let threshold = SLOW_THRESHOLD_MS.load(Ordering::Relaxed);
    let ms = duration.as_millis() as u64;
    if !ENABLED.load(Ordering::Relaxed) || threshold == 0 || ms < threshold {
        return;
    }

    tracing::warn!(
        target: "slow_sql",
        duration_ms = ms,
        sql = %compact_sql(sql, SQL_LOG_MAX_CHARS),
        "slow sql"
    );
    COUNTERS.with(|c| {
        if c.active_guards.get() > 0 {
            Counters::bump(&c.slow_statements);
        }
    });
}

/// 折叠空白并按字符数截断
fn compact_sql(sql: &str, max_chars: usize) -> String {
    let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &collapsed[..idx]),
        None => collapsed,
    }
}

/// 记录一次操作的耗时、SQL 语句数与慢 SQL 数，drop 时输出
///
/// 计数按线程统计；跨 await 换线程后只计入当前线程的部分
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    baseline: (u64, u64),
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let baseline = COUNTERS.with(|c| {
            c.active_guards.set(c.active_guards.get().saturating_add(1));
            c.snapshot()
        });
        Self {
            op,
            start: Instant::now(),
            baseline,
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let (statements, slow) = COUNTERS.with(|c| {
            c.active_guards.set(c.active_guards.get().saturating_sub(1));
            c.snapshot()
        });

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            sql_count = statements.saturating_sub(self.baseline.0),
            slow_sql_count = slow.saturating_sub(self.baseline.1),
            "done"
        );
    }
}
