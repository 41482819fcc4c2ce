//! 读路径重试
//!
//! 页面数据加载遇到瞬时故障（断线、死锁、SQLite BUSY）时按指数退避重试。
//! 写操作不走这里。

use sea_orm::DbErr;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 判断数据库错误是否属于瞬时故障
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

fn is_retryable_runtime_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error()
                && let Some(code) = db_err.code()
            {
                return matches!(
                    code.as_ref(),
                    // MySQL 死锁 / 锁超时
                    "1213" | "1205" |
                    // PostgreSQL 序列化失败 / 死锁
                    "40001" | "40P01" |
                    // SQLite BUSY / LOCKED
                    "5" | "6"
                );
            }
            is_transient_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => is_transient_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_transient_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    ["deadlock", "lock wait timeout", "database is locked", "serialization failure"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// 重试配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// 首次失败后最多再试几次
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryConfig {
    /// 不重试
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(db: &DatabaseConfig) -> Self {
        Self {
            max_retries: db.retry_count,
            base_delay_ms: db.retry_base_delay_ms,
            max_delay_ms: db.retry_max_delay_ms.max(db.retry_base_delay_ms),
        }
    }
}

/// 按 `config` 重试可重试错误，不可重试的错误立即返回
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("'{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !is_retryable_error(&err) {
            debug!("'{}' failed with non-retryable error: {}", operation_name, err);
            return Err(err);
        }
        if attempt >= config.max_retries {
            warn!(
                "'{}' still failing after {} retries: {}",
                operation_name, attempt, err
            );
            return Err(err);
        }

        attempt += 1;
        let delay = backoff_delay(attempt, config.base_delay_ms, config.max_delay_ms);
        warn!(
            "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
            operation_name,
            attempt,
            config.max_retries + 1,
            err,
            delay
        );
        sleep(Duration::from_millis(delay)).await;
    }
}

/// 第 n 次重试的等待时间：base * 2^(n-1)，封顶 max，再加 0-25% 抖动
fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    use rand::RngExt;
    let exp = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp.min(max_ms);
    let jitter = rand::rng().random_range(0..=capped / 4);
    capped.saturating_add(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::error::{ConnAcquireErr, RuntimeErr};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            base_delay_ms: 5,
            max_delay_ms: 20,
        }
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(is_retryable_error(&DbErr::ConnectionAcquire(
            ConnAcquireErr::Timeout
        )));
        assert!(is_retryable_error(&DbErr::Conn(RuntimeErr::Internal(
            "connection reset".to_string()
        ))));
        assert!(is_retryable_error(&DbErr::Query(RuntimeErr::Internal(
            "database is locked".to_string()
        ))));
        assert!(is_retryable_error(&DbErr::Exec(RuntimeErr::Internal(
            "Deadlock found when trying to get lock".to_string()
        ))));
    }

    #[test]
    fn test_permanent_errors_are_not_retryable() {
        assert!(!is_retryable_error(&DbErr::RecordNotFound("x".to_string())));
        assert!(!is_retryable_error(&DbErr::Query(RuntimeErr::Internal(
            "no such table: partnerships".to_string()
        ))));
    }

    #[test]
    fn test_default_follows_database_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 1000);
        assert_eq!(config.max_delay_ms, 4000);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert!((1000..=1250).contains(&backoff_delay(1, 1000, 4000)));
        assert!((2000..=2500).contains(&backoff_delay(2, 1000, 4000)));
        assert!((4000..=5000).contains(&backoff_delay(3, 1000, 4000)));
        assert!((4000..=5000).contains(&backoff_delay(8, 1000, 4000)));
        assert_eq!(backoff_delay(1, 0, 0), 0);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result = with_retry("load_dashboard", fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout))
                } else {
                    Ok("data")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "data");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);

        let result = with_retry("load_dashboard", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)) }
        })
        .await;

        assert!(result.is_err());
        // 首次 + 3 次重试
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_no_retry_for_permanent_error_or_disabled_config() {
        let calls = AtomicU32::new(0);
        let result = with_retry("lookup", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DbErr::RecordNotFound("gone".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let calls = AtomicU32::new(0);
        let result = with_retry("lookup", RetryConfig::none(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
