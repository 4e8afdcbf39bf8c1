//! 有界重试
//!
//! LLM 调用的唯一重试入口：固定次数，无退避

use std::fmt::Display;
use std::future::Future;

use crate::application::error::ApplicationError;

/// 默认最大尝试次数
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// 执行 `attempt` 直到成功或次数耗尽
///
/// 闭包参数为当前尝试序号（从 1 开始）。成功时返回结果与实际尝试次数；
/// 耗尽时返回 `RetriesExhausted`，携带最后一次的错误信息。
pub async fn retry_bounded<T, E, F, Fut>(
    policy: RetryPolicy,
    operation: &'static str,
    mut attempt: F,
) -> Result<(T, u32), ApplicationError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for n in 1..=max_attempts {
        match attempt(n).await {
            Ok(value) => {
                if n > 1 {
                    tracing::info!(operation = operation, attempts = n, "Succeeded after retry");
                }
                return Ok((value, n));
            }
            Err(e) => {
                last_error = e.to_string();
                tracing::warn!(
                    operation = operation,
                    attempt = n,
                    max_attempts = max_attempts,
                    error = %last_error,
                    "Attempt failed"
                );
            }
        }
    }

    Err(ApplicationError::RetriesExhausted {
        operation,
        attempts: max_attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_first_attempt_success() {
        let (value, attempts) = retry_bounded(RetryPolicy::default(), "op", |_| async {
            Ok::<_, String>(7)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let (value, attempts) = retry_bounded(RetryPolicy::default(), "op", |n| async move {
            if n < 3 {
                Err(format!("bad {}", n))
            } else {
                Ok(n)
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_exhaustion_stops_at_max() {
        let calls = AtomicU32::new(0);
        let result: Result<((), u32), _> = retry_bounded(RetryPolicy::default(), "outline", |n| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("attempt {} invalid", n)) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(ApplicationError::RetriesExhausted {
                operation,
                attempts,
                last_error,
            }) => {
                assert_eq!(operation, "outline");
                assert_eq!(attempts, 3);
                assert_eq!(last_error, "attempt 3 invalid");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_attempts_runs_once() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy { max_attempts: 0 };
        let _ = retry_bounded(policy, "op", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("no") }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
