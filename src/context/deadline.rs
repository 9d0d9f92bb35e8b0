//
//  asc-cli
//  context/deadline.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::AscError;

/// Default invocation budget when neither `--timeout` nor `ASC_TIMEOUT` is set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// The point in time by which the whole invocation must finish.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Runs `work` under the deadline.
    ///
    /// Expiry surfaces as [`AscError::Cancelled`] whose cause names the budget.
    /// Errors produced by `work` itself pass through untouched.
    pub async fn run<F, T>(&self, work: F) -> Result<T, AscError>
    where
        F: Future<Output = Result<T, AscError>>,
    {
        match tokio::time::timeout_at(self.at, work).await {
            Ok(result) => result,
            Err(_) => Err(AscError::Cancelled {
                cause: Box::new(AscError::timeout(self.budget)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expiry_is_cancelled_with_timeout_cause() {
        let deadline = Deadline::after(Duration::from_millis(20));
        let err = deadline
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, AscError>(())
            })
            .await
            .unwrap_err();
        match err {
            AscError::Cancelled { cause } => {
                assert!(cause.to_string().contains("timed out after 20ms"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inner_error_is_not_masked() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let err = deadline
            .run(async { Err::<(), _>(AscError::NotFound("app \"x\" not found".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, AscError::NotFound(_)));
        assert!(!deadline.is_expired());
    }

    #[test]
    fn test_work_within_budget_passes_through() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let value = tokio_test::block_on(deadline.run(async { Ok::<_, AscError>(7) })).unwrap();
        assert_eq!(value, 7);
        assert!(deadline.remaining() <= deadline.budget());
    }
}
