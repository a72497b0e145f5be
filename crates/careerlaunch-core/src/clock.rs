//! 시간 소스 추상화.
//!
//! 토큰 만료 판정처럼 현재 시각에 의존하는 로직은 [`Clock`]을 주입받아
//! 테스트에서 시각을 고정하거나 앞당길 수 있습니다.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// 현재 시각 제공자.
pub trait Clock: Send + Sync {
    /// 현재 UTC 시각.
    fn now(&self) -> DateTime<Utc>;

    /// 현재 Unix timestamp (초).
    fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// 시스템 시계 (운영용).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 테스트용 고정 시계.
///
/// 초 단위로 저장하며 [`FixedClock::advance`]로 시각을 앞당길 수 있습니다.
#[derive(Debug)]
pub struct FixedClock {
    timestamp: AtomicI64,
}

impl FixedClock {
    /// 주어진 Unix timestamp (초)로 고정된 시계 생성.
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp: AtomicI64::new(timestamp),
        }
    }

    /// 주어진 시각으로 고정된 시계 생성 (초 미만은 버림).
    pub fn at(time: DateTime<Utc>) -> Self {
        Self::new(time.timestamp())
    }

    /// 시각을 `by`만큼 앞당깁니다.
    pub fn advance(&self, by: Duration) {
        self.timestamp.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }

    /// 시각을 지정한 timestamp로 설정합니다.
    pub fn set(&self, timestamp: i64) {
        self.timestamp.store(timestamp, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.timestamp.load(Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
    }

    fn timestamp(&self) -> i64 {
        self.timestamp.load(Ordering::SeqCst)
    }
}
