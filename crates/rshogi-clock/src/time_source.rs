//! 単調増加時刻ソース
//!
//! 時計は壁時計を一切参照しない。経過時間はすべて `TimeSource::now_ms()` の
//! 差分から求めるため、システム時刻の変更で負の経過時間が出ることはない。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
use web_time::Instant;

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
use std::time::Instant;

/// ミリ秒単位の単調時刻を返す時刻ソース
pub trait TimeSource {
    /// 任意の基準点からの経過ミリ秒。呼び出しごとに非減少でなければならない。
    fn now_ms(&self) -> u64;
}

/// `Instant` に基づく実時間ソース
#[derive(Debug, Clone, Copy)]
pub struct MonotonicSource {
    base: Instant,
}

impl MonotonicSource {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
        }
    }
}

impl Default for MonotonicSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicSource {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.base.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
    }
}

/// ホストが明示的に進める時刻ソース
///
/// クローンは同じ時刻を共有するので、時計に渡した後もホスト側の
/// ハンドルから `advance` できる。シミュレーションとテスト用。
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// 時刻を `ms` だけ進める
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::Relaxed);
    }

    /// 時刻を直接設定する。過去へ戻すと単調性が崩れるので、
    /// 時計側はその区間を経過 0 として扱う。
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::Relaxed);
    }
}

impl TimeSource for ManualTimeSource {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_monotonic_source_is_non_decreasing() {
        let src = MonotonicSource::new();
        let mut last = src.now_ms();
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(1));
            let now = src.now_ms();
            assert!(now >= last, "now_ms must be non-decreasing");
            last = now;
        }
    }

    #[test]
    fn test_manual_source_shared_between_clones() {
        let host = ManualTimeSource::new(1000);
        let clock_side = host.clone();
        host.advance(250);
        assert_eq!(clock_side.now_ms(), 1250);
        host.set(5000);
        assert_eq!(clock_side.now_ms(), 5000);
    }
}
