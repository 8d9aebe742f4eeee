//! USI `go` コマンド用の時間引数

use serde::{Deserialize, Serialize};

use crate::clock::ShogiClock;
use crate::time_source::TimeSource;
use crate::types::Color;

/// `go btime .. wtime .. byoyomi .. binc .. winc ..` の各値(ms)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoTimes {
    pub btime: u64,
    pub wtime: u64,
    pub byoyomi: u64,
    pub binc: u64,
    pub winc: u64,
}

impl GoTimes {
    /// 時計の現在値から USI 向けの時間引数を組み立てる。
    ///
    /// - 秒読み方式: btime/wtime は持ち時間の残りのみ。秒読みに入っていれば 0。
    /// - それ以外: 時計の残りは加算済みの値なので、USI の慣習に合わせて
    ///   加算分を 1 回引いた値を送る。
    pub fn from_clock<S: TimeSource>(clock: &ShogiClock<S>) -> Self {
        if clock.is_byoyomi_match() {
            let main_left = |c: Color| {
                if clock.byoyomi_applied(c) { 0 } else { clock.remaining_ms(c) }
            };
            return Self {
                btime: main_left(Color::Black),
                wtime: main_left(Color::White),
                byoyomi: clock.common_byoyomi_ms(),
                binc: 0,
                winc: 0,
            };
        }

        let binc = clock.increment_ms(Color::Black);
        let winc = clock.increment_ms(Color::White);
        Self {
            btime: clock.remaining_ms(Color::Black).saturating_sub(binc),
            wtime: clock.remaining_ms(Color::White).saturating_sub(winc),
            byoyomi: 0,
            binc,
            winc,
        }
    }

    pub fn time_for(&self, color: Color) -> u64 {
        match color {
            Color::Black => self.btime,
            Color::White => self.wtime,
        }
    }

    /// `go` に続けて送る引数列
    pub fn to_usi_args(&self) -> String {
        let mut s = format!("btime {} wtime {}", self.btime, self.wtime);
        if self.byoyomi > 0 {
            s.push_str(&format!(" byoyomi {}", self.byoyomi));
        }
        if self.binc > 0 || self.winc > 0 {
            s.push_str(&format!(" binc {} winc {}", self.binc, self.winc));
        }
        s
    }
}

impl<S: TimeSource> ShogiClock<S> {
    /// 現在の時計状態に対応する USI `go` 時間引数
    pub fn go_times(&self) -> GoTimes {
        GoTimes::from_clock(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::ManualTimeSource;

    #[test]
    fn byoyomi_match_sends_main_time_only() {
        let src = ManualTimeSource::new(0);
        let mut clock = ShogiClock::with_source(src.clone());
        clock.set_player_times(10, 600, 30, 30, 0, 0, true);
        clock.start();
        src.advance(12_000);
        clock.tick();
        clock.stop();
        clock.commit_move(Color::Black);

        let go = clock.go_times();
        assert_eq!(go.btime, 0, "black is already in byoyomi");
        assert_eq!(go.wtime, 600_000);
        assert_eq!(go.byoyomi, 30_000);
        assert_eq!(go.to_usi_args(), "btime 0 wtime 600000 byoyomi 30000");
    }

    #[test]
    fn fischer_match_sends_pre_increment_time() {
        let mut clock = ShogiClock::with_source(ManualTimeSource::new(0));
        clock.set_player_times(300, 300, 0, 0, 10, 5, true);
        clock.commit_move(Color::Black);
        let go = clock.go_times();
        assert_eq!(go.btime, 300_000);
        assert_eq!(go.wtime, 295_000);
        assert_eq!((go.binc, go.winc), (10_000, 5_000));
        assert_eq!(go.time_for(Color::White), 295_000);
        assert_eq!(go.to_usi_args(), "btime 300000 wtime 295000 binc 10000 winc 5000");
    }

    #[test]
    fn uneven_byoyomi_is_not_sent() {
        let mut clock = ShogiClock::with_source(ManualTimeSource::new(0));
        clock.set_player_times(60, 60, 30, 10, 0, 0, true);
        assert_eq!(clock.go_times().byoyomi, 0);
    }
}
