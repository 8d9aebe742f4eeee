//! 「待った」用の状態履歴
//!
//! 手番開始（`ShogiClock::start`）ごとに 1 フレームを積む。フレームは片側分の
//! 可変状態をまとめた `SideClock` の組で、全フィールドが常に同じ深さで
//! 積まれる。

use serde::{Deserialize, Serialize};

use crate::types::Color;

/// 片側の可変状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideClock {
    /// 残り時間(ms)。負にはならない。
    pub remaining_ms: u64,
    /// 現在考慮中の手の考慮時間(ms)
    pub consideration_ms: u64,
    /// 対局全体の総考慮時間(ms)
    pub total_consideration_ms: u64,
    /// 秒読みに入っているか
    pub byoyomi_applied: bool,
    /// 直近手の考慮として表示する秒数（総考慮の秒切り捨て差分）
    pub last_move_shown_sec: u64,
    /// 前回着手確定時の総考慮（秒切り捨て）
    pub prev_shown_total_sec: u64,
    /// 着手確定済みで、次の手番開始時に考慮時間を 0 に戻す
    pub consideration_reset_pending: bool,
}

/// 両者の状態スナップショット
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFrame {
    pub sides: [SideClock; Color::NUM],
}

impl HistoryFrame {
    #[inline]
    pub fn side(&self, color: Color) -> &SideClock {
        &self.sides[color.index()]
    }
}

/// 1 回の `undo` で戻す手数（先後 1 手ずつ）
pub const UNDO_PLIES: usize = 2;

/// `undo` に必要な最小の履歴深さ（基準 1 + 2 手分）
pub const MIN_UNDO_DEPTH: usize = UNDO_PLIES + 1;

/// スナップショットのスタック
#[derive(Debug, Clone, Default)]
pub struct History {
    frames: Vec<HistoryFrame>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: HistoryFrame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// 2 フレームを捨て、新しい先頭を返す。深さが `MIN_UNDO_DEPTH` 未満なら何もしない。
    pub fn rewind_pair(&mut self) -> Option<HistoryFrame> {
        if self.frames.len() < MIN_UNDO_DEPTH {
            return None;
        }
        self.frames.truncate(self.frames.len() - UNDO_PLIES);
        self.frames.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(remaining: u64) -> HistoryFrame {
        let side = SideClock {
            remaining_ms: remaining,
            ..SideClock::default()
        };
        HistoryFrame { sides: [side; 2] }
    }

    #[test]
    fn rewind_requires_three_frames() {
        let mut h = History::new();
        h.push(frame(300));
        h.push(frame(290));
        assert_eq!(h.rewind_pair(), None);
        assert_eq!(h.len(), 2);

        h.push(frame(280));
        let top = h.rewind_pair().unwrap();
        assert_eq!(top.side(Color::Black).remaining_ms, 300);
        // 先頭フレームは残る
        assert_eq!(h.len(), 1);
        assert_eq!(h.rewind_pair(), None);
    }
}
