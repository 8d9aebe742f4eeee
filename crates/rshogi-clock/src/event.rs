//! 時計から対局側へ返すイベント

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::Color;

/// 時計が発行するイベント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "side", rename_all = "snake_case")]
pub enum ClockEvent {
    /// 表示値（秒丸め）が変わった
    DisplayChanged,
    /// 指定手番が時間切れになった
    Timeout(Color),
    /// 時間切れによる投了トリガー。`Timeout` の直後に 1 度だけ出る。
    ResignationTriggered,
}

/// 1 回の呼び出しで発生したイベント列（発生順）
///
/// 時間切れ時でも Timeout / ResignationTriggered / DisplayChanged の 3 件なので
/// ヒープ確保は起きない。
pub type ClockEvents = SmallVec<[ClockEvent; 3]>;

/// `events` に時間切れが含まれていればその手番を返す
pub fn timed_out_side(events: &[ClockEvent]) -> Option<Color> {
    events.iter().find_map(|e| match e {
        ClockEvent::Timeout(side) => Some(*side),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn timed_out_side_picks_timeout() {
        let events: ClockEvents = smallvec![
            ClockEvent::Timeout(Color::White),
            ClockEvent::ResignationTriggered,
            ClockEvent::DisplayChanged
        ];
        assert!(!events.spilled());
        assert_eq!(timed_out_side(&events), Some(Color::White));
        assert_eq!(timed_out_side(&[ClockEvent::DisplayChanged]), None);
    }

    #[test]
    fn event_json_shape() {
        let json = serde_json::to_string(&ClockEvent::Timeout(Color::Black)).unwrap();
        assert_eq!(json, r#"{"kind":"timeout","side":"black"}"#);
        let json = serde_json::to_string(&ClockEvent::DisplayChanged).unwrap();
        assert_eq!(json, r#"{"kind":"display_changed"}"#);
    }
}
