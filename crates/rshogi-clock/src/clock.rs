//! 将棋対局用の時計
//!
//! 先手/後手の残り時間をミリ秒精度で管理し、秒読み・フィッシャー加算の適用、
//! 時間切れ判定、「待った」による 2 手分の巻き戻しを行う。
//!
//! 時計自身はタイマーを持たない。ホストが `TICK_INTERVAL_MS` 程度の間隔で
//! `tick()`（または経過時間を自前で測る場合は `tick_by()`）を呼び、
//! 返ってきた `ClockEvents` に応じて表示更新や終局処理を行う。
//! 呼び出しはすべて 1 つの所有者から直列に行う前提で、内部に排他制御は無い。

use log::{debug, info, trace};
use smallvec::smallvec;

use crate::config::{PlayerTime, TimeControl};
use crate::display::{ceil_secs, floor_secs, format_hms, format_ms};
use crate::event::{ClockEvent, ClockEvents};
use crate::history::{History, HistoryFrame, SideClock};
use crate::time_source::{MonotonicSource, TimeSource};
use crate::types::Color;

/// ホストが `tick()` を呼ぶ標準間隔(ms)
pub const TICK_INTERVAL_MS: u64 = 50;

/// 対局時計
#[derive(Debug)]
pub struct ShogiClock<S: TimeSource = MonotonicSource> {
    source: S,
    running: bool,
    /// 前回 tick（または start/stop）時点の時刻
    last_tick_ms: u64,

    time_limited: bool,
    lose_on_timeout: bool,
    current: Color,
    game_over: bool,

    byoyomi_ms: [u64; Color::NUM],
    increment_ms: [u64; Color::NUM],

    sides: [SideClock; Color::NUM],
    /// 前回通知した残り秒（切り上げ）。表示更新イベントの変化検出用。
    shown_remaining_sec: [u64; Color::NUM],

    history: History,
}

impl ShogiClock<MonotonicSource> {
    pub fn new() -> Self {
        Self::with_source(MonotonicSource::new())
    }
}

impl Default for ShogiClock<MonotonicSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimeSource> ShogiClock<S> {
    /// 任意の時刻ソースで時計を作る。設定前は持ち時間 0・時間制限なし。
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            running: false,
            last_tick_ms: 0,
            time_limited: false,
            lose_on_timeout: true,
            current: Color::Black,
            game_over: false,
            byoyomi_ms: [0; Color::NUM],
            increment_ms: [0; Color::NUM],
            sides: [SideClock::default(); Color::NUM],
            shown_remaining_sec: [0; Color::NUM],
            history: History::new(),
        }
    }

    pub fn time_source(&self) -> &S {
        &self.source
    }

    // ------------------------------------------------------------------
    // 設定
    // ------------------------------------------------------------------

    /// 対局の時間設定を適用する。
    ///
    /// 新しい対局として扱い、時計停止・終局フラグ解除・履歴クリアを行う。
    /// 秒読みと加算が両方指定されていれば加算側を 0 にする。
    pub fn configure(&mut self, tc: &TimeControl) -> ClockEvents {
        let tc = tc.normalized();
        debug!(
            "[Clock] configure black={} white={} limited={} lose_on_timeout={}",
            tc.black, tc.white, tc.time_limited, tc.lose_on_timeout
        );

        for color in Color::ALL {
            let p = tc.player(color);
            let i = color.index();
            self.byoyomi_ms[i] = p.byoyomi_ms();
            self.increment_ms[i] = p.increment_ms();
            self.sides[i] = SideClock {
                remaining_ms: p.main_ms(),
                ..SideClock::default()
            };
        }
        self.time_limited = tc.time_limited;
        self.lose_on_timeout = tc.lose_on_timeout;
        self.running = false;
        self.game_over = false;
        self.history.clear();

        self.refresh_shown_remaining();
        smallvec![ClockEvent::DisplayChanged]
    }

    /// 両対局者の持ち時間・秒読み・加算を秒単位で一括設定する。
    ///
    /// 時間切れ負けの方針は変更しない（`set_lose_on_timeout` で別途設定）。
    #[allow(clippy::too_many_arguments)]
    pub fn set_player_times(
        &mut self,
        black_main_secs: u64,
        white_main_secs: u64,
        black_byoyomi_secs: u64,
        white_byoyomi_secs: u64,
        black_increment_secs: u64,
        white_increment_secs: u64,
        time_limited: bool,
    ) -> ClockEvents {
        let tc = TimeControl {
            black: PlayerTime::new(black_main_secs, black_byoyomi_secs, black_increment_secs),
            white: PlayerTime::new(white_main_secs, white_byoyomi_secs, white_increment_secs),
            time_limited,
            lose_on_timeout: self.lose_on_timeout,
        };
        self.configure(&tc)
    }

    pub fn set_lose_on_timeout(&mut self, lose_on_timeout: bool) {
        self.lose_on_timeout = lose_on_timeout;
    }

    /// 減算対象の手番を設定する
    pub fn set_current_player(&mut self, color: Color) {
        self.current = color;
    }

    /// 考慮時間を外部から上書きする（エンジンが報告した思考時間の反映など）。
    /// 次の手番開始時の自動リセットは取り消される。
    pub fn set_consideration_ms(&mut self, color: Color, ms: u64) {
        let side = &mut self.sides[color.index()];
        side.consideration_ms = ms;
        side.consideration_reset_pending = false;
    }

    /// 投了・詰みなど時計以外の理由で終局したことを記録する。
    /// 以降は残り時間・秒読み・加算を変更しない。
    ///
    /// 動作フラグはそのまま残す（tick は無効になる）。続く `stop()` は
    /// 考慮時間だけを精算する。
    pub fn mark_game_over(&mut self) {
        if !self.game_over {
            debug!("[Clock] game over (external)");
        }
        self.game_over = true;
    }

    // ------------------------------------------------------------------
    // 計時
    // ------------------------------------------------------------------

    /// 現在手番の計時を開始する。動作中なら何もしない。
    pub fn start(&mut self) -> ClockEvents {
        if self.running {
            debug!("[Clock] start ignored: already running");
            return ClockEvents::new();
        }

        let side = &mut self.sides[self.current.index()];
        if side.consideration_reset_pending {
            side.consideration_ms = 0;
            side.consideration_reset_pending = false;
        }

        self.save_state();
        self.last_tick_ms = self.source.now_ms();
        self.refresh_shown_remaining();
        self.running = true;
        smallvec![ClockEvent::DisplayChanged]
    }

    /// 計時を止め、前回 tick からの経過分を精算する。停止中なら何もしない。
    ///
    /// ここでは秒読みへの移行や時間切れ判定は行わず、残り時間を 0 で止める。
    /// 秒読みの付与は `commit_move` が行う。
    pub fn stop(&mut self) -> ClockEvents {
        if !self.running {
            debug!("[Clock] stop ignored: not running");
            return ClockEvents::new();
        }

        let now = self.source.now_ms();
        let elapsed = now.saturating_sub(self.last_tick_ms);
        if elapsed > 0 {
            self.last_tick_ms = now;
            let limited = self.time_limited && !self.game_over;
            let side = &mut self.sides[self.current.index()];
            if limited {
                side.remaining_ms = side.remaining_ms.saturating_sub(elapsed);
            }
            side.consideration_ms = side.consideration_ms.saturating_add(elapsed);
        }

        self.running = false;
        self.refresh_shown_remaining();
        smallvec![ClockEvent::DisplayChanged]
    }

    /// 時刻ソースから経過時間を求めて消費する。ホストの定期呼び出し用。
    pub fn tick(&mut self) -> ClockEvents {
        if !self.running || self.game_over {
            return ClockEvents::new();
        }
        let now = self.source.now_ms();
        let elapsed = now.saturating_sub(self.last_tick_ms);
        if elapsed == 0 {
            return ClockEvents::new();
        }
        self.last_tick_ms = now;
        self.consume(elapsed)
    }

    /// ホストが測った経過時間を直接消費する。
    ///
    /// 基準時刻も同じだけ進めるので、後続の `tick()` / `stop()` は
    /// この分を二重に数えない。
    pub fn tick_by(&mut self, elapsed_ms: u64) -> ClockEvents {
        if !self.running || self.game_over || elapsed_ms == 0 {
            return ClockEvents::new();
        }
        self.last_tick_ms = self.last_tick_ms.saturating_add(elapsed_ms);
        self.consume(elapsed_ms)
    }

    fn consume(&mut self, elapsed: u64) -> ClockEvents {
        let player = self.current;
        let i = player.index();
        let mut events = ClockEvents::new();

        if !self.time_limited {
            let side = &mut self.sides[i];
            side.consideration_ms = side.consideration_ms.saturating_add(elapsed);
            return events;
        }

        let byoyomi_ms = self.byoyomi_ms[i];
        let side = &mut self.sides[i];
        side.consideration_ms = side.consideration_ms.saturating_add(elapsed);

        let exhausted = if elapsed < side.remaining_ms {
            side.remaining_ms -= elapsed;
            false
        } else {
            let overshoot = elapsed - side.remaining_ms;
            side.remaining_ms = 0;
            if byoyomi_ms > 0 && !side.byoyomi_applied {
                // 持ち時間 → 秒読み
                side.byoyomi_applied = true;
                trace!("[Clock] {player} entered byoyomi (overshoot={overshoot}ms)");
                if overshoot < byoyomi_ms {
                    side.remaining_ms = byoyomi_ms - overshoot;
                    false
                } else {
                    true
                }
            } else {
                true
            }
        };

        if exhausted && self.lose_on_timeout {
            self.game_over = true;
            self.running = false;
            info!("[Clock] {player} lost on time");
            events.push(ClockEvent::Timeout(player));
            events.push(ClockEvent::ResignationTriggered);
            self.refresh_shown_remaining();
            events.push(ClockEvent::DisplayChanged);
            return events;
        }

        self.debug_check_invariants();

        if self.refresh_shown_remaining() {
            events.push(ClockEvent::DisplayChanged);
        }
        events
    }

    // ------------------------------------------------------------------
    // 着手確定
    // ------------------------------------------------------------------

    /// `player` の着手確定後に秒読み/加算を適用し、考慮時間を総考慮に確定する。
    ///
    /// - 秒読みあり: 持ち時間切れ or 既に秒読み中なら秒読みを満タンに戻す
    /// - 加算あり: 残りが正のときだけ加算する（0 なら実質負けなので加算しない）
    /// - 終局後: 総考慮の確定のみ
    pub fn commit_move(&mut self, player: Color) -> ClockEvents {
        let i = player.index();

        if !self.game_over {
            let byoyomi_ms = self.byoyomi_ms[i];
            let increment_ms = self.increment_ms[i];
            let side = &mut self.sides[i];
            if byoyomi_ms > 0 {
                if side.remaining_ms == 0 || side.byoyomi_applied {
                    side.remaining_ms = byoyomi_ms;
                    side.byoyomi_applied = true;
                }
            } else if increment_ms > 0 && side.remaining_ms > 0 {
                side.remaining_ms = side.remaining_ms.saturating_add(increment_ms);
            }
        }

        let side = &mut self.sides[i];
        side.total_consideration_ms =
            side.total_consideration_ms.saturating_add(side.consideration_ms);
        let total_sec = floor_secs(side.total_consideration_ms);
        side.last_move_shown_sec = total_sec.saturating_sub(side.prev_shown_total_sec);
        side.prev_shown_total_sec = total_sec;
        side.consideration_reset_pending = true;

        trace!(
            "[Clock] commit {player}: remaining={}ms consideration={}ms total={}ms",
            side.remaining_ms, side.consideration_ms, side.total_consideration_ms
        );

        self.debug_check_invariants();
        self.refresh_shown_remaining();
        smallvec![ClockEvent::DisplayChanged]
    }

    // ------------------------------------------------------------------
    // 待った
    // ------------------------------------------------------------------

    /// 先後 1 手ずつ（2 フレーム）巻き戻す。
    ///
    /// 履歴が 3 フレーム未満、または終局後は何もしない。
    pub fn undo(&mut self) -> ClockEvents {
        if self.game_over {
            debug!("[Clock] undo ignored: game is over");
            return ClockEvents::new();
        }
        let Some(frame) = self.history.rewind_pair() else {
            debug!("[Clock] undo ignored: history depth {}", self.history.len());
            return ClockEvents::new();
        };

        self.sides = frame.sides;
        if self.running {
            self.last_tick_ms = self.source.now_ms();
        }
        debug!("[Clock] undo: history depth {}", self.history.len());

        self.refresh_shown_remaining();
        smallvec![ClockEvent::DisplayChanged]
    }

    fn save_state(&mut self) {
        let frame = self.snapshot();
        debug!(
            "[Clock] save_state depth={} black={:?} white={:?}",
            self.history.len() + 1,
            frame.side(Color::Black),
            frame.side(Color::White)
        );
        self.history.push(frame);
    }

    /// 残り秒（切り上げ）を再計算し、前回通知から変わったかを返す
    fn refresh_shown_remaining(&mut self) -> bool {
        let mut changed = false;
        for color in Color::ALL {
            let sec = self.remaining_display_secs(color);
            let shown = &mut self.shown_remaining_sec[color.index()];
            if *shown != sec {
                *shown = sec;
                changed = true;
            }
        }
        changed
    }

    fn debug_check_invariants(&self) {
        if self.byoyomi_ms.iter().any(|&b| b > 0) {
            debug_assert!(self.increment_ms.iter().all(|&inc| inc == 0));
        }
        for color in Color::ALL {
            let i = color.index();
            if self.byoyomi_ms[i] == 0 {
                debug_assert!(!self.sides[i].byoyomi_applied);
            }
        }
    }

    // ------------------------------------------------------------------
    // 状態取得
    // ------------------------------------------------------------------

    /// 現在の状態のスナップショット
    pub fn snapshot(&self) -> HistoryFrame {
        HistoryFrame { sides: self.sides }
    }

    pub fn side(&self, color: Color) -> &SideClock {
        &self.sides[color.index()]
    }

    pub fn remaining_ms(&self, color: Color) -> u64 {
        self.side(color).remaining_ms
    }

    pub fn consideration_ms(&self, color: Color) -> u64 {
        self.side(color).consideration_ms
    }

    pub fn total_consideration_ms(&self, color: Color) -> u64 {
        self.side(color).total_consideration_ms
    }

    pub fn byoyomi_applied(&self, color: Color) -> bool {
        self.side(color).byoyomi_applied
    }

    pub fn has_byoyomi(&self, color: Color) -> bool {
        self.byoyomi_ms[color.index()] > 0
    }

    pub fn byoyomi_ms(&self, color: Color) -> u64 {
        self.byoyomi_ms[color.index()]
    }

    pub fn increment_ms(&self, color: Color) -> u64 {
        self.increment_ms[color.index()]
    }

    /// 秒読み方式の対局か（どちらかに秒読みがある）
    pub fn is_byoyomi_match(&self) -> bool {
        self.byoyomi_ms.iter().any(|&b| b > 0)
    }

    /// 両者共通の秒読み(ms)。片方のみ・値が異なる場合は 0。
    pub fn common_byoyomi_ms(&self) -> u64 {
        let [b, w] = self.byoyomi_ms;
        if b > 0 && b == w { b } else { 0 }
    }

    pub fn current_player(&self) -> Color {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_time_limited(&self) -> bool {
        self.time_limited
    }

    pub fn lose_on_timeout(&self) -> bool {
        self.lose_on_timeout
    }

    pub fn history_depth(&self) -> usize {
        self.history.len()
    }

    // ------------------------------------------------------------------
    // 表示
    // ------------------------------------------------------------------

    /// 残り秒（切り上げ）
    pub fn remaining_display_secs(&self, color: Color) -> u64 {
        ceil_secs(self.remaining_ms(color))
    }

    /// 総考慮秒（切り捨て）
    pub fn total_consideration_display_secs(&self, color: Color) -> u64 {
        floor_secs(self.total_consideration_ms(color))
    }

    /// 残り時間 `HH:MM:SS`
    pub fn time_string(&self, color: Color) -> String {
        format_hms(self.remaining_display_secs(color))
    }

    /// 直近手の考慮時間 `MM:SS`
    pub fn consideration_string(&self, color: Color) -> String {
        format_ms(self.side(color).last_move_shown_sec)
    }

    /// 総考慮時間 `HH:MM:SS`
    pub fn total_consideration_string(&self, color: Color) -> String {
        format_hms(self.total_consideration_display_secs(color))
    }

    /// 棋譜欄用 `MM:SS/HH:MM:SS`
    pub fn consideration_and_total_string(&self, color: Color) -> String {
        format!(
            "{}/{}",
            self.consideration_string(color),
            self.total_consideration_string(color)
        )
    }
}
