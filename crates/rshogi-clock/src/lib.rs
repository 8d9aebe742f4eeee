//! # rshogi-clock
//!
//! 将棋対局用の時計ライブラリ。
//!
//! ## モジュール構成
//!
//! - `types`: 手番（Color）
//! - `config`: 持ち時間設定（持ち時間/秒読み/フィッシャー加算）
//! - `time_source`: 単調時刻ソース
//! - `clock`: 時計本体（計時・秒読み/加算・時間切れ・待った）
//! - `event`: 時計が返すイベント
//! - `history`: 待った用の状態スナップショット
//! - `display`: 表示用の時間文字列
//! - `go_times`: USI `go` 用の時間引数
//!
//! ```
//! use rshogi_clock::{Color, ManualTimeSource, ShogiClock, TimeControl};
//!
//! let now = ManualTimeSource::new(0);
//! let mut clock = ShogiClock::with_source(now.clone());
//! clock.configure(&"600/30".parse::<TimeControl>().unwrap());
//! clock.set_current_player(Color::Black);
//! clock.start();
//! now.advance(1_500);
//! clock.tick();
//! clock.stop();
//! clock.commit_move(Color::Black);
//! assert_eq!(clock.time_string(Color::Black), "00:09:59");
//! ```

pub mod clock;
pub mod config;
pub mod display;
pub mod event;
pub mod go_times;
pub mod history;
pub mod time_source;
pub mod types;

pub use clock::{ShogiClock, TICK_INTERVAL_MS};
pub use config::{PlayerTime, TimeControl, TimeControlParseError, TimeMode};
pub use event::{ClockEvent, ClockEvents, timed_out_side};
pub use go_times::GoTimes;
pub use history::{HistoryFrame, SideClock};
pub use time_source::{ManualTimeSource, MonotonicSource, TimeSource};
pub use types::Color;
