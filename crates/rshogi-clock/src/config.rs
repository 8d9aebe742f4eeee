//! 対局の持ち時間設定
//!
//! 秒単位で受け取り、時計の内部ではミリ秒で保持する。秒読みとフィッシャー加算は
//! 対局全体で排他: どちらかの秒読みが正なら両者の加算は 0 に落とす（拒否はしない）。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Color;

/// 1 秒あたりのミリ秒
pub const MS_PER_SEC: u64 = 1000;

/// 片側の持ち時間
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTime {
    /// 持ち時間（秒）
    pub main_secs: u64,
    /// 秒読み（秒、0 で無効）
    pub byoyomi_secs: u64,
    /// 1 手ごとの加算（秒、0 で無効）
    pub increment_secs: u64,
}

impl PlayerTime {
    pub const fn new(main_secs: u64, byoyomi_secs: u64, increment_secs: u64) -> Self {
        Self {
            main_secs,
            byoyomi_secs,
            increment_secs,
        }
    }

    pub const fn main_ms(&self) -> u64 {
        self.main_secs.saturating_mul(MS_PER_SEC)
    }

    pub const fn byoyomi_ms(&self) -> u64 {
        self.byoyomi_secs.saturating_mul(MS_PER_SEC)
    }

    pub const fn increment_ms(&self) -> u64 {
        self.increment_secs.saturating_mul(MS_PER_SEC)
    }
}

/// 時間方式の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    /// 持ち時間制限なし（考慮時間のみ計測）
    Unlimited,
    /// 切れ負け
    SuddenDeath,
    /// 秒読み
    Byoyomi,
    /// フィッシャー加算
    Fischer,
}

/// 対局全体の時間設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeControl {
    pub black: PlayerTime,
    pub white: PlayerTime,
    /// false なら残り時間を減算せず、考慮時間だけを積算する
    pub time_limited: bool,
    /// 時間切れで負けとするか
    pub lose_on_timeout: bool,
}

impl Default for TimeControl {
    fn default() -> Self {
        Self {
            black: PlayerTime::default(),
            white: PlayerTime::default(),
            time_limited: true,
            lose_on_timeout: true,
        }
    }
}

impl TimeControl {
    /// 両者同条件の設定
    pub fn symmetric(main_secs: u64, byoyomi_secs: u64, increment_secs: u64) -> Self {
        let side = PlayerTime::new(main_secs, byoyomi_secs, increment_secs);
        Self {
            black: side,
            white: side,
            ..Self::default()
        }
    }

    /// 持ち時間制限なし
    pub fn unlimited() -> Self {
        Self {
            time_limited: false,
            ..Self::default()
        }
    }

    pub fn with_lose_on_timeout(mut self, lose_on_timeout: bool) -> Self {
        self.lose_on_timeout = lose_on_timeout;
        self
    }

    pub const fn player(&self, color: Color) -> &PlayerTime {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        }
    }

    /// 秒読み/加算の排他を適用した設定を返す
    pub fn normalized(&self) -> Self {
        let mut out = *self;
        if self.black.byoyomi_secs > 0 || self.white.byoyomi_secs > 0 {
            out.black.increment_secs = 0;
            out.white.increment_secs = 0;
        } else {
            out.black.byoyomi_secs = 0;
            out.white.byoyomi_secs = 0;
        }
        out
    }

    /// 正規化後の時間方式
    pub fn mode(&self) -> TimeMode {
        let tc = self.normalized();
        if !tc.time_limited {
            TimeMode::Unlimited
        } else if tc.black.byoyomi_secs > 0 || tc.white.byoyomi_secs > 0 {
            TimeMode::Byoyomi
        } else if tc.black.increment_secs > 0 || tc.white.increment_secs > 0 {
            TimeMode::Fischer
        } else {
            TimeMode::SuddenDeath
        }
    }
}

/// 時間設定文字列のパースエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeControlParseError {
    #[error("time control is empty")]
    Empty,

    #[error("invalid {field} value: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("byoyomi and increment cannot be combined: {0:?}")]
    MixedModes(String),

    #[error("at most two sides (black,white) may be given, got {0}")]
    TooManySides(usize),
}

fn parse_secs(field: &'static str, s: &str) -> Result<u64, TimeControlParseError> {
    let s = s.trim();
    s.parse::<u64>().map_err(|_| TimeControlParseError::InvalidNumber {
        field,
        value: s.to_string(),
    })
}

fn parse_side(s: &str) -> Result<PlayerTime, TimeControlParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TimeControlParseError::Empty);
    }
    match (s.split_once('/'), s.split_once('+')) {
        (Some(_), Some(_)) => Err(TimeControlParseError::MixedModes(s.to_string())),
        (Some((main, byo)), None) => {
            Ok(PlayerTime::new(parse_secs("main", main)?, parse_secs("byoyomi", byo)?, 0))
        }
        (None, Some((main, inc))) => {
            Ok(PlayerTime::new(parse_secs("main", main)?, 0, parse_secs("increment", inc)?))
        }
        (None, None) => Ok(PlayerTime::new(parse_secs("main", s)?, 0, 0)),
    }
}

/// 書式:
///
/// - `unlimited` : 持ち時間制限なし
/// - `600`       : 切れ負け 600 秒
/// - `600/30`    : 持ち時間 600 秒 + 秒読み 30 秒
/// - `300+10`    : 持ち時間 300 秒 + 1 手 10 秒加算
/// - `600/30,300/30` : 先手,後手 で別設定
impl FromStr for TimeControl {
    type Err = TimeControlParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TimeControlParseError::Empty);
        }
        if matches!(s.to_ascii_lowercase().as_str(), "unlimited" | "none" | "inf") {
            return Ok(TimeControl::unlimited());
        }

        let sides: Vec<&str> = s.split(',').collect();
        let (black, white) = match sides.as_slice() {
            [both] => {
                let side = parse_side(both)?;
                (side, side)
            }
            [b, w] => (parse_side(b)?, parse_side(w)?),
            _ => return Err(TimeControlParseError::TooManySides(sides.len())),
        };
        Ok(TimeControl {
            black,
            white,
            ..TimeControl::default()
        })
    }
}

impl fmt::Display for PlayerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.byoyomi_secs > 0 {
            write!(f, "{}/{}", self.main_secs, self.byoyomi_secs)
        } else if self.increment_secs > 0 {
            write!(f, "{}+{}", self.main_secs, self.increment_secs)
        } else {
            write!(f, "{}", self.main_secs)
        }
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.time_limited {
            return f.write_str("unlimited");
        }
        if self.black == self.white {
            write!(f, "{}", self.black)
        } else {
            write!(f, "{},{}", self.black, self.white)
        }
    }
}
