//! 手番（Color）

use serde::{Deserialize, Serialize};

/// 手番（先手/後手）
///
/// 時計の内部配列は `index()` で引く。GUI 側の 1/2 番号とは
/// `from_player_number` / `player_number` で相互変換する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    /// 手番の数
    pub const NUM: usize = 2;

    /// 全手番（先手→後手の順）
    pub const ALL: [Color; Color::NUM] = [Color::Black, Color::White];

    /// 相手番を返す
    #[inline]
    pub const fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// インデックスとして使用（配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 1=先手, 2=後手 の番号から変換する。2 以外はすべて先手扱い。
    #[inline]
    pub const fn from_player_number(n: u8) -> Color {
        if n == 2 { Color::White } else { Color::Black }
    }

    /// 1=先手, 2=後手
    #[inline]
    pub const fn player_number(self) -> u8 {
        self as u8 + 1
    }

    /// ログ/JSONL 用の短いラベル
    pub const fn label(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::White => "white",
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        self.opponent()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
