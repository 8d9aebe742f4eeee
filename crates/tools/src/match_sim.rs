//! 思考時間の列を与えて時計を動かす対局シミュレーション
//!
//! 実時間は使わず `ManualTimeSource` を `tick_ms` 刻みで進め、対局画面と同じ順序で
//! `start → tick… → stop → commit_move` を呼ぶ。

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use rshogi_clock::{
    ClockEvent, Color, GoTimes, ManualTimeSource, ShogiClock, TICK_INTERVAL_MS, TimeControl,
    timed_out_side,
};

/// シミュレーション設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub time_control: TimeControl,
    /// 各手の思考時間(ms)。先手から交互に消費する。
    pub think_ms: Vec<u64>,
    /// tick 間隔(ms)
    pub tick_ms: u64,
    /// この手数を指し終えた直後に「待った」を 1 回行う
    pub undo_after_ply: Option<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_control: TimeControl::default(),
            think_ms: Vec::new(),
            tick_ms: TICK_INTERVAL_MS,
            undo_after_ply: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Move,
    Undo,
}

/// 1 手（または待った）ごとの記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub kind: RecordKind,
    /// 確定済みの手数（待った後は巻き戻った手数）
    pub ply: u32,
    pub side: Color,
    /// 実際に消費した思考時間(ms)。時間切れならそこで打ち切り。
    pub think_ms: u64,
    pub remaining_ms: u64,
    /// 残り時間 `HH:MM:SS`
    pub time: String,
    /// `MM:SS/HH:MM:SS`
    pub consideration: String,
    /// 次の手番に送る `go` の時間引数
    pub go: GoTimes,
    pub events: Vec<ClockEvent>,
}

/// シミュレーション結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub plies: u32,
    pub timed_out: Option<Color>,
    pub black_remaining_ms: u64,
    pub white_remaining_ms: u64,
    pub black_total_consideration_ms: u64,
    pub white_total_consideration_ms: u64,
    pub black_time: String,
    pub white_time: String,
}

fn side_to_move(plies: u32) -> Color {
    if plies % 2 == 0 { Color::Black } else { Color::White }
}

/// 時刻を `think_ms` 分だけ `tick_ms` 刻みで進める。終局したらそこで止め、消費分を返す。
fn think(
    clock: &mut ShogiClock<ManualTimeSource>,
    now: &ManualTimeSource,
    think_ms: u64,
    tick_ms: u64,
    events: &mut Vec<ClockEvent>,
) -> u64 {
    let mut left = think_ms;
    while left > 0 && !clock.is_game_over() {
        let dt = left.min(tick_ms);
        now.advance(dt);
        events.extend(clock.tick());
        left -= dt;
    }
    think_ms - left
}

fn record(
    clock: &ShogiClock<ManualTimeSource>,
    kind: RecordKind,
    ply: u32,
    side: Color,
    think_ms: u64,
    events: Vec<ClockEvent>,
) -> MoveRecord {
    MoveRecord {
        kind,
        ply,
        side,
        think_ms,
        remaining_ms: clock.remaining_ms(side),
        time: clock.time_string(side),
        consideration: clock.consideration_and_total_string(side),
        go: clock.go_times(),
        events,
    }
}

/// 設定に従って 1 局分を進め、手ごとに `on_record` を呼ぶ。
pub fn run_simulation(
    config: &SimulationConfig,
    on_record: &mut dyn FnMut(&MoveRecord) -> Result<()>,
) -> Result<SimulationResult> {
    ensure!(config.tick_ms > 0, "tick_ms must be positive");

    let now = ManualTimeSource::new(0);
    let mut clock = ShogiClock::with_source(now.clone());
    clock.configure(&config.time_control);
    info!(
        "[Sim] start time_control={} plies={} tick_ms={}",
        config.time_control,
        config.think_ms.len(),
        config.tick_ms
    );

    let mut plies = 0u32;
    let mut pending_undo = config.undo_after_ply;
    let mut timed_out = None;

    for &think_ms in &config.think_ms {
        let side = side_to_move(plies);
        let mut events = Vec::new();
        clock.set_current_player(side);
        events.extend(clock.start());
        let spent = think(&mut clock, &now, think_ms, config.tick_ms, &mut events);
        events.extend(clock.stop());
        events.extend(clock.commit_move(side));
        plies += 1;

        timed_out = timed_out_side(&events);
        on_record(&record(&clock, RecordKind::Move, plies, side, spent, events))?;
        if let Some(loser) = timed_out {
            info!("[Sim] {loser} lost on time at ply {plies}");
            break;
        }

        if pending_undo == Some(plies) {
            pending_undo = None;
            // 次の手番の計時を始めてから待ったする（対局画面と同じ順序）
            let next = side_to_move(plies);
            clock.set_current_player(next);
            clock.start();
            let events: Vec<ClockEvent> = clock.undo().into_iter().collect();
            if events.is_empty() {
                debug!("[Sim] undo skipped at ply {plies}");
            } else {
                plies -= 2;
                info!("[Sim] undo: back to ply {plies}");
                on_record(&record(&clock, RecordKind::Undo, plies, next, 0, events))?;
            }
        }
    }

    Ok(SimulationResult {
        plies,
        timed_out,
        black_remaining_ms: clock.remaining_ms(Color::Black),
        white_remaining_ms: clock.remaining_ms(Color::White),
        black_total_consideration_ms: clock.total_consideration_ms(Color::Black),
        white_total_consideration_ms: clock.total_consideration_ms(Color::White),
        black_time: clock.time_string(Color::Black),
        white_time: clock.time_string(Color::White),
    })
}

// ---------------------------------------------------------------------------
// 入出力
// ---------------------------------------------------------------------------

/// 文字列指定か TOML ファイルから持ち時間設定を決め、時間切れ負けの上書きを適用する
pub fn resolve_time_control(
    text: Option<TimeControl>,
    config_path: Option<&Path>,
    lose_on_timeout: Option<bool>,
) -> Result<TimeControl> {
    let mut tc = match (text, config_path) {
        (Some(tc), _) => tc,
        (None, Some(path)) => {
            let body = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&body).with_context(|| format!("failed to parse {}", path.display()))?
        }
        (None, None) => bail!("either --time-control or --config is required"),
    };
    if let Some(lose) = lose_on_timeout {
        tc.lose_on_timeout = lose;
    }
    Ok(tc)
}

/// JSONL の 1 行。`type` で meta / move / summary を区別する。
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputLine<'a> {
    Meta {
        started_at: String,
        time_control: String,
        config: &'a SimulationConfig,
    },
    Move(&'a MoveRecord),
    Summary(&'a SimulationResult),
}

impl<'a> OutputLine<'a> {
    pub fn meta(config: &'a SimulationConfig, started_at: String) -> Self {
        OutputLine::Meta {
            started_at,
            time_control: config.time_control.to_string(),
            config,
        }
    }
}
