/// 対局時計シミュレータ。
///
/// 持ち時間設定と各手の思考時間を与えて時計を動かし、1 手ごとの残り時間・考慮時間・
/// イベントを JSONL で出力する。1 行目が meta、最終行が summary。
///
/// # 使用例
///
/// ```shell
/// cargo run -p tools --bin clock_sim -- \
///   --time-control 600/30 --think-ms 12000,8000,45000,3000 --undo-after 4 --out -
///
/// cargo run -p tools --bin clock_sim -- \
///   --config configs/fischer.toml --think-ms 5000,5000 --out "runs/clock/$(date +%Y%m%d_%H%M%S).jsonl.gz"
/// ```
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Parser as _;
use log::info;

use rshogi_clock::{TICK_INTERVAL_MS, TimeControl};
use tools::common::io::JsonlWriter;
use tools::match_sim::{OutputLine, SimulationConfig, resolve_time_control, run_simulation};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(clap::Parser, Debug)]
#[command(about = "simulate a shogi match clock from per-ply think times")]
struct Cli {
    /// Time control: `600`, `600/30`, `300+10`, `600/30,300/30` or `unlimited`
    #[arg(long, conflicts_with = "config")]
    time_control: Option<TimeControl>,

    /// TOML file holding a full time control (`[black]` / `[white]` tables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the lose-on-timeout policy
    #[arg(long)]
    lose_on_timeout: Option<bool>,

    /// Think time per ply in milliseconds, alternating from black
    #[arg(long, value_delimiter = ',', required = true)]
    think_ms: Vec<u64>,

    /// Tick interval in milliseconds
    #[arg(long, default_value_t = TICK_INTERVAL_MS)]
    tick_ms: u64,

    /// Take back one move pair right after this ply
    #[arg(long)]
    undo_after: Option<u32>,

    /// Output path (`-` for stdout, `.gz` for gzip)
    #[arg(long, default_value = "-")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = SimulationConfig {
        time_control: resolve_time_control(
            cli.time_control,
            cli.config.as_deref(),
            cli.lose_on_timeout,
        )?,
        think_ms: cli.think_ms.clone(),
        tick_ms: cli.tick_ms,
        undo_after_ply: cli.undo_after,
    };

    let mut out = JsonlWriter::create(&cli.out)?;
    out.write_line(&OutputLine::meta(&config, Local::now().to_rfc3339()))?;

    let result = run_simulation(&config, &mut |record| out.write_line(&OutputLine::Move(record)))?;
    out.write_line(&OutputLine::Summary(&result))?;
    let lines = out.lines();
    out.close()?;

    match result.timed_out {
        Some(side) => info!("[Sim] finished: {side} lost on time after {} plies", result.plies),
        None => info!(
            "[Sim] finished: {} plies, black {} / white {}",
            result.plies, result.black_time, result.white_time
        ),
    }
    info!("[Sim] wrote {lines} lines to {}", cli.out.display());
    Ok(())
}
