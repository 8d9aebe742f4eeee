//! JSONL 出力（stdout / ファイル / gzip）

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;

/// 閉じる際に終端処理（flush / gzip フッタ書き込み）が必要な出力先
trait Sink: Write {
    fn finish(self: Box<Self>) -> io::Result<()>;
}

impl Sink for io::Stdout {
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for BufWriter<File> {
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for GzEncoder<BufWriter<File>> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.flush()
    }
}

/// 1 行 1 JSON の書き出し。`-` なら stdout、拡張子 `.gz` なら gzip 圧縮する。
///
/// gzip の終端エラーを拾うため、最後に必ず `close()` を呼ぶ。
#[must_use = "call .close() to propagate compression/IO errors"]
pub struct JsonlWriter {
    sink: Box<dyn Sink>,
    lines: usize,
}

impl JsonlWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let sink: Box<dyn Sink> = if p.as_os_str() == "-" {
            Box::new(io::stdout())
        } else {
            let f = File::create(p).with_context(|| format!("failed to open {}", p.display()))?;
            let f = BufWriter::new(f);
            if p.extension().is_some_and(|e| e.eq_ignore_ascii_case("gz")) {
                Box::new(GzEncoder::new(f, Compression::default()))
            } else {
                Box::new(f)
            }
        };
        Ok(Self { sink, lines: 0 })
    }

    pub fn write_line<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.sink, value).context("failed to serialize record")?;
        self.sink.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn close(self) -> Result<()> {
        self.sink.finish().context("failed to close output")
    }
}
