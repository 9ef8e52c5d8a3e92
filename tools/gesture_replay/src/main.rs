//! Replays a recorded touch trace through the gesture recognizer and
//! prints the gesture dispatch a pointer-oriented host would receive,
//! one line per consumed gesture. Traces are whitespace-separated text:
//!
//! ```text
//! # <ms> began|moved|ended <id> <x> <y>
//! # <ms> frame
//! 0    began 1 100 100
//! 16   frame
//! 50   ended 1 102 101
//! 66   frame
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use gesturekit::GestureRecognizer;

#[derive(Parser)]
#[command(about = "Replay a touch trace through the gesture recognizer")]
struct Args {
    /// Trace file to replay.
    trace: PathBuf,
    /// Golden file of expected gesture lines; exit non-zero on mismatch.
    #[arg(long)]
    expect: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TraceRecord {
    Began { ms: u64, id: u64, x: f32, y: f32 },
    Moved { ms: u64, id: u64, x: f32, y: f32 },
    Ended { ms: u64, id: u64, x: f32, y: f32 },
    Frame { ms: u64 },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let records = parse_trace(&args.trace)?;
    let emitted = replay(&records);

    for line in &emitted {
        println!("{line}");
    }

    if let Some(expect_path) = &args.expect {
        let expected = read_expected(expect_path)?;
        compare(&emitted, &expected)?;
        eprintln!("ok: {} gesture lines matched", emitted.len());
    }
    Ok(())
}

fn parse_trace(path: &Path) -> Result<Vec<TraceRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading trace {}", path.display()))?;

    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record = parse_line(line)
            .with_context(|| format!("{}:{}: bad trace line", path.display(), index + 1))?;
        records.push(record);
    }
    Ok(records)
}

fn parse_line(line: &str) -> Result<TraceRecord> {
    let mut fields = line.split_whitespace();
    let ms: u64 = fields
        .next()
        .context("missing timestamp")?
        .parse()
        .context("timestamp is not an integer")?;
    let verb = fields.next().context("missing event kind")?;

    if verb == "frame" {
        return Ok(TraceRecord::Frame { ms });
    }

    let id: u64 = fields
        .next()
        .context("missing touch id")?
        .parse()
        .context("touch id is not an integer")?;
    let x: f32 = fields
        .next()
        .context("missing x coordinate")?
        .parse()
        .context("x is not a number")?;
    let y: f32 = fields
        .next()
        .context("missing y coordinate")?
        .parse()
        .context("y is not a number")?;

    match verb {
        "began" => Ok(TraceRecord::Began { ms, id, x, y }),
        "moved" => Ok(TraceRecord::Moved { ms, id, x, y }),
        "ended" => Ok(TraceRecord::Ended { ms, id, x, y }),
        other => bail!("unknown event kind {other:?}"),
    }
}

/// Feeds the trace into the recognizer and polls after each frame tick
/// the way the original video driver does: tap, right-click, pan delta,
/// pinch zoom, then clear.
fn replay(records: &[TraceRecord]) -> Vec<String> {
    let mut rec = GestureRecognizer::new();
    let mut emitted = Vec::new();

    for record in records {
        match *record {
            TraceRecord::Began { ms, id, x, y } => rec.touch_began(id, x, y, ms),
            TraceRecord::Moved { ms, id, x, y } => rec.touch_moved(id, x, y, ms),
            TraceRecord::Ended { ms, id, x, y } => rec.touch_ended(id, x, y, ms),
            TraceRecord::Frame { ms } => {
                rec.update(ms);
                drain(&mut rec, ms, &mut emitted);
            }
        }
    }
    emitted
}

fn drain(rec: &mut GestureRecognizer, ms: u64, emitted: &mut Vec<String>) {
    if rec.has_pending_click() {
        let p = rec.click_position();
        if rec.has_pending_double_tap() {
            emitted.push(format!("{ms} double-tap {:.1} {:.1}", p.x, p.y));
        } else {
            emitted.push(format!("{ms} tap {:.1} {:.1}", p.x, p.y));
        }
    }
    if rec.has_pending_right_click() {
        let p = rec.click_position();
        emitted.push(format!("{ms} right-click {:.1} {:.1}", p.x, p.y));
    }
    if rec.is_dragging() {
        let d = rec.drag_delta();
        if d.x != 0.0 || d.y != 0.0 {
            emitted.push(format!("{ms} pan {:.1} {:.1}", d.x, d.y));
        }
    }
    if rec.is_pinching() && rec.pinch_scale() > 0.0 {
        let c = rec.pinch_center();
        emitted.push(format!(
            "{ms} zoom {:.2} {:.1} {:.1}",
            rec.pinch_scale(),
            c.x,
            c.y
        ));
    }
    rec.clear_pending_events();
}

fn read_expected(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading expectations {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect())
}

fn compare(emitted: &[String], expected: &[String]) -> Result<()> {
    let mut mismatches = 0usize;
    for index in 0..emitted.len().max(expected.len()) {
        let got = emitted.get(index).map(String::as_str);
        let want = expected.get(index).map(String::as_str);
        if got != want {
            mismatches += 1;
            eprintln!(
                "line {}: expected {:?}, got {:?}",
                index + 1,
                want.unwrap_or("<nothing>"),
                got.unwrap_or("<nothing>")
            );
        }
    }
    if mismatches > 0 {
        bail!("{mismatches} gesture line(s) did not match");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_touch_and_frame_lines() {
        assert_eq!(
            parse_line("0 began 1 100 100").unwrap(),
            TraceRecord::Began {
                ms: 0,
                id: 1,
                x: 100.0,
                y: 100.0
            }
        );
        assert_eq!(parse_line("16 frame").unwrap(), TraceRecord::Frame { ms: 16 });
        assert!(parse_line("16 bogus 1 0 0").is_err());
        assert!(parse_line("x frame").is_err());
    }

    #[test]
    fn tap_trace_emits_one_tap_line() {
        let records = vec![
            TraceRecord::Began {
                ms: 0,
                id: 1,
                x: 100.0,
                y: 100.0,
            },
            TraceRecord::Frame { ms: 16 },
            TraceRecord::Ended {
                ms: 50,
                id: 1,
                x: 102.0,
                y: 101.0,
            },
            TraceRecord::Frame { ms: 66 },
            TraceRecord::Frame { ms: 82 },
        ];
        let emitted = replay(&records);
        assert_eq!(emitted, vec!["66 tap 102.0 101.0".to_owned()]);
    }

    #[test]
    fn pinch_trace_emits_zoom_lines() {
        let records = vec![
            TraceRecord::Began {
                ms: 0,
                id: 1,
                x: 0.0,
                y: 0.0,
            },
            TraceRecord::Began {
                ms: 0,
                id: 2,
                x: 100.0,
                y: 0.0,
            },
            TraceRecord::Moved {
                ms: 30,
                id: 2,
                x: 160.0,
                y: 0.0,
            },
            TraceRecord::Frame { ms: 33 },
        ];
        let emitted = replay(&records);
        assert_eq!(emitted, vec!["33 zoom 1.60 80.0 0.0".to_owned()]);
    }
}
