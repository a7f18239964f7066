use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use solfa::audio::SilentTone;
use solfa::core::NoteTable;
use solfa::sources::load_records;
use solfa::tasks::LiveSession;
use solfa::trace::{Snapshot, TraceFormat};
use solfa::ui::cli::args::{Cli, Command};
use solfa::ui::cli::{drivers::InquireDriver, wizard::prompt_choice};
use solfa::ui::types::build::{build_classifier, build_source};
use solfa::ui::types::choices::{SessionParams, TaskChoice};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const FG_CYAN: &str = "\x1b[36m";
const FG_GREEN: &str = "\x1b[32m";
const FG_MAGENTA: &str = "\x1b[35m";
const FG_GREY: &str = "\x1b[90m";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let task: TaskChoice = match cli.command {
        Some(Command::Run(args)) => args.into_task_choice()?,
        None => {
            let driver = InquireDriver;
            prompt_choice::<TaskChoice, _>(&driver).context("failed while prompting for task")?
        }
    };

    match task {
        TaskChoice::LiveSolfege(params) => run_live(params),
    }
}

fn run_live(params: SessionParams) -> Result<()> {
    let SessionParams {
        learner,
        source,
        training_file,
        poll_interval_ms,
        max_frames,
        max_seconds,
        sample_frequency,
        dump_file,
        dump_format,
    } = params;

    let classifier = build_classifier(learner).context("failed to build learner")?;
    let k = classifier.k();
    let source = build_source(source).context("failed to build source")?;
    let notes = NoteTable::solfege();

    let mut session = LiveSession::new(
        classifier,
        source,
        Box::new(SilentTone),
        notes.clone(),
        Duration::from_millis(poll_interval_ms),
        max_frames,
        max_seconds,
        sample_frequency,
    )
    .context("failed to construct LiveSession")?;

    let trained = match &training_file {
        Some(path) => {
            let records = load_records(path)
                .with_context(|| format!("failed to read training file {}", path.display()))?;
            session
                .train_from_records(&records)
                .context("failed to seed the classifier")?
        }
        None => 0,
    };

    let counts = session.classifier().example_counts();
    let header: Vec<String> = vec![
        format!("{BOLD}{FG_CYAN}▶ Live Solfège{RESET}"),
        format!(
            "{DIM}k={k}{RESET}  {DIM}poll={poll_interval_ms}ms{RESET}  {DIM}sample_freq={sample_frequency}{RESET}  {}",
            timestamp_now()
        ),
        format!(
            "{DIM}examples ({trained} loaded):{RESET} {}",
            format_counts(&counts, &notes)
        ),
        format!(
            "{FG_GREY}────────────────────────────────────────────────────────────────────────{RESET}"
        ),
    ];

    let (tx, rx) = std::sync::mpsc::channel();

    let render: JoinHandle<()> = std::thread::spawn(move || {
        render_status_with_header(rx, header, 150, max_frames, max_seconds)
    });

    let mut session = session.with_progress(tx);
    session.run().context("session failed")?;

    if let Some(path) = dump_file
        && !path.as_os_str().is_empty()
    {
        session
            .trace()
            .export(&path, TraceFormat::from(dump_format))
            .with_context(|| format!("failed to export snapshots to {}", path.display()))?;
    }

    drop(session);
    let _ = render.join();

    Ok(())
}

/// Print header once, then refresh a single status line: frames seen, the
/// current note with its confidence and frequency, the full confidence
/// spread, elapsed time, and small progress bars when limits exist.
pub fn render_status_with_header(
    rx: Receiver<Snapshot>,
    header_lines: Vec<String>,
    repaint_every_ms: u64,
    max_frames: Option<u64>,
    max_seconds: Option<u64>,
) {
    for line in &header_lines {
        println!("{line}");
    }

    println!();
    let _ = io::stdout().flush();

    let tick = Duration::from_millis(repaint_every_ms);
    let mut last_draw = Instant::now();
    let mut last_snap: Option<Snapshot> = None;

    loop {
        match rx.recv_timeout(tick) {
            Ok(s) => {
                last_snap = Some(s);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(s) = last_snap.take() {
                    print!("\r{}\x1B[K\n", format_status(&s, max_frames, max_seconds));
                    let _ = io::stdout().flush();
                }
                break;
            }
        }

        if last_draw.elapsed() >= tick {
            if let Some(s) = last_snap.as_ref() {
                let line = format_status(s, max_frames, max_seconds);
                print!("\r{}\x1B[K", line);
                let _ = io::stdout().flush();
            }
            last_draw = Instant::now();
        }
    }
}

fn format_status(s: &Snapshot, max_frames: Option<u64>, max_seconds: Option<u64>) -> String {
    let note = match s.note.as_deref() {
        Some(n) => format!("{FG_MAGENTA}{BOLD}{:>4}{RESET}", n),
        None => format!("{DIM}   —{RESET}"),
    };
    let freq = if s.frequency_hz.is_nan() {
        format!("{DIM}     —{RESET}")
    } else {
        format!("{:>6.1}", s.frequency_hz)
    };

    let mut line = format!(
        "{FG_GREEN}{BOLD}frames{RESET} {:>7}  \
         {FG_CYAN}{BOLD}note{RESET} {}  \
         {DIM}conf{RESET} {:>6}  \
         {DIM}freq{RESET} {}Hz  \
         {}  \
         {DIM}t{RESET} {:>6.1}s",
        s.frames_seen,
        note,
        fmt_pct(s.confidence),
        freq,
        format_confidences(&s.confidences),
        s.seconds
    );

    let bar_w = 15usize;
    if let Some(mf) = max_frames {
        let frame_bar = progress_bar(s.frames_seen as f64, mf as f64, bar_w);
        line.push_str(&format!("  {DIM}[frames]{RESET} {}", frame_bar));
    }
    if let Some(ms) = max_seconds {
        let time_bar = progress_bar(s.seconds, ms as f64, bar_w);
        line.push_str(&format!("  {DIM}[time]{RESET} {}", time_bar));
    }

    line
}

fn format_confidences(confidences: &BTreeMap<String, f64>) -> String {
    if confidences.is_empty() {
        return format!("{DIM}no votes{RESET}");
    }
    let mut entries: Vec<(&String, &f64)> = confidences.iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(a.1));
    entries
        .into_iter()
        .map(|(label, v)| format!("{label} {:.0}%", v * 100.0))
        .collect::<Vec<_>>()
        .join(" · ")
}

fn fmt_pct(v: f64) -> String {
    if v.is_nan() {
        format!("{DIM}NaN{RESET}")
    } else {
        format!("{:.1}%", v * 100.0)
    }
}

fn format_counts(counts: &BTreeMap<String, usize>, notes: &NoteTable) -> String {
    let mut parts: Vec<String> = notes
        .iter()
        .map(|n| format!("{}:{}", n.label, counts.get(&n.label).copied().unwrap_or(0)))
        .collect();

    // Labels trained outside the table still get reported.
    for (label, count) in counts {
        if notes.get(label).is_none() {
            parts.push(format!("{label}:{count}"));
        }
    }

    parts.join("  ")
}

fn progress_bar(current: f64, total: f64, width: usize) -> String {
    if total.is_finite() && total > 0.0 {
        let ratio = (current / total).clamp(0.0, 1.0);
        let filled = (ratio * width as f64).round() as usize;
        let empty = width.saturating_sub(filled);
        return format!(
            "[{}{}] {:>3.0}%",
            "█".repeat(filled),
            "░".repeat(empty),
            ratio * 100.0
        );
    }

    String::new()
}

fn timestamp_now() -> String {
    use chrono::{Local, SecondsFormat};
    let now = Local::now();
    format!(
        "{DIM}{}{}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
        RESET
    )
}
