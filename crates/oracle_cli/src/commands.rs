//! Subcommand bodies.

use chrono::{Local, NaiveDateTime};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use console::style;
use oracle_capture::{CaptureConfig, CaptureSession, RecordedHost, Recording, WriterSink};
use oracle_core::EqualityOverrides;
use oracle_decode::LAYOUT_V1;
use oracle_trace::{MatchReport, TraceReader, match_sessions, render_raw};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Inputs to `oracle capture`
pub struct CaptureArgs {
    pub recording: PathBuf,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub stamp: bool,
    pub no_header: bool,
}

/// `name.log` becomes `name-YYYYmmdd-HHMMSS.log`
pub fn stamped(path: &Path, at: NaiveDateTime) -> PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(|| "trace".into(), |s| s.to_string_lossy());
    let mut name = format!("{}-{}", stem, at.format("%Y%m%d-%H%M%S"));
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

fn resolve_config(args: &CaptureArgs) -> Result<CaptureConfig> {
    let mut config = match &args.config {
        Some(path) => CaptureConfig::load(path)?,
        None => CaptureConfig::default(),
    };
    if let Some(output) = &args.output {
        config = config.with_output(output);
    }
    if args.stamp {
        let output = stamped(&config.output, Local::now().naive_local());
        config = config.with_output(output);
    }
    if args.no_header {
        config = config.with_header(false);
    }
    config.validate()?;
    tracing::debug!(
        output = %config.output.display(),
        triggers = config.triggers.len(),
        "capture config resolved"
    );
    Ok(config)
}

pub fn capture(args: &CaptureArgs) -> Result<ExitCode> {
    let config = resolve_config(args)?;
    let recording = Recording::load(&args.recording)?;
    let mut host = RecordedHost::new(recording)?;

    let sink = WriterSink::create(&config.output)
        .wrap_err_with(|| format!("cannot create {}", config.output.display()))?
        .with_flush_each_line(config.flush_each_line);
    let mut session = CaptureSession::new(LAYOUT_V1, sink)
        .with_bindings(config.bindings()?)
        .with_header(config.header);

    session
        .run(&mut host)
        .wrap_err_with(|| format!("capture into {} aborted", config.output.display()))?;
    let (_, summary) = session.finish()?;

    println!("{}", summary.report());
    println!("Trace written to {}", config.output.display());
    Ok(ExitCode::SUCCESS)
}

/// Open a trace written against a layout this build can decode
fn open_trace(path: &Path) -> Result<TraceReader> {
    let reader =
        TraceReader::open(path).wrap_err_with(|| format!("cannot read {}", path.display()))?;
    reader
        .check_layout(LAYOUT_V1.revision)
        .wrap_err_with(|| format!("{} was captured against another layout", path.display()))?;
    Ok(reader)
}

fn compare(left: &Path, right: &Path) -> Result<MatchReport> {
    let expected = open_trace(left)?;
    let actual = open_trace(right)?;
    Ok(match_sessions(&expected, &actual, &EqualityOverrides::new()))
}

pub fn diff(left: &Path, right: &Path) -> Result<ExitCode> {
    let report = compare(left, right)?;
    if report.is_matched() {
        println!("{}", style(report.report()).green());
        Ok(ExitCode::SUCCESS)
    } else {
        print!("{}", style(report.report()).red());
        Ok(ExitCode::from(1))
    }
}

/// Trace lines with notation appended to lines that carry a move
pub fn annotate(reader: &TraceReader) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(reader.remaining());
    for (index, line) in reader.lines().enumerate() {
        let notation = line
            .subject_move()
            .map(|(side, mv)| render_raw(&mv, side))
            .transpose()
            .wrap_err_with(|| format!("line {}: cannot render move", index + 1))?;
        out.push(match notation {
            Some(notation) => format!("{:>5}  {}  {}", index + 1, notation, line),
            None => format!("{:>5}  {}", index + 1, line),
        });
    }
    Ok(out)
}

pub fn inspect(log: &Path) -> Result<ExitCode> {
    let reader = open_trace(log)?;
    match reader.layout() {
        Some(revision) => println!("{}", style(format!("layout {}", revision)).bold()),
        None => println!("{}", style("no layout header").yellow()),
    }
    for text in annotate(&reader)? {
        println!("{}", text);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use oracle_decode::MemoryImage;
    use std::fs;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    #[test]
    fn test_stamped() {
        assert_eq!(
            stamped(Path::new("out/trace.log"), at()),
            PathBuf::from("out/trace-20261018-093005.log")
        );
        assert_eq!(
            stamped(Path::new("session"), at()),
            PathBuf::from("session-20261018-093005")
        );
    }

    fn write_recording(dir: &Path) -> PathBuf {
        // Engine plays ９一４四 (12 -> 50), then drops a pawn on ４四.
        let recording = Recording::new(MemoryImage::new().with(0x5BB, 50).with(0x5BC, 12))
            .step(0xDFD3, &[])
            .step(0xDFD3, &[(0x5BC, &[201])]);
        let path = dir.join("run.json");
        fs::write(&path, serde_json::to_string(&recording).unwrap()).unwrap();
        path
    }

    fn capture_into(dir: &Path, name: &str) -> PathBuf {
        let output = dir.join(name);
        let args = CaptureArgs {
            recording: write_recording(dir),
            config: None,
            output: Some(output.clone()),
            stamp: false,
            no_header: false,
        };
        capture(&args).unwrap();
        output
    }

    #[test]
    fn test_capture_then_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let output = capture_into(dir.path(), "trace.log");
        let reader = TraceReader::open(&output).unwrap();
        assert_eq!(reader.layout(), Some(LAYOUT_V1.revision));
        let lines = annotate(&reader).unwrap();
        assert_eq!(
            lines,
            vec![
                "    1  ９一４四  my_move: {move={dst=50, promotion=false, src=12}}",
                "    2  ４四歩打  my_move: {move={dst=50, promotion=false, src=201}}",
            ]
        );
    }

    #[test]
    fn test_diff_reports() {
        let dir = tempfile::tempdir().unwrap();
        let a = capture_into(dir.path(), "a.log");
        let b = capture_into(dir.path(), "b.log");
        assert!(compare(&a, &b).unwrap().is_matched());

        let c = dir.path().join("c.log");
        let text = fs::read_to_string(&a).unwrap().replace("src=201", "src=202");
        fs::write(&c, text).unwrap();
        let report = compare(&a, &c).unwrap();
        assert!(!report.is_matched());
        assert_eq!(report.compared, 1);
    }

    #[test]
    fn test_foreign_layout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ours = capture_into(dir.path(), "ours.log");
        let foreign = dir.path().join("foreign.log");
        let text = fs::read_to_string(&ours)
            .unwrap()
            .replace("# layout 1.0.0", "# layout 2.0.0");
        fs::write(&foreign, text).unwrap();

        assert!(open_trace(&ours).is_ok());
        assert!(open_trace(&foreign).is_err());
        assert!(compare(&ours, &foreign).is_err());
        assert!(inspect(&foreign).is_err());
    }

    #[test]
    fn test_headerless_trace_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.log");
        fs::write(&path, "my_move: {move={dst=50, promotion=false, src=12}}\n").unwrap();
        let reader = open_trace(&path).unwrap();
        assert_eq!(reader.layout(), None);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_config_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("capture.json");
        fs::write(&config_path, r#"{"output": "from-config.log", "header": true}"#).unwrap();
        let args = CaptureArgs {
            recording: dir.path().join("unused.json"),
            config: Some(config_path),
            output: Some(dir.path().join("flag.log")),
            stamp: false,
            no_header: true,
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.output, dir.path().join("flag.log"));
        assert!(!config.header);
    }

    #[test]
    fn test_capture_missing_recording() {
        let dir = tempfile::tempdir().unwrap();
        let args = CaptureArgs {
            recording: dir.path().join("absent.json"),
            config: None,
            output: Some(dir.path().join("trace.log")),
            stamp: false,
            no_header: false,
        };
        assert!(capture(&args).is_err());
    }
}
