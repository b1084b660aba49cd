use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, value_parser};
use indoc::indoc;
use log::{LevelFilter, debug, info};
use serde::Serialize;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::time::Instant;

use utf16_pct_escape::{
    EscapeBuffer, EscapeSettings, Escaper, LoneSurrogates, escape_utf16_with_settings,
    max_escaped_len, units_from_utf16le,
};

enum Input {
    Text(String),
    /// `-` reads from stdin.
    Path(PathBuf),
}

struct PctEscape {
    settings: EscapeSettings,
    input: Input,
    utf16le: bool,
    output_path: Option<PathBuf>,
    overwrite: bool,
    repeat: Option<u64>,
    buffer_size: Option<usize>,
    json: bool,
    verbosity_level: Option<LevelFilter>,
}

#[derive(Debug, Serialize)]
struct DriverReport {
    iterations: u64,
    input_units: usize,
    output_len: usize,
    buffer_size: usize,
    spilled: bool,
    elapsed_ns: u64,
    ns_per_iteration: f64,
}

impl PctEscape {
    pub fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let input = if let Some(path) = matches.get_one::<String>("input") {
            Input::Path(PathBuf::from(path))
        } else if let Some(text) = matches.get_one::<String>("TEXT") {
            Input::Text(text.clone())
        } else {
            bail!("either TEXT or `--input` must be given");
        };

        let lone_surrogates = match matches
            .get_one::<String>("lone-surrogates")
            .map(String::as_str)
        {
            Some("pass-through") => LoneSurrogates::PassThrough,
            Some("skip") => LoneSurrogates::Skip,
            _ => LoneSurrogates::Replace,
        };

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            3 => Some(LevelFilter::Trace),
            _ => {
                eprintln!("using more than  -vvv does not affect verbosity level");
                Some(LevelFilter::Trace)
            }
        };

        Ok(PctEscape {
            settings: EscapeSettings::new()
                .lone_surrogates(lone_surrogates)
                .stop_at_nul(matches.get_flag("stop-at-nul")),
            input,
            utf16le: matches.get_flag("utf16le"),
            output_path: matches.get_one::<String>("output").map(PathBuf::from),
            overwrite: matches.get_flag("overwrite"),
            repeat: matches.get_one::<u64>("repeat").copied(),
            buffer_size: matches.get_one::<usize>("buffer-size").copied(),
            json: matches.get_flag("json"),
            verbosity_level,
        })
    }

    /// Main entry point for `PctEscape`
    pub fn run(&mut self) -> Result<()> {
        self.try_to_initialize_logging();

        let units = self.read_units()?;
        info!("read {} UTF-16 code units", units.len());

        // Only touch the output once the input has been read successfully.
        let mut output = self.open_output()?;
        match self.repeat {
            Some(iterations) => self.drive(&mut output, &units, iterations)?,
            None => self.escape_once(&mut output, &units)?,
        }

        output.flush().context("failed to flush output")
    }

    fn open_output(&self) -> Result<Box<dyn Write>> {
        match &self.output_path {
            Some(path) => {
                let file = Self::create_output_file(path, self.overwrite).with_context(|| {
                    format!("failed to create output file at `{}`", path.display())
                })?;
                Ok(Box::new(file))
            }
            None => Ok(Box::new(io::stdout())),
        }
    }

    fn read_units(&self) -> Result<Vec<u16>> {
        let bytes = match &self.input {
            Input::Text(text) => return Ok(text.encode_utf16().collect()),
            Input::Path(path) if path.as_os_str() == "-" => {
                let mut bytes = vec![];
                io::stdin()
                    .read_to_end(&mut bytes)
                    .context("failed to read stdin")?;
                bytes
            }
            Input::Path(path) => {
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
            }
        };

        if self.utf16le {
            Ok(units_from_utf16le(&bytes)?)
        } else {
            let text = String::from_utf8(bytes)
                .context("input is not valid UTF-8, pass `--utf16le` for UTF-16LE input")?;
            Ok(text.encode_utf16().collect())
        }
    }

    fn escape_once(&self, output: &mut dyn Write, units: &[u16]) -> Result<()> {
        let mut escaper = Escaper::with_settings(self.settings.clone());
        escaper.write_utf16_to(output, units)?;
        writeln!(output)?;
        Ok(())
    }

    /// Escapes the same input `iterations` times into a fixed buffer and reports timings.
    fn drive(&self, output: &mut dyn Write, units: &[u16], iterations: u64) -> Result<()> {
        let buffer_size = self
            .buffer_size
            .unwrap_or_else(|| max_escaped_len(units.len()));
        let mut backing = vec![0u8; buffer_size];
        debug!("driving {iterations} iterations over a {buffer_size} byte buffer");

        let mut output_len = 0;
        let mut spilled = false;
        let start = Instant::now();
        for _ in 0..iterations {
            let mut out = EscapeBuffer::new(&mut backing);
            output_len = escape_utf16_with_settings(units, &mut out, &self.settings);
            spilled |= out.is_spilled();
        }
        let elapsed = start.elapsed();

        let elapsed_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        let report = DriverReport {
            iterations,
            input_units: units.len(),
            output_len,
            buffer_size,
            spilled,
            elapsed_ns,
            ns_per_iteration: elapsed_ns as f64 / iterations as f64,
        };

        if self.json {
            serde_json::to_writer(&mut *output, &report)?;
            writeln!(output)?;
        } else {
            writeln!(output, "iterations:       {}", report.iterations)?;
            writeln!(output, "input units:      {}", report.input_units)?;
            writeln!(output, "output length:    {}", report.output_len)?;
            writeln!(output, "buffer size:      {}", report.buffer_size)?;
            writeln!(output, "spilled:          {}", report.spilled)?;
            writeln!(output, "elapsed:          {:?}", elapsed)?;
            writeln!(
                output,
                "per iteration:    {:.1}ns",
                report.ns_per_iteration
            )?;
        }

        Ok(())
    }

    /// Refuses to replace a directory, or an existing file unless `overwrite` is set.
    fn create_output_file(path: impl AsRef<Path>, overwrite: bool) -> Result<File> {
        let p = path.as_ref();

        if p.is_dir() {
            bail!(
                "There is a directory at {}, refusing to overwrite",
                p.display()
            );
        }

        if p.exists() && !overwrite {
            bail!(
                "Output file {} already exists, pass `--overwrite` to replace it",
                p.display()
            );
        }

        if let Some(parent) = p.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(File::create(p)?)
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level
            && let Err(e) = TermLogger::init(
                level,
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            )
        {
            eprintln!("Failed to initialize logging: {}", e);
        }
    }
}

fn command() -> Command {
    Command::new("pct_escape")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Percent-escape text as UTF-8 `%XX` sequences")
        .long_about(indoc!(r#"
            Percent-escape text as UTF-8 `%XX` sequences.

            Every UTF-16 code unit (or surrogate pair) of the input is encoded as UTF-8,
            and every resulting byte is written as `%` followed by two uppercase hex digits.

            With `--repeat`, the input is escaped that many times into a fixed buffer and
            a timing report is printed instead of the escaped text.
        "#))
        .arg(Arg::new("TEXT").help("Text to escape."))
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .value_name("PATH")
                .help("Read the input from a file instead, `-` for stdin."),
        )
        .group(
            ArgGroup::new("source")
                .args(["TEXT", "input"])
                .required(true),
        )
        .arg(
            Arg::new("utf16le")
                .long("utf16le")
                .action(ArgAction::SetTrue)
                .requires("input")
                .help("Treat the input file as raw UTF-16LE code units instead of UTF-8 text."),
        )
        .arg(
            Arg::new("lone-surrogates")
                .long("lone-surrogates")
                .value_parser(["replace", "pass-through", "skip"])
                .default_value("replace")
                .help("How to escape a surrogate code unit that is not part of a pair."),
        )
        .arg(
            Arg::new("stop-at-nul")
                .long("stop-at-nul")
                .action(ArgAction::SetTrue)
                .help("Stop at the first NUL code unit."),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("PATH")
                .help("Write output to the file specified instead of stdout. Will create parent directories if needed."),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .action(ArgAction::SetTrue)
                .help("Overwrite the output file if it already exists."),
        )
        .arg(
            Arg::new("repeat")
                .long("repeat")
                .value_name("N")
                .value_parser(value_parser!(u64).range(1..))
                .help("Escape the input N times and print a timing report."),
        )
        .arg(
            Arg::new("buffer-size")
                .long("buffer-size")
                .value_name("BYTES")
                .value_parser(value_parser!(usize))
                .requires("repeat")
                .help("Size of the fixed output buffer used with `--repeat` (default: worst case for the input)."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .requires("repeat")
                .help("Print the `--repeat` report as JSON."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("-v - info, -vv - debug, -vvv - trace."),
        )
}

fn main() {
    let matches = command().get_matches();

    let result = PctEscape::from_cli_matches(&matches).and_then(|mut app| app.run());
    if let Err(e) = result {
        eprintln!("{:?}", e);
        exit(1)
    }
}
