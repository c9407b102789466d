//! Command-line arguments for the `emu8060` binary.

use std::path::PathBuf;

use clap::{value_parser, ArgAction, CommandFactory, Parser};
use ins8060_core::{TraceConfig, TracePolicy, DEFAULT_TRACE_CAPACITY};
use log::LevelFilter;

use crate::pacing::ClockRate;
use crate::preprocess::DEFAULT_INTERVAL;
use crate::session::{SessionConfig, TraceOptions, DEFAULT_BASIC_IMAGE};

/// INS8060 (SC/MP) emulator with NIBL BASIC support.
///
/// Files whose name contains `.bin` are loaded into memory at address 0;
/// any other file is typed into the console as a BASIC program, numbering
/// its lines first unless it already starts with a line number.
#[derive(Debug, Parser)]
#[command(name = "emu8060", version)]
pub struct Cli {
    /// Pace execution to this clock rate in MHz (unpaced when omitted)
    #[arg(short, long, value_name = "MHZ", value_parser = value_parser!(u32).range(1..))]
    pub clock: Option<u32>,

    /// Load the BASIC interpreter image before the input files
    #[arg(short, long)]
    pub basic: bool,

    /// Type `run` after each program source (implies --basic)
    #[arg(short, long)]
    pub run: bool,

    /// Intel HEX image loaded by --basic
    #[arg(long, value_name = "PATH", default_value = DEFAULT_BASIC_IMAGE)]
    pub basic_image: PathBuf,

    /// Line-number step for unnumbered sources
    #[arg(long, default_value_t = DEFAULT_INTERVAL, value_parser = value_parser!(u32).range(1..))]
    pub interval: u32,

    /// Take each slice's cycle overrun off the next slice's budget
    #[arg(long)]
    pub carry_overrun: bool,

    /// Record an execution trace and dump it here when execution is stopped
    #[arg(long, value_name = "PATH")]
    pub trace: Option<PathBuf>,

    /// Instructions kept in the trace ring
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_TRACE_CAPACITY)]
    pub trace_capacity: usize,

    /// Stop and dump once the trace ring is full instead of wrapping
    #[arg(long)]
    pub trace_stop_when_full: bool,

    /// Keep running past illegal opcodes while tracing
    #[arg(long)]
    pub trace_ignore_illegal: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Binary images and program sources, in load order
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// One-line usage summary, printed when the binary is started bare.
    #[must_use]
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }

    /// Session settings described by the arguments.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        let trace = self.trace.as_ref().map(|path| TraceOptions {
            path: path.clone(),
            config: TraceConfig {
                capacity: self.trace_capacity,
                policy: if self.trace_stop_when_full {
                    TracePolicy::StopWhenFull
                } else {
                    TracePolicy::Wrap
                },
                stop_on_illegal: !self.trace_ignore_illegal,
            },
        });

        SessionConfig {
            clock: self.clock.and_then(ClockRate::from_mhz),
            load_basic: self.basic || self.run,
            auto_run: self.run,
            basic_image: self.basic_image.clone(),
            interval: self.interval,
            carry_overrun: self.carry_overrun,
            trace,
            files: self.files.clone(),
        }
    }

    /// Log level selected by `-v`; warnings only by default.
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};
    use ins8060_core::{TracePolicy, DEFAULT_TRACE_CAPACITY};
    use log::LevelFilter;
    use rstest::rstest;

    use super::Cli;
    use crate::pacing::ClockRate;
    use crate::session::DEFAULT_BASIC_IMAGE;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("emu8060").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn argument_definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn usage_names_the_binary_and_its_options() {
        let usage = Cli::usage();
        assert!(usage.starts_with("Usage: emu8060"), "{usage}");
        assert!(usage.contains("[FILE]..."), "{usage}");
    }

    #[test]
    fn defaults_run_unpaced_without_basic() {
        let config = parse(&["prog.bin"]).session_config();

        assert_eq!(config.clock, None);
        assert!(!config.load_basic);
        assert!(!config.auto_run);
        assert_eq!(config.basic_image, PathBuf::from(DEFAULT_BASIC_IMAGE));
        assert_eq!(config.interval, 1);
        assert_eq!(config.trace, None);
        assert_eq!(config.files, vec![PathBuf::from("prog.bin")]);
    }

    #[test]
    fn run_implies_basic() {
        let config = parse(&["-r", "prog.bas"]).session_config();
        assert!(config.load_basic);
        assert!(config.auto_run);
    }

    #[test]
    fn clock_and_pacing_options() {
        let config = parse(&["-c", "4", "--carry-overrun", "--interval", "10", "p.bas"])
            .session_config();

        assert_eq!(config.clock.map(ClockRate::mhz), Some(4));
        assert!(config.carry_overrun);
        assert_eq!(config.interval, 10);
    }

    #[rstest]
    #[case::zero_clock(&["-c", "0", "p.bas"])]
    #[case::zero_interval(&["--interval", "0", "p.bas"])]
    #[case::non_numeric_clock(&["-c", "fast", "p.bas"])]
    fn rejects_invalid_numbers(#[case] args: &[&str]) {
        let argv = std::iter::once("emu8060").chain(args.iter().copied());
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn trace_options_build_a_ring_config() {
        let config = parse(&[
            "--trace",
            "out.txt",
            "--trace-capacity",
            "64",
            "--trace-stop-when-full",
            "--trace-ignore-illegal",
            "p.bin",
        ])
        .session_config();

        let trace = config.trace.expect("trace requested");
        assert_eq!(trace.path, PathBuf::from("out.txt"));
        assert_eq!(trace.config.capacity, 64);
        assert_eq!(trace.config.policy, TracePolicy::StopWhenFull);
        assert!(!trace.config.stop_on_illegal);
    }

    #[test]
    fn trace_defaults_wrap_and_stop_on_illegal() {
        let trace = parse(&["--trace", "t.txt", "p.bin"])
            .session_config()
            .trace
            .expect("trace requested");

        assert_eq!(trace.config.capacity, DEFAULT_TRACE_CAPACITY);
        assert_eq!(trace.config.policy, TracePolicy::Wrap);
        assert!(trace.config.stop_on_illegal);
    }

    #[rstest]
    #[case(&["p.bin"], LevelFilter::Warn)]
    #[case(&["-v", "p.bin"], LevelFilter::Info)]
    #[case(&["-vv", "p.bin"], LevelFilter::Debug)]
    #[case(&["-vvvv", "p.bin"], LevelFilter::Trace)]
    fn verbosity_raises_the_log_level(#[case] args: &[&str], #[case] level: LevelFilter) {
        assert_eq!(parse(args).log_level(), level);
    }
}
