//! Command-line interface for jetpalm
//!
//! A single command: resolve the configuration and print it.

use anyhow::Result;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::context::enter;
use crate::config::{
    initialize_config, Config, FlagSet, FlagValue, Interval, ResolutionContext, Stage,
    DEFAULT_PUSH_FREQUENCY,
};

mod present;

pub use present::print_config_values;

/// Resolve configuration from flags, environment variables and a config file
#[derive(Parser, Debug)]
#[command(name = "jetpalm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ./jetpalm.{json,toml,yaml,yml}, created as .yaml if missing)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How often the client pushes buffered data (e.g. 30s, 1m30s)
    #[arg(long, value_name = "DURATION", default_value_t = DEFAULT_PUSH_FREQUENCY)]
    pub push_frequency: Interval,

    /// Turn the toggle on
    #[arg(short, long)]
    pub toggle: bool,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Flags that take part in resolution, with whether each was typed by the user.
    ///
    /// `--config` and `--verbose` act before any source is read, so they are
    /// not resolvable.
    pub fn declared_flags(&self, matches: &ArgMatches) -> FlagSet {
        FlagSet::new()
            .declare(
                "push-frequency",
                FlagValue::Interval(self.push_frequency),
                explicitly_set(matches, "push_frequency"),
            )
            .declare("toggle", FlagValue::Bool(self.toggle), explicitly_set(matches, "toggle"))
    }
}

fn explicitly_set(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

pub fn run() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let ctx = ResolutionContext::from_process()?.with_config_override(cli.config.clone());
    let stdout = io::stdout();
    let stderr = io::stderr();
    execute(&cli, &matches, &ctx, &mut stdout.lock(), &mut stderr.lock())?;
    Ok(())
}

/// Resolve, then print. Nothing reaches `out` unless resolution succeeds.
pub fn execute(
    cli: &Cli,
    matches: &ArgMatches,
    ctx: &ResolutionContext,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Config> {
    let mut flags = cli.declared_flags(matches);
    let mut cfg = Config::default();

    let config_file = match initialize_config(ctx, &mut flags, &mut cfg) {
        Ok(path) => path,
        Err(e) => {
            enter(Stage::Failed);
            return Err(e.into());
        }
    };

    if let Some(path) = config_file {
        writeln!(err, "Using config file: {}", path.display())?;
    }

    print_config_values(out, &cfg)?;
    enter(Stage::Presented);
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use std::fs;
    use tempfile::TempDir;

    struct Invocation {
        cwd: TempDir,
        home: TempDir,
    }

    impl Invocation {
        fn new() -> Self {
            Self { cwd: TempDir::new().expect("cwd"), home: TempDir::new().expect("home") }
        }

        fn write_config(&self, body: &str) {
            fs::write(self.cwd.path().join("jetpalm.yaml"), body).expect("write config");
        }

        fn run(&self, args: &[&str], env: &[(&str, &str)]) -> (Result<Config>, String, String) {
            let matches = Cli::command()
                .try_get_matches_from(std::iter::once("jetpalm").chain(args.iter().copied()))
                .expect("args");
            let cli = Cli::from_arg_matches(&matches).expect("cli");
            let ctx = ResolutionContext::new(
                self.cwd.path().to_path_buf(),
                Some(self.home.path().to_path_buf()),
                env.iter().copied().collect(),
            )
            .with_config_override(cli.config.clone());

            let mut out = Vec::new();
            let mut err = Vec::new();
            let result = execute(&cli, &matches, &ctx, &mut out, &mut err);
            (
                result,
                String::from_utf8(out).expect("utf8 stdout"),
                String::from_utf8(err).expect("utf8 stderr"),
            )
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_only_typed_flags_count_as_changed() {
        let matches = Cli::command()
            .try_get_matches_from(["jetpalm", "--push-frequency", "5s"])
            .expect("args");
        let cli = Cli::from_arg_matches(&matches).expect("cli");
        let flags = cli.declared_flags(&matches);

        assert!(flags.get("push-frequency").expect("flag").changed());
        assert!(!flags.get("toggle").expect("flag").changed());
        assert_eq!(flags.interval("push-frequency"), Some(Interval::from_secs(5)));
    }

    #[test]
    fn test_no_file_no_env_no_flags_gives_defaults() {
        let inv = Invocation::new();
        let (result, out, err) = inv.run(&[], &[]);

        let cfg = result.expect("resolve");
        similar_asserts::assert_eq!(cfg, Config::default());
        assert_eq!(out, "pushfrequency: 1m0s\ntoggle: false\n");
        // The default file was just written, so it is the one in use.
        assert!(err.contains("Using config file:"));
        assert!(inv.cwd.path().join("jetpalm.yaml").is_file());
    }

    #[test]
    fn test_file_sets_push_frequency() {
        let inv = Invocation::new();
        inv.write_config("pushfrequency: 30s\n");
        let (result, out, _) = inv.run(&[], &[]);

        assert_eq!(result.expect("resolve").client.push_frequency, Interval::from_secs(30));
        assert!(out.contains("pushfrequency: 30s"));
    }

    #[test]
    fn test_env_beats_file() {
        let inv = Invocation::new();
        inv.write_config("pushfrequency: 30s\n");
        let (result, out, _) = inv.run(&[], &[("STING_PUSHFREQUENCY", "10s")]);

        assert_eq!(result.expect("resolve").client.push_frequency, Interval::from_secs(10));
        assert!(out.contains("pushfrequency: 10s"));
    }

    #[test]
    fn test_flag_beats_env_and_file() {
        let inv = Invocation::new();
        inv.write_config("pushfrequency: 30s\n");
        let (result, out, _) =
            inv.run(&["--push-frequency=5s"], &[("STING_PUSHFREQUENCY", "10s")]);

        assert_eq!(result.expect("resolve").client.push_frequency, Interval::from_secs(5));
        assert!(out.contains("pushfrequency: 5s"));
    }

    #[test]
    fn test_env_fills_unset_flag_by_its_own_name() {
        let inv = Invocation::new();
        let (result, _, _) =
            inv.run(&[], &[("STING_PUSH_FREQUENCY", "45s"), ("STING_TOGGLE", "1")]);

        let cfg = result.expect("resolve");
        assert_eq!(cfg.client.push_frequency, Interval::from_secs(45));
        assert!(cfg.toggle);
    }

    #[test]
    fn test_field_env_beats_hyphenated_file_key() {
        let inv = Invocation::new();
        inv.write_config("push-frequency: 30s\n");
        let (result, out, _) = inv.run(&[], &[("STING_PUSHFREQUENCY", "10s")]);

        assert_eq!(result.expect("resolve").client.push_frequency, Interval::from_secs(10));
        assert!(out.contains("pushfrequency: 10s"));
    }

    #[test]
    fn test_toml_file_in_cwd_is_preferred() {
        let inv = Invocation::new();
        fs::write(inv.cwd.path().join("jetpalm.toml"), "pushfrequency = \"30s\"\n")
            .expect("write toml");
        let (result, out, err) = inv.run(&[], &[]);

        assert_eq!(result.expect("resolve").client.push_frequency, Interval::from_secs(30));
        assert!(out.contains("pushfrequency: 30s"));
        assert!(err.contains("jetpalm.toml"), "stderr: {err}");
    }

    #[test]
    fn test_malformed_file_produces_no_output() {
        let inv = Invocation::new();
        inv.write_config("pushfrequency: [30s\n");
        let (result, out, err) = inv.run(&[], &[]);

        let failure = result.expect_err("malformed");
        assert!(matches!(
            failure.downcast_ref::<ConfigError>(),
            Some(ConfigError::Parse { .. })
        ));
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn test_env_value_of_wrong_type_names_the_flag() {
        let inv = Invocation::new();
        let (result, _, _) = inv.run(&[], &[("STING_TOGGLE", "sometimes")]);

        let failure = result.expect_err("mismatch");
        assert!(failure.to_string().contains("--toggle"), "unexpected error: {failure}");
    }
}
