#![forbid(unsafe_code)]

//! Command-line argument parsing for the splash.
//!
//! Parses args manually to keep the binary lean. Environment variables with
//! the `ALTEZZA_SPLASH_*` prefix are applied first; explicit flags win.

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use altezza_core::background::BackgroundConfig;
use altezza_core::terminal_session::SessionOptions;
use altezza_runtime::ProgramConfig;

use crate::app::SplashConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Altezza Pictures: coming soon

USAGE:
    altezza-splash [OPTIONS]

OPTIONS:
    --no-mouse           Disable mouse capture (keyboard only)
    --mute               Never ring the terminal bell
    --exit-after-ms=N    Quit on its own after N milliseconds
    --log-file=PATH      Write structured logs to PATH
    --seed=N             Seed for the background light field
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    Ctrl+Shift+R         Vibrant mode for 10 seconds
    Hold click on logo   Same, after 2 seconds
    Enter                Open/close the assistant
    Esc                  Close the assistant
    l                    Open @altezzagroup (assistant open)
    q / Ctrl+C           Quit

ENVIRONMENT VARIABLES:
    ALTEZZA_SPLASH_NO_MOUSE        Same as --no-mouse when set to 1/true
    ALTEZZA_SPLASH_MUTE            Same as --mute when set to 1/true
    ALTEZZA_SPLASH_EXIT_AFTER_MS   Override --exit-after-ms
    ALTEZZA_SPLASH_LOG             Override --log-file
    ALTEZZA_SPLASH_SEED            Override --seed
    RUST_LOG                       Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Whether mouse events are captured.
    pub mouse: bool,
    /// Whether the notification bell is silenced.
    pub mute: bool,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    /// Log destination; logging is off without one.
    pub log_file: Option<PathBuf>,
    /// Light field seed.
    pub seed: Option<u64>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            mouse: true,
            mute: false,
            exit_after_ms: 0,
            log_file: None,
            seed: None,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Run the splash.
    Run(Opts),
    /// Print help and exit.
    Help,
    /// Print the version and exit.
    Version,
}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help/version or a usage error and exits where appropriate.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("altezza-splash {VERSION}");
                process::exit(0);
            }
            Err(message) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` (without the program name), reading overrides through
    /// `var`.
    pub fn parse_from(args: &[String], var: impl Fn(&str) -> Option<String>) -> Result<Parsed, String> {
        let mut opts = Self::default();

        if var("ALTEZZA_SPLASH_NO_MOUSE").is_some_and(|v| truthy(&v)) {
            opts.mouse = false;
        }
        if var("ALTEZZA_SPLASH_MUTE").is_some_and(|v| truthy(&v)) {
            opts.mute = true;
        }
        if let Some(val) = var("ALTEZZA_SPLASH_EXIT_AFTER_MS")
            && let Ok(n) = val.parse()
        {
            opts.exit_after_ms = n;
        }
        if let Some(val) = var("ALTEZZA_SPLASH_LOG")
            && !val.is_empty()
        {
            opts.log_file = Some(PathBuf::from(val));
        }
        if let Some(val) = var("ALTEZZA_SPLASH_SEED")
            && let Ok(n) = val.parse()
        {
            opts.seed = Some(n);
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--no-mouse" => opts.mouse = false,
                "--mute" => opts.mute = true,
                other => {
                    if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms = val
                            .parse()
                            .map_err(|_| format!("Invalid --exit-after-ms value: {val}"))?;
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        if val.is_empty() {
                            return Err("Invalid --log-file value: empty path".to_owned());
                        }
                        opts.log_file = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--seed=") {
                        opts.seed = Some(val.parse().map_err(|_| format!("Invalid --seed value: {val}"))?);
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }

    /// Runtime settings these options select.
    #[must_use]
    pub fn program_config(&self) -> ProgramConfig {
        let session = if self.mouse {
            SessionOptions::fullscreen()
        } else {
            SessionOptions::fullscreen().without_mouse()
        };
        ProgramConfig {
            session,
            exit_after: (self.exit_after_ms > 0).then(|| Duration::from_millis(self.exit_after_ms)),
            mute: self.mute,
            ..ProgramConfig::default()
        }
    }

    /// Component settings; only the light-field seed is configurable.
    #[must_use]
    pub fn splash_config(&self) -> SplashConfig {
        SplashConfig {
            background: BackgroundConfig {
                seed: self.seed,
                ..BackgroundConfig::default()
            },
            ..SplashConfig::default()
        }
    }
}

fn truthy(val: &str) -> bool {
    matches!(val.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
