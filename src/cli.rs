//! Command-line interface for the session demo server.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone)]
pub struct Args {
    /// Host address to bind to (overrides config file).
    pub host: Option<IpAddr>,
    /// Port to listen on (overrides config file).
    pub port: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Session cookie name (overrides config file).
    pub cookie_name: Option<String>,
    /// Save modified sessions automatically.
    pub auto_save: bool,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            config: None,
            cookie_name: None,
            auto_save: false,
            log_level: None,
            version: false,
            help: false,
        }
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("host", value))?,
                );
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('n') | Long("cookie-name") => {
                let value: String = parser.value()?.parse()?;
                if !is_valid_cookie_name(&value) {
                    return Err(ArgsError::InvalidValue("cookie-name", value));
                }
                result.cookie_name = Some(value);
            }
            Long("auto-save") => {
                result.auto_save = true;
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Check that a cookie name is a non-empty RFC 6265 token.
pub fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')'
                        | b'<'
                        | b'>'
                        | b'@'
                        | b','
                        | b';'
                        | b':'
                        | b'\\'
                        | b'"'
                        | b'/'
                        | b'['
                        | b']'
                        | b'?'
                        | b'='
                        | b'{'
                        | b'}'
                )
        })
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"session-demo {version}
Demo server for per-request sessions on axum

USAGE:
    session-demo [OPTIONS]

OPTIONS:
    -H, --host <ADDR>         Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>         Port to listen on [default: 3000]
    -c, --config <FILE>       Path to configuration file (JSON)
    -n, --cookie-name <NAME>  Session cookie name [default: sid]
    -l, --log-level <LVL>     Log level (error, warn, info, debug, trace)
        --auto-save           Save modified sessions after every request
    -h, --help                Print help
    -V, --version             Print version

ENVIRONMENT VARIABLES:
    REQUEST_SESSIONS_HOST         Host address (overrides config)
    REQUEST_SESSIONS_PORT         Port number (overrides config)
    REQUEST_SESSIONS_COOKIE_NAME  Session cookie name (overrides config)
    REQUEST_SESSIONS_LOG_LEVEL    Log level (overrides config)
    RUST_LOG                      Alternative log level setting

EXAMPLES:
    # Start with defaults (localhost:3000, cookie "sid")
    session-demo

    # Listen on all interfaces with a custom cookie
    session-demo -H 0.0.0.0 -p 8080 -n app.sid

    # Start with config file
    session-demo -c /etc/session-demo/config.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("session-demo {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("session-demo")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert!(result.host.is_none());
        assert!(result.port.is_none());
        assert!(result.cookie_name.is_none());
        assert!(!result.auto_save);
    }

    #[test]
    fn test_long_options() {
        let result =
            parse_args_from(args(&["--host", "192.168.1.1", "--port", "9000"])).unwrap();
        assert_eq!(result.host, Some("192.168.1.1".parse().unwrap()));
        assert_eq!(result.port, Some(9000));
    }

    #[test]
    fn test_cookie_name() {
        let result = parse_args_from(args(&["-n", "app.sid"])).unwrap();
        assert_eq!(result.cookie_name, Some("app.sid".to_string()));

        assert!(parse_args_from(args(&["-n", "bad;name"])).is_err());
        assert!(parse_args_from(args(&["--cookie-name", ""])).is_err());
    }

    #[test]
    fn test_auto_save() {
        let result = parse_args_from(args(&["--auto-save"])).unwrap();
        assert!(result.auto_save);
    }

    #[test]
    fn test_help_and_version_flags() {
        assert!(parse_args_from(args(&["-h"])).unwrap().help);
        assert!(parse_args_from(args(&["--help"])).unwrap().help);
        assert!(parse_args_from(args(&["-V"])).unwrap().version);
        assert!(parse_args_from(args(&["--version"])).unwrap().version);
    }

    #[test]
    fn test_invalid_port() {
        let result = parse_args_from(args(&["-p", "invalid"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unexpected_positional() {
        let err = parse_args_from(args(&["serve"])).unwrap_err();
        assert!(err.to_string().contains("unexpected argument"));
    }

    #[test]
    fn test_cookie_name_validation() {
        assert!(is_valid_cookie_name("sid"));
        assert!(is_valid_cookie_name("__Host-session"));
        assert!(!is_valid_cookie_name("has space"));
        assert!(!is_valid_cookie_name("a=b"));
        assert!(!is_valid_cookie_name(""));
    }
}
