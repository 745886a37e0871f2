use std::ffi::OsString;
use std::path::PathBuf;

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve metrics for the sensor at `device`.
    Run(RunOptions),
    Help,
    Version,
}

/// Options for serving; the device path has already been checked to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub device: PathBuf,
}

/// Invalid command line. Fatal before the listener is bound.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CliError {
    #[error("required argument 'port' not provided")]
    MissingPort,

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("unknown flag '{0}'")]
    UnknownFlag(String),

    #[error("path '{0}' does not exist")]
    PortNotFound(String),

    #[error("'{0}' is a directory")]
    PortIsDirectory(String),
}

/// Exit status used for every command-line error.
pub const USAGE_EXIT_CODE: u8 = 2;

pub fn usage() -> String {
    format!(
        concat!(
            "usage: {name} <port>\n",
            "\n",
            "Expose the CO2 concentration read from an MH-Z16 sensor as a gauge\n",
            "on http://<host>:<port>/metrics.\n",
            "\n",
            "ARGS:\n",
            "  <port>         Serial device the sensor is attached to (e.g. /dev/ttyUSB0)\n",
            "\n",
            "OPTIONS:\n",
            "  -h, --help     Show this help\n",
            "  -V, --version  Show version\n",
        ),
        name = env!("CARGO_PKG_NAME"),
    )
}

/// Parse arguments, excluding the program name.
///
/// Arguments are taken as `OsString` so device paths that are not valid
/// UTF-8 still reach the existence check.
pub fn parse_args<I, S>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut port: Option<OsString> = None;

    for arg in args {
        let arg: OsString = arg.into();
        match arg.to_str() {
            Some("-h" | "--help") => return Ok(Command::Help),
            Some("-V" | "--version") => return Ok(Command::Version),
            _ => {}
        }

        if arg.len() > 1 && arg.to_string_lossy().starts_with('-') {
            return Err(CliError::UnknownFlag(arg.to_string_lossy().into_owned()));
        }
        if port.is_some() {
            return Err(CliError::UnexpectedArgument(
                arg.to_string_lossy().into_owned(),
            ));
        }
        port = Some(arg);
    }

    let port = port.ok_or(CliError::MissingPort)?;
    let device = existing_file(PathBuf::from(port))?;
    Ok(Command::Run(RunOptions { device }))
}

fn existing_file(path: PathBuf) -> Result<PathBuf, CliError> {
    match path.metadata() {
        Ok(meta) if meta.is_dir() => Err(CliError::PortIsDirectory(path.display().to_string())),
        Ok(_) => Ok(path),
        Err(_) => Err(CliError::PortNotFound(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, CliError> {
        parse_args(args.iter().copied())
    }

    #[test]
    fn missing_port_is_rejected() {
        assert_eq!(parse(&[]), Err(CliError::MissingPort));
    }

    #[test]
    fn existing_file_is_accepted() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        assert_eq!(
            parse(&[path]),
            Ok(Command::Run(RunOptions {
                device: file.path().to_path_buf(),
            }))
        );
    }

    #[test]
    fn nonexistent_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("ttyUSB9");
        let missing = missing.to_str().unwrap();

        assert_eq!(
            parse(&[missing]),
            Err(CliError::PortNotFound(missing.to_string()))
        );
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        assert_eq!(
            parse(&[path]),
            Err(CliError::PortIsDirectory(path.to_string()))
        );
    }

    #[test]
    fn second_positional_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        assert_eq!(
            parse(&[path, "extra"]),
            Err(CliError::UnexpectedArgument("extra".into()))
        );
    }

    #[test]
    fn flags() {
        assert_eq!(parse(&["--help"]), Ok(Command::Help));
        assert_eq!(parse(&["-V"]), Ok(Command::Version));
        assert_eq!(
            parse(&["--baud", "9600"]),
            Err(CliError::UnknownFlag("--baud".into()))
        );
    }

    #[test]
    fn usage_names_the_positional() {
        assert!(usage().contains("<port>"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_device_name_is_accepted() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let device = dir.path().join(std::ffi::OsStr::from_bytes(b"tty\xffUSB"));
        std::fs::File::create(&device).unwrap();

        assert_eq!(
            parse_args([device.as_os_str()]),
            Ok(Command::Run(RunOptions { device: device.clone() }))
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn missing_non_utf8_device_is_a_usage_error() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let device = dir.path().join(std::ffi::OsStr::from_bytes(b"tty\xffUSB"));

        assert_eq!(
            parse_args([device.as_os_str()]),
            Err(CliError::PortNotFound(device.display().to_string()))
        );
    }
}
