//! Command argument construction helpers.
//!
//! This module is responsible for *building* the argument lists that will be
//! passed to `mongo-dump`.  It does not execute anything; process execution
//! lives in [`crate::ui`] so that the spinner can own the terminal while
//! commands run.  Every function here is pure and testable without spawning
//! child processes.

use std::path::{Path, PathBuf};

use crate::{config::DatabaseTarget, error::DumpError};

// ─── Platform ─────────────────────────────────────────────────────────────────

/// Operating systems the dump binary is shipped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// Map an OS name as reported by `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Option<Self> {
        match os {
            "linux" => Some(Self::Linux),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    /// The platform this process is running on.
    pub fn current() -> Result<Self, DumpError> {
        let os = std::env::consts::OS;
        Self::from_os(os).ok_or_else(|| DumpError::UnsupportedPlatform { os: os.into() })
    }

    /// File name of the dump binary inside the bin directory.
    pub const fn executable(self) -> &'static str {
        match self {
            Self::Linux => "mongo-dump",
            Self::Windows => "mongo-dump.exe",
        }
    }
}

/// Full path of the dump binary for `platform` under `bin_dir`.
pub fn dump_program(bin_dir: &Path, platform: Platform) -> PathBuf {
    bin_dir.join(platform.executable())
}

// ─── mongo-dump command ───────────────────────────────────────────────────────

/// Builds the full argument vector for one target:
///
/// ```text
/// <program> -h <host> -u <user> -p <pwd> --authenticationDatabase <db> -d <db> -o <out>
/// ```
///
/// `output_dir` is passed in already templated.
pub fn dump_command(program: &Path, target: &DatabaseTarget, output_dir: &str) -> Vec<String> {
    vec![
        program.to_string_lossy().into_owned(),
        "-h".into(),
        target.host.clone(),
        "-u".into(),
        target.user.clone(),
        "-p".into(),
        target.password.clone(),
        "--authenticationDatabase".into(),
        target.database.clone(),
        "-d".into(),
        target.database.clone(),
        "-o".into(),
        output_dir.into(),
    ]
}

/// Flags of the dump command that take a value.
const VALUE_FLAGS: &[&str] = &["-h", "-u", "-p", "--authenticationDatabase", "-d", "-o"];

/// Render `args` for error messages with the `-p` value masked.
///
/// Arguments are walked as flag/value pairs, so a value that happens to read
/// `-p` (say, a user name) is never mistaken for the password flag.
pub fn describe(args: &[String]) -> String {
    let Some((program, rest)) = args.split_first() else {
        return String::new();
    };

    let mut out: Vec<&str> = Vec::with_capacity(args.len());
    out.push(program);

    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        out.push(arg);
        if !VALUE_FLAGS.contains(&arg.as_str()) {
            continue;
        }
        if let Some(value) = iter.next() {
            out.push(if arg == "-p" { "****" } else { value.as_str() });
        }
    }
    out.join(" ")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_target(host: &str, password: &str) -> DatabaseTarget {
        DatabaseTarget {
            host: host.into(),
            user: "backup".into(),
            password: password.into(),
            database: "orders".into(),
            output_dir: "/srv/dump/${date}".into(),
        }
    }

    // ── Platform ─────────────────────────────────────────────────────────────

    #[test]
    fn recognised_platforms() {
        assert_eq!(Platform::from_os("linux"), Some(Platform::Linux));
        assert_eq!(Platform::from_os("windows"), Some(Platform::Windows));
    }

    #[test]
    fn other_platforms_are_not_recognised() {
        for os in ["macos", "freebsd", "", "Linux"] {
            assert_eq!(Platform::from_os(os), None, "{os} should be unsupported");
        }
    }

    #[test]
    fn executable_names() {
        assert_eq!(Platform::Linux.executable(), "mongo-dump");
        assert_eq!(Platform::Windows.executable(), "mongo-dump.exe");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn current_platform_on_linux() {
        assert_eq!(Platform::current().unwrap(), Platform::Linux);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn current_platform_on_macos_is_unsupported() {
        assert!(matches!(
            Platform::current(),
            Err(DumpError::UnsupportedPlatform { .. })
        ));
    }

    #[test]
    fn program_lives_in_bin_dir() {
        let p = dump_program(Path::new("bin"), Platform::Linux);
        assert_eq!(p, Path::new("bin").join("mongo-dump"));
    }

    // ── dump_command ─────────────────────────────────────────────────────────

    #[test]
    fn database_doubles_as_auth_database() {
        let args = dump_command(Path::new("mongo-dump"), &make_target("h", "pw"), "/out");
        let auth = args
            .iter()
            .position(|a| a == "--authenticationDatabase")
            .unwrap();
        let db = args.iter().position(|a| a == "-d").unwrap();
        assert_eq!(args[auth + 1], "orders");
        assert_eq!(args[db + 1], "orders");
    }

    #[test]
    fn output_dir_is_taken_as_given() {
        let args = dump_command(Path::new("mongo-dump"), &make_target("h", "pw"), "/out/20240315");
        assert_eq!(args.last().unwrap(), "/out/20240315");
    }

    #[test]
    fn blank_values_pass_through() {
        let target = DatabaseTarget::default();
        let args = dump_command(Path::new("mongo-dump"), &target, "");
        assert_eq!(args.len(), 13);
        assert_eq!(args[2], "");
        assert_eq!(args[6], "");
    }

    #[test]
    fn snapshot_dump_command() {
        let args = dump_command(
            Path::new("mongo-dump"),
            &make_target("db1.lan:27017", "hunter2"),
            "/srv/dump/20240315",
        );
        insta::assert_debug_snapshot!(args, @r#"
        [
            "mongo-dump",
            "-h",
            "db1.lan:27017",
            "-u",
            "backup",
            "-p",
            "hunter2",
            "--authenticationDatabase",
            "orders",
            "-d",
            "orders",
            "-o",
            "/srv/dump/20240315",
        ]
        "#);
    }

    // ── describe ─────────────────────────────────────────────────────────────

    #[test]
    fn describe_masks_password() {
        let args = dump_command(Path::new("mongo-dump"), &make_target("h", "hunter2"), "/o");
        let text = describe(&args);
        assert!(!text.contains("hunter2"));
        assert!(text.contains("-p ****"));
        assert!(text.starts_with("mongo-dump -h h -u backup"));
    }

    #[test]
    fn describe_masks_password_when_user_looks_like_a_flag() {
        let mut target = make_target("h", "hunter2");
        target.user = "-p".into();
        let args = dump_command(Path::new("mongo-dump"), &target, "/o");
        let text = describe(&args);
        assert!(!text.contains("hunter2"), "password leaked: {text}");
        assert!(text.contains("-u -p -p ****"), "{text}");
    }

    #[test]
    fn describe_masks_password_that_looks_like_a_flag() {
        let args = dump_command(Path::new("mongo-dump"), &make_target("h", "-d"), "/o");
        assert!(describe(&args).contains("-p **** --authenticationDatabase orders -d orders"));
    }

    #[test]
    fn describe_empty_is_empty() {
        assert_eq!(describe(&[]), "");
    }

    #[test]
    fn describe_without_password_flag_is_plain_join() {
        let args: Vec<String> = vec!["sh".into(), "-c".into(), "true".into()];
        assert_eq!(describe(&args), "sh -c true");
    }
}
