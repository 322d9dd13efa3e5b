use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::str::FromStr;

pub const USAGE: &str = "usage: distbuild [sdist|wheel]";

/// Which distribution the packaging tool should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Sdist,
    Wheel,
}

impl Selector {
    pub fn as_str(&self) -> &str {
        match self {
            Selector::Sdist => "sdist",
            Selector::Wheel => "wheel",
        }
    }

    /// Tool arguments for this selector, not counting the tool itself.
    pub fn base_args(&self) -> &'static [&'static str] {
        match self {
            Selector::Sdist => &["sdist"],
            Selector::Wheel => &["build", "--no-sdist", "--release"],
        }
    }
}

impl FromStr for Selector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sdist" => Ok(Selector::Sdist),
            "wheel" => Ok(Selector::Wheel),
            _ => Err(anyhow!("Unknown selector: {}", s)),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved command line, as it would be handed to the OS.
#[derive(Debug, Clone, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

pub struct MaturinCommand {
    tool: String,
    selector: Selector,
    out_dir: Option<PathBuf>,
    passthrough: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl MaturinCommand {
    pub fn new(tool: impl Into<String>, selector: Selector) -> Self {
        Self {
            tool: tool.into(),
            selector,
            out_dir: None,
            passthrough: Vec::new(),
            current_dir: None,
        }
    }

    pub fn out_dir(mut self, out_dir: impl AsRef<Path>) -> Self {
        self.out_dir = Some(out_dir.as_ref().to_path_buf());
        self
    }

    pub fn passthrough(mut self, args: Vec<String>) -> Self {
        self.passthrough = args;
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Arguments after the program name: selector tokens, then `-o <dir>`,
    /// then the passthrough arguments in order.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = self
            .selector
            .base_args()
            .iter()
            .map(|arg| arg.to_string())
            .collect();

        if let Some(ref out_dir) = self.out_dir {
            args.push("-o".to_string());
            args.push(out_dir.to_string_lossy().into_owned());
        }

        args.extend(self.passthrough.iter().cloned());
        args
    }

    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![self.tool.clone()];
        argv.extend(self.args());
        argv
    }

    pub fn invocation(&self) -> Invocation {
        Invocation {
            program: self.tool.clone(),
            args: self.args(),
            cwd: self.current_dir.clone(),
        }
    }

    /// Runs the tool with inherited stdio and returns its exit code.
    pub fn run(&self) -> Result<i32> {
        let program = which::which(&self.tool)
            .with_context(|| format!("{} not found in PATH", self.tool))?;

        let mut cmd = Command::new(&program);
        cmd.args(self.args());

        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        log::info!("building {} with {} ({})", self.selector, self.argv().join(" "), program.display());

        let status = cmd
            .status()
            .with_context(|| format!("Failed to execute {}", self.tool))?;

        let code = exit_code(status);
        log::debug!("{} exited with code {}", self.tool, code);

        Ok(code)
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parsing() {
        assert_eq!("sdist".parse::<Selector>().unwrap(), Selector::Sdist);
        assert_eq!("wheel".parse::<Selector>().unwrap(), Selector::Wheel);
        assert!("Wheel".parse::<Selector>().is_err());
        assert!("bdist".parse::<Selector>().is_err());
        assert!("".parse::<Selector>().is_err());
    }

    #[test]
    fn test_sdist_argv() {
        let cmd = MaturinCommand::new("maturin", Selector::Sdist).out_dir("/project/dist");

        assert_eq!(cmd.argv(), vec!["maturin", "sdist", "-o", "/project/dist"]);
    }

    #[test]
    fn test_wheel_argv_with_passthrough() {
        let cmd = MaturinCommand::new("maturin", Selector::Wheel)
            .out_dir("/project/dist")
            .passthrough(vec!["--interpreter".to_string(), "python3.12".to_string(), "-v".to_string()]);

        assert_eq!(
            cmd.argv(),
            vec![
                "maturin",
                "build",
                "--no-sdist",
                "--release",
                "-o",
                "/project/dist",
                "--interpreter",
                "python3.12",
                "-v",
            ]
        );
    }

    #[test]
    fn test_invocation_serializes() {
        let invocation = MaturinCommand::new("maturin", Selector::Sdist)
            .out_dir("dist")
            .current_dir("pngquant")
            .invocation();

        let json = serde_json::to_value(&invocation).unwrap();
        assert_eq!(json["program"], "maturin");
        assert_eq!(json["args"], serde_json::json!(["sdist", "-o", "dist"]));
        assert_eq!(json["cwd"], "pngquant");
    }

    #[test]
    fn test_missing_tool_is_an_error() {
        let cmd = MaturinCommand::new("distbuild-no-such-tool-xyz", Selector::Sdist);
        assert!(cmd.run().is_err());
    }
}
