use std::time::Duration;

/// Output captured from a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output only
    pub stdout: Vec<u8>,
    /// Standard output and standard error interleaved in arrival order
    pub combined: Vec<u8>,
    /// Wall-clock time spent waiting for the process
    pub duration: Duration,
}

impl CommandOutput {
    pub fn new(stdout: Vec<u8>, combined: Vec<u8>, duration: Duration) -> Self {
        Self {
            stdout,
            combined,
            duration,
        }
    }

    /// Output for a command that only wrote to stdout
    pub fn from_stdout(stdout: impl Into<Vec<u8>>) -> Self {
        let stdout = stdout.into();
        Self {
            combined: stdout.clone(),
            stdout,
            duration: Duration::ZERO,
        }
    }

    /// Stdout as text with surrounding newlines removed
    pub fn stdout_trimmed(&self) -> String {
        String::from_utf8_lossy(&self.stdout)
            .trim_matches(|c| c == '\n' || c == '\r')
            .to_string()
    }

    pub fn combined_lossy(&self) -> String {
        String::from_utf8_lossy(&self.combined).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdout_trimmed_strips_newlines_only() {
        let output = CommandOutput::from_stdout("4b825dc642cb6eb9a060e54bf8d69288fbee4904\n");
        assert_eq!(
            output.stdout_trimmed(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );

        let output = CommandOutput::from_stdout("  padded \r\n");
        assert_eq!(output.stdout_trimmed(), "  padded ");
    }

    #[test]
    fn test_from_stdout_mirrors_combined() {
        let output = CommandOutput::from_stdout(b"abc\n".to_vec());
        assert_eq!(output.combined, b"abc\n");
        assert_eq!(output.combined_lossy(), "abc\n");
    }
}
