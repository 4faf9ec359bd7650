#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to run `{program}` — is it installed and on PATH?")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` command failed: {args:?}\n{stderr}")]
    Failed {
        program: String,
        args: Vec<String>,
        stderr: String,
    },

    #[error("`{program}` output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },

    #[error("failed to write to `{program}` stdin")]
    StdinWrite {
        program: String,
        source: std::io::Error,
    },
}
