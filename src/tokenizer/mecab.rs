// src/tokenizer/mecab.rs
use super::{parse_mecab_output, TokenizeError, Tokenizer};
use crate::core::types::Token;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

/// Runs one MeCab process per call, feeding the whole text on stdin.
#[derive(Debug, Clone)]
pub struct MecabTokenizer {
    program: PathBuf,
    user_dictionary: Option<PathBuf>,
}

impl MecabTokenizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            user_dictionary: None,
        }
    }

    /// Passes `-u <path>` so MeCab also consults a user dictionary.
    pub fn with_user_dictionary(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_dictionary = Some(path.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn user_dictionary(&self) -> Option<&Path> {
        self.user_dictionary.as_deref()
    }
}

impl Default for MecabTokenizer {
    fn default() -> Self {
        Self::new("mecab")
    }
}

/// Drops blank lines and terminates every remaining line with `\n`,
/// so MeCab emits exactly one `EOS` per input line.
fn prepare_input(text: &str) -> String {
    let mut input = String::with_capacity(text.len() + 1);
    for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
        input.push_str(line);
        input.push('\n');
    }
    input
}

impl Tokenizer for MecabTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Vec<Token>>, TokenizeError> {
        let input = prepare_input(text);
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let mut command = Command::new(&self.program);
        if let Some(dictionary) = &self.user_dictionary {
            command.arg("-u").arg(dictionary);
        }
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TokenizeError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "tokenizer stdin unavailable"))?;

        // stdin is written from a scoped thread so a large output can't fill the pipe and block us
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input.as_bytes()));
            let output = child.wait_with_output();
            (writer.join(), output)
        });
        let output = output?;

        if !output.status.success() {
            return Err(TokenizeError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        match written {
            Ok(result) => result?,
            Err(_) => return Err(io::Error::other("tokenizer stdin writer panicked").into()),
        }

        let stdout = String::from_utf8(output.stdout)?;
        let lines = parse_mecab_output(&stdout);
        tracing::debug!(
            "Tokenized {} line(s) with {}",
            lines.len(),
            self.program.display()
        );
        Ok(lines)
    }
}
