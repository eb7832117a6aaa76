use std::io::{BufRead, Write};

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input closed before an answer was given")]
    Exhausted,
}

/// Source of operator answers. Blocks until one is available.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> Result<String, PromptError>;
}

/// Asks until `parse` accepts the (trimmed) answer.
pub fn ask_until<P, T, F>(prompter: &mut P, question: &str, parse: F) -> Result<T, PromptError>
where
    P: Prompter + ?Sized,
    F: Fn(&str) -> Option<T>,
{
    loop {
        let answer = prompter.ask(question)?;
        match parse(answer.trim()) {
            Some(value) => return Ok(value),
            None => tracing::warn!("`{}` is not a valid answer", answer.trim()),
        }
    }
}

/// Interactive stdin/stdout prompts.
pub struct Terminal;

impl Prompter for Terminal {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{question}")?;
        stdout.flush()?;

        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(PromptError::Exhausted);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[cfg(test)]
pub use scripted::Scripted;

#[cfg(test)]
mod scripted {
    use super::*;
    use std::collections::VecDeque;

    /// Replays canned answers and remembers what was asked.
    #[derive(Default)]
    pub struct Scripted {
        answers: VecDeque<String>,
        pub asked: Vec<String>,
    }

    impl Scripted {
        pub fn new<I, S>(answers: I) -> Scripted
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Scripted {
                answers: answers.into_iter().map(Into::into).collect(),
                asked: Vec::new(),
            }
        }

        pub fn remaining(&self) -> usize {
            self.answers.len()
        }
    }

    impl Prompter for Scripted {
        fn ask(&mut self, question: &str) -> Result<String, PromptError> {
            self.asked.push(question.to_string());
            self.answers.pop_front().ok_or(PromptError::Exhausted)
        }
    }
}
