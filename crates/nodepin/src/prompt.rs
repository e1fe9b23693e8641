use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// The operator's side of the conversation.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Show `question` and wait for one line of input. `None` means the
    /// input stream is closed.
    async fn ask(&self, question: &str) -> std::io::Result<Option<String>>;

    fn say(&self, message: &str);

    fn warn(&self, message: &str);
}

/// `y` or `yes`, in any case.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

pub struct StdioPrompter {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Default for StdioPrompter {
    fn default() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

#[async_trait]
impl Prompter for StdioPrompter {
    async fn ask(&self, question: &str) -> std::io::Result<Option<String>> {
        {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(question.as_bytes())?;
            stdout.flush()?;
        }

        let line = self.lines.lock().await.next_line().await?;
        Ok(line.map(|line| line.trim().to_string()))
    }

    fn say(&self, message: &str) {
        println!("{message}");
    }

    fn warn(&self, message: &str) {
        eprintln!("{message}");
    }
}
