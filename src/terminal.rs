use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::Mutex;
use tracing::warn;

use crate::notify::Confirm;

/// Line-oriented terminal input shared by the command loop and the
/// removal prompt.
pub struct Terminal<R> {
    lines: Mutex<Lines<R>>,
}

impl<R> Terminal<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }

    /// Next input line, or `None` at end of input.
    pub async fn next_line(&self) -> Option<String> {
        match self.lines.lock().await.next_line().await {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read terminal input: {}", e);
                None
            }
        }
    }
}

pub fn prompt(text: &str) {
    print!("{}", text);
    let _ = std::io::stdout().flush();
}

#[async_trait]
impl<R> Confirm for Terminal<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn confirm(&self, prompt_text: &str) -> bool {
        prompt(&format!("{} [y/N] ", prompt_text));
        match self.next_line().await {
            Some(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }
}
