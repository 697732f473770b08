//! Operator confirmation for large batches

use async_trait::async_trait;
use std::io::{BufRead, Write};
use tokio::sync::oneshot;

/// Yes/no decision before a long-running import
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm_large_batch(&self, count: usize) -> bool;
}

/// Always confirms (`--yes`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

#[async_trait]
impl Confirmer for AssumeYes {
    async fn confirm_large_batch(&self, _count: usize) -> bool {
        true
    }
}

/// Asks on the terminal; anything but `y`/`yes` declines
///
/// The blocking read runs on a detached thread so that a run cancelled at
/// the prompt can exit without waiting for a line on stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm_large_batch(&self, count: usize) -> bool {
        let (tx, rx) = oneshot::channel();
        let spawned = std::thread::Builder::new()
            .name("confirm-prompt".to_string())
            .spawn(move || {
                let _ = tx.send(read_answer(count));
            });
        if let Err(e) = spawned {
            tracing::warn!("Failed to start confirmation prompt: {}", e);
            return false;
        }

        match rx.await {
            Ok(Ok(line)) => is_affirmative(&line),
            Ok(Err(e)) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
            Err(_) => {
                tracing::warn!("Confirmation prompt ended without an answer");
                false
            }
        }
    }
}

fn read_answer(count: usize) -> std::io::Result<String> {
    let mut stderr = std::io::stderr();
    write!(
        stderr,
        "You are about to import {} items. This may take a while.\nContinue? [y/N] ",
        count
    )?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answers() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("  YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }

    #[tokio::test]
    async fn test_assume_yes() {
        assert!(AssumeYes.confirm_large_batch(10_000).await);
    }
}
