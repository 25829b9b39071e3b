use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::warn;

mod chat;

pub use chat::ChatBackend;

/// Pause between consecutive backend calls, to stay polite toward local
/// inference servers.
const CALL_PAUSE: Duration = Duration::from_millis(300);

pub type BackendFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

/// A text-generation backend. `generate` consumes a clone so the returned
/// future is `'static` and can be driven without borrowing the backend.
pub trait Backend: Clone + Send + Sync {
    fn generate(self, prompt: String) -> BackendFuture;
}

/// Placeholder stored when a single translation call fails. The batch keeps
/// going; the marker survives serialization so a later rerun can spot it.
pub fn failure_placeholder(original: &str) -> String {
    format!("[translation failed: {original}]")
}

/// Translate `texts` one by one, preserving order and length. A failed call
/// is logged and replaced by [`failure_placeholder`] instead of aborting the
/// whole batch.
pub async fn translate_batch<B, F>(backend: &B, texts: &[String], build_prompt: F) -> Vec<String>
where
    B: Backend,
    F: Fn(&str) -> Result<String>,
{
    let mut results = Vec::with_capacity(texts.len());
    for (index, text) in texts.iter().enumerate() {
        if index > 0 {
            sleep(CALL_PAUSE).await;
        }
        let outcome = match build_prompt(text) {
            Ok(prompt) => backend.clone().generate(prompt).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(translation) => results.push(translation),
            Err(err) => {
                warn!("translation failed for segment {}: {err:#}", index + 1);
                results.push(failure_placeholder(text));
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[derive(Clone)]
    struct Scripted;

    impl Backend for Scripted {
        fn generate(self, prompt: String) -> BackendFuture {
            Box::pin(async move {
                if prompt.contains("fail") {
                    Err(anyhow!("backend unavailable"))
                } else {
                    Ok(format!("译:{prompt}"))
                }
            })
        }
    }

    #[tokio::test]
    async fn batch_preserves_order_and_length() {
        let texts = vec!["one".to_string(), "fail here".to_string(), "three".to_string()];
        let results = translate_batch(&Scripted, &texts, |text| Ok(text.to_string())).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], "译:one");
        assert_eq!(results[1], "[translation failed: fail here]");
        assert_eq!(results[2], "译:three");
    }

    #[tokio::test]
    async fn prompt_build_errors_become_placeholders() {
        let texts = vec!["alpha".to_string()];
        let results = translate_batch(&Scripted, &texts, |_| Err(anyhow!("bad template"))).await;
        assert_eq!(results, vec!["[translation failed: alpha]"]);
    }
}
