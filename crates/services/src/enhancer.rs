//! Default description-enhancer plugin.
//!
//! The real enhancer is an external text-generation endpoint; deployments
//! without one fall back to this passthrough, which only normalizes
//! whitespace so the UI behaves identically either way.

use async_trait::async_trait;

use domains::{DescriptionEnhancer, Result};

pub struct PassthroughEnhancer;

#[async_trait]
impl DescriptionEnhancer for PassthroughEnhancer {
    async fn enhance(&self, text: &str) -> Result<String> {
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passthrough_collapses_whitespace_only() {
        let out = PassthroughEnhancer
            .enhance("  healthy   pair of\nbullocks ")
            .await
            .unwrap();
        assert_eq!(out, "healthy pair of bullocks");
    }
}
