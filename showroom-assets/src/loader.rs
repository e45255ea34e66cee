use async_trait::async_trait;
use eyre::Result;

use crate::{AssetKind, AssetRecord};

/// The actual fetch mechanism, supplied by the hosting environment (in the
/// full application, the rendering engine's model/texture loader). The
/// manager treats it as opaque: arbitrary latency, arbitrary failure.
#[async_trait]
pub trait AssetLoader: Send + Sync + 'static {
    async fn load(&self, key: &str, kind: AssetKind) -> Result<AssetRecord>;
}
