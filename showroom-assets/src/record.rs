use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;

pub type AssetKey = Arc<str>;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum AssetKind {
    #[default]
    Container,
    Texture,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AssetPriority {
    High,
    #[default]
    Medium,
    Low,
}

pub struct AssetRecord {
    key: AssetKey,
    kind: AssetKind,
    data: Box<dyn Any + Send + Sync>,
}

impl AssetRecord {
    pub fn new<D>(key: impl Into<AssetKey>, kind: AssetKind, data: D) -> AssetRecord
    where
        D: Send + Sync + 'static,
    {
        AssetRecord {
            key: key.into(),
            kind,
            data: Box::new(data),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn data<D: 'static>(&self) -> Option<&D> {
        self.data.downcast_ref()
    }
}

impl Debug for AssetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRecord")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
