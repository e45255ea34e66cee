mod binding;
mod error;
mod event;
mod loader;
mod manager;
mod record;

pub use self::binding::{AssetBinding, BindingStatus};
pub use self::error::LoadError;
pub use self::event::{StatusEvent, Subscription};
pub use self::loader::AssetLoader;
pub use self::manager::{AssetFuture, AssetManager, AssetStatus, PreloadItem};
pub use self::record::{AssetKey, AssetKind, AssetPriority, AssetRecord};
