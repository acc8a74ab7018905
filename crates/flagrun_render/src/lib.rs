pub mod camera;
pub mod target;
pub mod texture;

pub use camera::Camera2D;
pub use target::{hex_color, Color, CommandRecorder, DrawCommand, RenderTarget};
pub use texture::{AssetHandle, AssetProvider, AssetRegistry, FileAssetProvider, SpriteImage};
