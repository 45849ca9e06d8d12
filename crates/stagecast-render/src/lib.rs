//! # stagecast-render
//!
//! Turns a scene into what the two surfaces show. The preview and the live
//! view share one layer loop ([`compose_layers`]) and one rasterizer, so a
//! given scene state looks the same in both. Scrolling layers are driven by
//! [`ScrollAnimators`] on top of a [`FrameScheduler`].

pub mod composite;
pub mod effects;
pub mod frame_loop;
pub mod media;
pub mod preview;
pub mod raster;
pub mod resolve;
pub mod scroll;
pub mod tiled;

pub use composite::{compose_layers, CompositeLayer};
pub use frame_loop::{FrameHandle, FrameScheduler, ManualScheduler};
pub use media::MediaCache;
pub use preview::{render_preview, PreviewFrame, PreviewOptions};
pub use raster::Rasterizer;
pub use resolve::{resolve_filters, resolve_layer, AppearanceEffect, LayerStyle, TransformOp};
pub use scroll::{InfiniteScroll, ScrollAnimators, SCROLL_PX_PER_UNIT};
pub use tiled::{compute_tiles, render_live, LiveFrame, LiveOptions, LiveView, TiledLayout, ViewportSize};
