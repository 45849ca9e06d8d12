//! Infinite tiled scroll.
//!
//! A scrolling layer is drawn as a 2×2 grid of its content, translated by
//! the negative of an accumulated position that wraps modulo the tile
//! size. Position advances with the measured time between frame
//! callbacks, so the speed does not depend on the refresh rate.

use std::collections::BTreeMap;

use stagecast_core::{FrameTime, Point2D, Rect, Size2D};
use stagecast_ir::{LayerId, ProjectConfig};

use crate::frame_loop::{FrameHandle, FrameScheduler, ManualScheduler};
use crate::resolve::{resolve_layer, ScrollVelocity};

/// Pixels per second for one velocity unit.
pub const SCROLL_PX_PER_UNIT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Scrolling {
        handle: FrameHandle,
        /// Unset until the first callback of a run.
        last_time: Option<FrameTime>,
    },
}

/// Scroll state of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct InfiniteScroll {
    velocity: ScrollVelocity,
    position: Point2D,
    /// Translation last applied to the tile grid.
    offset: Point2D,
    mounted: bool,
    phase: Phase,
}

impl InfiniteScroll {
    pub fn new(velocity: ScrollVelocity) -> Self {
        Self {
            velocity,
            position: Point2D::zero(),
            offset: Point2D::zero(),
            mounted: false,
            phase: Phase::Idle,
        }
    }

    pub fn velocity(&self) -> ScrollVelocity {
        self.velocity
    }

    /// Accumulated scroll distance in pixels.
    pub fn position(&self) -> Point2D {
        self.position
    }

    /// Translation of the tile grid, the negated wrapped position.
    pub fn offset(&self) -> Point2D {
        self.offset
    }

    pub fn is_scrolling(&self) -> bool {
        matches!(self.phase, Phase::Scrolling { .. })
    }

    /// The request this animator is waiting on, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        match self.phase {
            Phase::Scrolling { handle, .. } => Some(handle),
            Phase::Idle => None,
        }
    }

    /// Start animating. A zero velocity stays idle.
    pub fn mount(&mut self, sched: &mut dyn FrameScheduler) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.start(sched);
    }

    /// Stop animating and forget the position.
    pub fn unmount(&mut self, sched: &mut dyn FrameScheduler) {
        self.stop(sched);
        self.mounted = false;
        self.position = Point2D::zero();
        self.offset = Point2D::zero();
    }

    /// Change speed. Any change restarts the run from a fresh time origin;
    /// the position carries over.
    pub fn set_velocity(&mut self, velocity: ScrollVelocity, sched: &mut dyn FrameScheduler) {
        if velocity == self.velocity {
            return;
        }
        self.velocity = velocity;
        if self.mounted {
            self.stop(sched);
            self.start(sched);
        }
    }

    /// Handle a frame callback. Returns `true` when a new offset was applied.
    ///
    /// Callbacks for handles this animator no longer waits on are ignored.
    /// A tile with a zero dimension skips the wrap for this frame.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: FrameTime,
        tile: Size2D,
        sched: &mut dyn FrameScheduler,
    ) -> bool {
        let last_time = match self.phase {
            Phase::Scrolling {
                handle: pending,
                last_time,
            } if pending == handle => last_time,
            _ => return false,
        };

        let next = sched.request_frame();
        self.phase = Phase::Scrolling {
            handle: next,
            last_time: Some(now),
        };

        let Some(last_time) = last_time else {
            return false;
        };

        let delta = now.seconds_since(last_time);
        self.position.x += self.velocity.x * delta * SCROLL_PX_PER_UNIT;
        self.position.y += self.velocity.y * delta * SCROLL_PX_PER_UNIT;

        if tile.is_empty() {
            return false;
        }
        self.position.x = wrap(self.position.x, tile.width);
        self.position.y = wrap(self.position.y, tile.height);
        self.offset = Point2D::new(-self.position.x, -self.position.y);
        true
    }

    /// Placement of the four tiles for a tile of `tile` size.
    pub fn tile_rects(&self, tile: Size2D) -> [Rect; 4] {
        let Point2D { x, y } = self.offset;
        let (w, h) = (tile.width, tile.height);
        [
            Rect::new(x, y, w, h),
            Rect::new(x + w, y, w, h),
            Rect::new(x, y + h, w, h),
            Rect::new(x + w, y + h, w, h),
        ]
    }

    fn start(&mut self, sched: &mut dyn FrameScheduler) {
        if self.velocity.is_zero() {
            return;
        }
        let handle = sched.request_frame();
        tracing::debug!("scroll started ({:?})", handle);
        self.phase = Phase::Scrolling {
            handle,
            last_time: None,
        };
    }

    fn stop(&mut self, sched: &mut dyn FrameScheduler) {
        if let Phase::Scrolling { handle, .. } = self.phase {
            sched.cancel_frame(handle);
            tracing::debug!("scroll stopped ({:?})", handle);
        }
        self.phase = Phase::Idle;
    }
}

/// Non-negative remainder, strictly below `modulus`.
fn wrap(value: f64, modulus: f64) -> f64 {
    let r = value.rem_euclid(modulus);
    // rem_euclid can round up to the modulus for tiny negative inputs.
    if r >= modulus {
        0.0
    } else {
        r
    }
}

/// Scroll animators for every scrolling layer of a scene.
#[derive(Debug, Default)]
pub struct ScrollAnimators {
    animators: BTreeMap<LayerId, InfiniteScroll>,
}

impl ScrollAnimators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount animators for visible layers with uvScroll in effect, update
    /// their velocities, and unmount the rest.
    pub fn sync(&mut self, scene: &ProjectConfig, sched: &mut dyn FrameScheduler) {
        let mut wanted = BTreeMap::new();
        for layer in &scene.layers {
            if let Some(velocity) = resolve_layer(layer).and_then(|s| s.scroll) {
                wanted.insert(layer.id.clone(), velocity);
            }
        }

        self.animators.retain(|id, anim| {
            if wanted.contains_key(id) {
                true
            } else {
                anim.unmount(sched);
                false
            }
        });

        for (id, velocity) in wanted {
            let anim = self
                .animators
                .entry(id)
                .or_insert_with(|| InfiniteScroll::new(velocity));
            anim.set_velocity(velocity, sched);
            anim.mount(sched);
        }
    }

    /// Route a frame callback to the animator waiting on `handle`.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: FrameTime,
        tile: Size2D,
        sched: &mut dyn FrameScheduler,
    ) -> bool {
        self.animators
            .values_mut()
            .find(|a| a.pending_frame() == Some(handle))
            .map(|a| a.on_frame(handle, now, tile, sched))
            .unwrap_or(false)
    }

    /// Fire every due request of `sched` at each timestamp in turn.
    pub fn run_frames(
        &mut self,
        sched: &mut ManualScheduler,
        times: impl IntoIterator<Item = FrameTime>,
        tile: Size2D,
    ) {
        for now in times {
            for handle in sched.take_due() {
                self.on_frame(handle, now, tile, sched);
            }
        }
    }

    /// Unmount everything.
    pub fn clear(&mut self, sched: &mut dyn FrameScheduler) {
        for anim in self.animators.values_mut() {
            anim.unmount(sched);
        }
        self.animators.clear();
    }

    pub fn get(&self, id: &LayerId) -> Option<&InfiniteScroll> {
        self.animators.get(id)
    }

    /// Current grid offset of a layer, if it scrolls.
    pub fn offset(&self, id: &LayerId) -> Option<Point2D> {
        self.animators.get(id).map(InfiniteScroll::offset)
    }

    pub fn len(&self) -> usize {
        self.animators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animators.is_empty()
    }
}
