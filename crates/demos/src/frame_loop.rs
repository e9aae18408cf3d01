use scenekit_render::Renderer;
use scenekit_tools::{FrameStats, StatsMode};
use std::time::Instant;

use crate::{Demo, DemoError};

/// Host-independent per-frame driver.
///
/// The host calls [`FrameLoop::tick`] once per display refresh and passes
/// its own scheduling primitive (a redraw request, a loop counter) as
/// `schedule`.
#[derive(Debug, Default)]
pub struct FrameLoop {
    stats: FrameStats,
}

impl FrameLoop {
    pub fn new(mode: StatsMode) -> Self {
        Self {
            stats: FrameStats::new(mode),
        }
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Run one frame: refresh stats, step the demo, schedule the next frame,
    /// then draw.
    ///
    /// A failed step returns before `schedule` runs, so the host loop stops.
    pub fn tick<D, R>(
        &mut self,
        demo: &mut D,
        renderer: &mut R,
        schedule: impl FnOnce(),
    ) -> Result<R::Output, DemoError>
    where
        D: Demo + ?Sized,
        R: Renderer + ?Sized,
    {
        self.stats.update(Instant::now());
        if let Err(err) = demo.step() {
            tracing::error!(%err, frame = self.stats.frames(), "animation step failed");
            return Err(err);
        }
        schedule();
        let ctx = demo.context();
        Ok(renderer.render(&ctx.scene, &ctx.camera))
    }

    /// Drive `frames` frames back to back, handing each output to `on_frame`.
    pub fn run<D, R>(
        &mut self,
        demo: &mut D,
        renderer: &mut R,
        frames: u64,
        mut on_frame: impl FnMut(u64, R::Output),
    ) -> Result<(), DemoError>
    where
        D: Demo + ?Sized,
        R: Renderer + ?Sized,
    {
        let mut scheduled = 0u64;
        while scheduled < frames {
            let frame = scheduled;
            let output = self.tick(demo, renderer, || scheduled += 1)?;
            on_frame(frame, output);
        }
        Ok(())
    }
}
