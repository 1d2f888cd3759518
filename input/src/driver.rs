//! Runs a [`GestureSurface`] on the tokio runtime.
use std::future;

use log::debug;
use tokio::{
    sync::mpsc::UnboundedReceiver,
    time::{self, Instant as TokioInstant},
};

use crate::{GestureSurface, Instant, ManualScheduler, SurfaceInput};

/// Feeds inputs from a channel into a surface and fires its timers in real time.
///
/// Timers use the tokio clock, so the driver follows tokio's paused time in tests.
#[derive(Debug)]
pub struct GestureDriver {
    surface: GestureSurface,
    scheduler: ManualScheduler,
}

impl GestureDriver {
    pub fn new(surface: GestureSurface) -> Self {
        Self {
            surface,
            scheduler: ManualScheduler::new(TokioInstant::now().into_std()),
        }
    }

    pub fn surface(&self) -> &GestureSurface {
        &self.surface
    }

    /// Access the surface, for example to subscribe.
    pub fn surface_mut(&mut self) -> &mut GestureSurface {
        &mut self.surface
    }

    /// The current time of the driver's clock, use this to timestamp samples.
    pub fn now() -> Instant {
        TokioInstant::now().into_std()
    }

    /// Processes inputs until all senders are dropped. Then cancels every session.
    ///
    /// Timers due before an input's timestamp fire before the input is handled.
    pub async fn run(&mut self, mut inputs: UnboundedReceiver<SurfaceInput>) {
        loop {
            let deadline = self.scheduler.next_deadline();
            tokio::select! {
                input = inputs.recv() => {
                    let Some(input) = input else {
                        debug!("{}: Input channel closed", self.surface.id());
                        self.surface.cancel_all(&mut self.scheduler);
                        return;
                    };
                    if let Some(time) = input.time() {
                        self.surface.advance(&mut self.scheduler, time);
                    }
                    self.surface.handle_input(&mut self.scheduler, input);
                }
                _ = sleep_until(deadline) => {
                    self.surface.advance(&mut self.scheduler, Self::now());
                }
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(TokioInstant::from_std(deadline)).await,
        None => future::pending().await,
    }
}
