//! Replays a pointer scenario and prints the classified gestures as JSON lines.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example trace -- scenario.toml
//! ```
//!
//! Without an argument, a built-in scenario is replayed.
use std::{env, fs, time::Duration};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::json;
use tactile_geometry::Point;
use tactile_input::{
    GestureConfig, GestureKinds, GestureSurface, Instant, ManualScheduler, PointerId,
    PointerInput, PointerSample, SurfaceId, SurfaceInput, WheelInput,
};

const BUILTIN_SCENARIO: &str = r#"
# A click, a double click, and a short drag.
[[step]]
at_ms = 0
event = "down"

[[step]]
at_ms = 80
event = "up"

[[step]]
at_ms = 1000
event = "down"

[[step]]
at_ms = 1060
event = "up"

[[step]]
at_ms = 1120
event = "down"

[[step]]
at_ms = 1150
event = "up"

[[step]]
at_ms = 2000
event = "down"
x = 10.0
y = 10.0

[[step]]
at_ms = 2300
event = "move"
x = 25.0
y = 12.0

[[step]]
at_ms = 2700
event = "up"
x = 25.0
y = 12.0

[[step]]
at_ms = 3000
event = "wheel"
y = -120.0
"#;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Scenario {
    #[serde(default)]
    config: GestureConfig,
    /// Where to stop replaying, defaults to one second after the last step.
    until_ms: Option<u64>,
    #[serde(rename = "step", default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Step {
    at_ms: u64,
    #[serde(default = "default_pointer")]
    pointer: u64,
    event: StepEvent,
    /// The position, or the wheel delta for wheel steps.
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

fn default_pointer() -> u64 {
    1
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StepEvent {
    Down,
    Move,
    Up,
    Leave,
    Enter,
    Wheel,
    Cancel,
}

impl Step {
    fn to_input(&self, t0: Instant) -> SurfaceInput {
        let sample = PointerSample::new(
            Point::new(self.x, self.y),
            t0 + Duration::from_millis(self.at_ms),
        );
        let pointer = PointerId(self.pointer);
        let input = match self.event {
            StepEvent::Down => PointerInput::Down(sample),
            StepEvent::Move => PointerInput::Move(sample),
            StepEvent::Up => PointerInput::Up(sample),
            StepEvent::Leave => PointerInput::Leave(sample),
            StepEvent::Enter => PointerInput::Enter(sample),
            StepEvent::Wheel => {
                return SurfaceInput::Wheel {
                    sample: PointerSample::new(Point::ZERO, sample.time),
                    input: WheelInput::Pixels {
                        x: self.x,
                        y: self.y,
                    },
                };
            }
            StepEvent::Cancel => return SurfaceInput::Cancel(pointer),
        };
        SurfaceInput::Pointer { pointer, input }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let scenario = match env::args().nth(1) {
        Some(path) => {
            fs::read_to_string(&path).with_context(|| format!("Failed to read `{path}`"))?
        }
        None => BUILTIN_SCENARIO.to_string(),
    };
    let scenario: Scenario = toml::from_str(&scenario).context("Invalid scenario")?;
    scenario.config.validate()?;

    if scenario
        .steps
        .windows(2)
        .any(|pair| pair[1].at_ms < pair[0].at_ms)
    {
        bail!("Scenario steps must be ordered by `at_ms`");
    }

    let t0 = Instant::now();
    let mut scheduler = ManualScheduler::new(t0);
    let mut surface = GestureSurface::new(SurfaceId(1), scenario.config);
    surface.subscribe(GestureKinds::all(), move |event| {
        let at_ms = event.sample.time.duration_since(t0).as_millis() as u64;
        println!(
            "{}",
            json!({
                "at_ms": at_ms,
                "pos": event.sample.pos,
                "gesture": event.gesture,
            })
        );
    });

    for step in &scenario.steps {
        let input = step.to_input(t0);
        if let Some(time) = input.time() {
            surface.advance(&mut scheduler, time);
        }
        surface.handle_input(&mut scheduler, input);
    }

    let last = scenario.steps.last().map(|s| s.at_ms).unwrap_or_default();
    let until = scenario.until_ms.unwrap_or(last + 1000);
    surface.advance(&mut scheduler, t0 + Duration::from_millis(until));
    surface.cancel_all(&mut scheduler);

    Ok(())
}
