//! Scenario files: a display, a task and a list of steps, in RON.
//!
//! ```ron
//! Scenario(
//!     task: (bounds: (x: 0.0, y: 0.0, w: 1080.0, h: 2400.0)),
//!     steps: [enter, deliver, advance(400), expand, deliver, advance(400)],
//! )
//! ```

use std::{
    fmt::{self, Display},
    fs,
    path::{Path, PathBuf},
};

use pip_bounds::{DisplayLayout, PipParams};
use pip_geom::Rect;
use pip_ids::{ComponentId, ContainerToken, TaskId};
use pip_transitions::{PipTask, TaskInfo};
use serde::Deserialize;

use crate::{Error, Result};

/// Task moved into PiP by the `enter` step.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    /// Task id.
    #[serde(default = "default_task_id")]
    pub task_id: i32,
    /// Bounds before entering PiP.
    pub bounds: Rect,
    /// Requested aspect ratio.
    #[serde(default)]
    pub aspect_ratio: Option<f32>,
    /// Source hint rectangle.
    #[serde(default)]
    pub source_rect_hint: Option<Rect>,
    /// Whether resizes are seamless.
    #[serde(default = "default_true")]
    pub seamless_resize: bool,
    /// The previous parent task is hosted in split screen.
    #[serde(default)]
    pub last_parent_in_split: bool,
}

/// Default task id.
fn default_task_id() -> i32 {
    1
}

/// Serde default for flags that start enabled.
fn default_true() -> bool {
    true
}

/// Id given to the previous parent task.
const PARENT_TASK_ID: i32 = 1000;

impl TaskSpec {
    /// The simulated previous parent's id.
    pub fn parent_task(&self) -> TaskId {
        TaskId::new(PARENT_TASK_ID)
    }

    /// PiP parameters for this task.
    pub fn params(&self) -> PipParams {
        let mut params = PipParams::default().with_seamless_resize(self.seamless_resize);
        if let Some(ratio) = self.aspect_ratio {
            params = params.with_aspect_ratio(ratio);
        }
        if let Some(hint) = self.source_rect_hint {
            params = params.with_source_rect_hint(hint);
        }
        params
    }

    /// Task handed to the scheduler, on `layout`'s display.
    pub fn to_task(&self, layout: &DisplayLayout) -> PipTask {
        PipTask {
            token: ContainerToken::new(u64::from(self.task_id.unsigned_abs())),
            info: TaskInfo {
                task_id: TaskId::new(self.task_id),
                component: ComponentId::new("pipctl", format!("Task{}", self.task_id)),
                display: layout.id,
                bounds: self.bounds,
                last_parent_task: Some(self.parent_task()),
                params: self.params(),
            },
        }
    }
}

/// One scenario step.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Request entry into PiP.
    Enter,
    /// Request an animated resize.
    Resize {
        /// Destination bounds.
        bounds: Rect,
        /// Defer the configuration change to the end of the transition.
        #[serde(default)]
        config_at_end: bool,
        /// Animation duration override (ms).
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    /// Live-drag resize.
    UserResize {
        /// Target bounds.
        bounds: Rect,
        /// Rotation about the centre, in degrees.
        #[serde(default)]
        rotation: f32,
    },
    /// Commit settled bounds.
    FinishResize(Rect),
    /// Request an expand.
    Expand,
    /// Request a dismissal.
    Remove {
        /// Fade out first.
        #[serde(default)]
        fade: bool,
    },
    /// Hand the oldest pending transition its geometry.
    Deliver,
    /// Merge a new transition into the last delivered one.
    Merge,
    /// Drop the oldest pending transition.
    Abort,
    /// Let the frame pump run for this many milliseconds.
    Advance(u64),
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Enter => "enter",
            Self::Resize { .. } => "resize",
            Self::UserResize { .. } => "user_resize",
            Self::FinishResize(_) => "finish_resize",
            Self::Expand => "expand",
            Self::Remove { .. } => "remove",
            Self::Deliver => "deliver",
            Self::Merge => "merge",
            Self::Abort => "abort",
            Self::Advance(_) => "advance",
        };
        f.write_str(s)
    }
}

/// A complete scenario.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Display hosting PiP.
    #[serde(default)]
    pub display: DisplayLayout,
    /// Report desktop mode as active.
    #[serde(default)]
    pub desktop_mode: bool,
    /// The task.
    pub task: TaskSpec,
    /// Steps in order.
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parse a scenario from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        parse(text, Path::new("<inline>"))
    }

    /// Load a scenario from a `.ron` file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        parse(&text, path)
    }
}

/// Parse `text`, attributing errors to `path`.
fn parse(text: &str, path: &Path) -> Result<Scenario> {
    ron::from_str(text).map_err(|err| Error::Scenario {
        path: PathBuf::from(path),
        message: format!(
            "{} at {}:{}",
            err.code, err.span.start.line, err.span.start.col
        ),
    })
}
