use pip_geom::Rect;
use serde::Deserialize;

/// Parameters an app declares when requesting picture-in-picture.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipParams {
    /// Requested aspect ratio (width / height); clamped by the config.
    pub aspect_ratio: Option<f32>,
    /// Region of the task, in display coordinates, that holds the PiP content.
    pub source_rect_hint: Option<Rect>,
    /// When true the app redraws smoothly on resize and no overlay fade is
    /// needed to hide the relayout.
    pub seamless_resize: bool,
    /// Enter automatically when the user leaves the app.
    pub auto_enter: bool,
}

impl Default for PipParams {
    fn default() -> Self {
        Self {
            aspect_ratio: None,
            source_rect_hint: None,
            seamless_resize: true,
            auto_enter: false,
        }
    }
}

impl PipParams {
    /// Builder-style aspect ratio override.
    #[must_use]
    pub fn with_aspect_ratio(mut self, ratio: f32) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }

    /// Builder-style source hint.
    #[must_use]
    pub fn with_source_rect_hint(mut self, hint: Rect) -> Self {
        self.source_rect_hint = Some(hint);
        self
    }

    /// Builder-style seamless resize flag.
    #[must_use]
    pub fn with_seamless_resize(mut self, seamless: bool) -> Self {
        self.seamless_resize = seamless;
        self
    }
}
