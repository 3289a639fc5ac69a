use crate::error::SceneError;
use crate::sim::body::{BodyId, BodyRegistry};
use crate::sim::scene::SpeedSink;
use serde::{Deserialize, Serialize};

// -------------------- Parsing --------------------
/// Reads the longest leading number in `text`, or NaN if there is none.
///
/// Leading whitespace is skipped and trailing garbage is ignored, so `"0.25x"`
/// reads as 0.25 while `"abc"` and `""` read as NaN.
pub fn parse_speed(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    if s[i..].starts_with("Infinity") {
        return if bytes.first() == Some(&b'-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            i = j;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    // exponent only counts when it has digits
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    s[..i].parse::<f64>().unwrap_or(f64::NAN)
}

pub fn format_speed(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value}")
    }
}

// -------------------- Sliders --------------------
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SliderRange {
    fn default() -> Self {
        Self { min: -1.0, max: 1.0, step: 0.01 }
    }
}

/// A numeric range input bound to one planet. Holds its value as text.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedSlider {
    pub body: BodyId,
    pub text: String,
    pub value: f64,
}

impl SpeedSlider {
    /// Position of the value inside `range`, in [0, 1]. `None` for NaN.
    pub fn fraction(&self, range: &SliderRange) -> Option<f64> {
        if self.value.is_nan() || range.max <= range.min {
            return None;
        }
        Some(((self.value - range.min) / (range.max - range.min)).clamp(0.0, 1.0))
    }
}

/// One slider per planet plus a selection cursor and an optional text editor.
#[derive(Clone, Debug)]
pub struct SpeedControlSurface {
    range: SliderRange,
    sliders: Vec<SpeedSlider>,
    selected: usize,
    editing: Option<String>,
}

impl SpeedControlSurface {
    pub fn new(registry: &BodyRegistry, range: SliderRange) -> Self {
        let sliders = registry
            .planets()
            .filter_map(|p| {
                p.revolution_speed().map(|v| SpeedSlider {
                    body: p.id(),
                    text: format_speed(v),
                    value: v,
                })
            })
            .collect();
        Self { range, sliders, selected: 0, editing: None }
    }

    pub fn range(&self) -> &SliderRange {
        &self.range
    }

    pub fn sliders(&self) -> &[SpeedSlider] {
        &self.sliders
    }

    pub fn slider(&self, id: BodyId) -> Option<&SpeedSlider> {
        self.sliders.iter().find(|s| s.body == id)
    }

    pub fn selected(&self) -> BodyId {
        self.sliders[self.selected].body
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Input event on the control for `id`: parse `text` and forward it.
    pub fn input<S: SpeedSink>(&mut self, id: BodyId, text: &str, sink: &mut S) -> Result<f64, SceneError> {
        let idx = self
            .sliders
            .iter()
            .position(|s| s.body == id)
            .ok_or(SceneError::NotRevolvable(id))?;
        let value = parse_speed(text);
        sink.set_revolution_speed(id, value)?;

        let slider = &mut self.sliders[idx];
        slider.text = text.to_string();
        slider.value = value;
        if value.is_nan() {
            tracing::warn!(body = %id, input = text, "revolution speed is not a number");
        } else {
            tracing::info!(body = %id, value, "revolution speed updated");
        }
        Ok(value)
    }

    // -------------------- Selection --------------------
    pub fn select(&mut self, id: BodyId) {
        if let Some(i) = self.sliders.iter().position(|s| s.body == id) {
            self.selected = i;
            self.editing = None;
        }
    }

    pub fn select_offset(&mut self, delta: i32) {
        let len = self.sliders.len() as i32;
        if len == 0 {
            return;
        }
        self.selected = (self.selected as i32 + delta).rem_euclid(len) as usize;
        self.editing = None;
    }

    /// Moves the selected slider by `steps` range steps, clamped to the range.
    pub fn nudge<S: SpeedSink>(&mut self, steps: i32, sink: &mut S) -> Result<f64, SceneError> {
        let current = self.sliders[self.selected].value;
        let base = if current.is_nan() { 0.0 } else { current };
        let next = (base + steps as f64 * self.range.step).max(self.range.min).min(self.range.max);
        // print to the step's precision so the text carries no float noise
        let decimals = (-self.range.step.log10()).ceil().clamp(0.0, 12.0) as usize;
        let text = format!("{next:.decimals$}");
        self.input(self.selected(), &text, sink)
    }

    pub fn zero<S: SpeedSink>(&mut self, sink: &mut S) -> Result<f64, SceneError> {
        self.input(self.selected(), "0", sink)
    }

    // -------------------- Text entry --------------------
    pub fn begin_edit(&mut self) {
        self.editing = Some(String::new());
    }

    pub fn edit_push(&mut self, ch: char) {
        const EDIT_MAX: usize = 24;
        if let Some(buf) = self.editing.as_mut() {
            if buf.len() < EDIT_MAX {
                buf.push(ch);
            }
        }
    }

    pub fn edit_backspace(&mut self) {
        if let Some(buf) = self.editing.as_mut() {
            buf.pop();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Sends the edited text through the same path as any other input.
    pub fn commit_edit<S: SpeedSink>(&mut self, sink: &mut S) -> Result<Option<f64>, SceneError> {
        match self.editing.take() {
            Some(text) => self.input(self.selected(), &text, sink).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::SceneState;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parse_accepts_plain_numbers() {
        assert_eq!(parse_speed("0.25"), 0.25);
        assert_eq!(parse_speed("-3"), -3.0);
        assert_eq!(parse_speed("+.5"), 0.5);
        assert_eq!(parse_speed("1e-2"), 0.01);
        assert_eq!(parse_speed("  7."), 7.0);
    }

    #[test]
    fn parse_takes_the_leading_number_only() {
        assert_eq!(parse_speed("0.25abc"), 0.25);
        assert_eq!(parse_speed("12e"), 12.0);
        assert_eq!(parse_speed("3e+"), 3.0);
        assert_eq!(parse_speed("1.5.2"), 1.5);
    }

    #[test]
    fn parse_yields_nan_without_a_number() {
        for t in ["abc", "", "   ", ".", "-", "e5", "nan", "inf"] {
            assert!(parse_speed(t).is_nan(), "{t:?}");
        }
    }

    #[test]
    fn parse_reads_infinity() {
        assert_eq!(parse_speed("Infinity"), f64::INFINITY);
        assert_eq!(parse_speed("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn sliders_start_at_default_speeds() {
        let scene = SceneState::default();
        let surface = SpeedControlSurface::new(scene.bodies(), SliderRange::default());
        assert_eq!(surface.sliders().len(), 8);
        let earth = surface.slider(BodyId::Earth).unwrap();
        assert_eq!(earth.value, 0.1);
        assert_eq!(earth.text, "0.1");
        assert!(surface.slider(BodyId::Sun).is_none());
        assert_eq!(surface.selected(), BodyId::Mercury);
    }

    #[test]
    fn nudge_steps_and_clamps() {
        let mut scene = SceneState::default();
        let mut surface = SpeedControlSurface::new(scene.bodies(), SliderRange::default());
        surface.select(BodyId::Earth);
        let v = surface.nudge(5, &mut scene).unwrap();
        assert_abs_diff_eq!(v, 0.15, epsilon = 1e-12);
        let v = surface.nudge(1000, &mut scene).unwrap();
        assert_eq!(v, 1.0);
        assert_eq!(scene.bodies().get(BodyId::Earth).revolution_speed(), Some(1.0));
    }

    #[test]
    fn nudge_recovers_from_nan() {
        let mut scene = SceneState::default();
        let mut surface = SpeedControlSurface::new(scene.bodies(), SliderRange::default());
        surface.input(BodyId::Mercury, "junk", &mut scene).unwrap();
        let v = surface.nudge(-2, &mut scene).unwrap();
        assert_abs_diff_eq!(v, -0.02, epsilon = 1e-12);
    }

    #[test]
    fn nudge_on_inverted_range_does_not_panic() {
        let mut scene = SceneState::default();
        let range = SliderRange { min: 1.0, max: -1.0, step: 0.01 };
        let mut surface = SpeedControlSurface::new(scene.bodies(), range);
        let v = surface.nudge(1, &mut scene).unwrap();
        assert!(v.is_finite());
        assert_eq!(scene.bodies().get(BodyId::Mercury).revolution_speed(), Some(v));
    }

    #[test]
    fn edit_commit_goes_through_parse() {
        let mut scene = SceneState::default();
        let mut surface = SpeedControlSurface::new(scene.bodies(), SliderRange::default());
        surface.select(BodyId::Saturn);
        surface.begin_edit();
        for ch in "-0.3".chars() {
            surface.edit_push(ch);
        }
        surface.edit_backspace();
        surface.edit_push('4');
        assert_eq!(surface.commit_edit(&mut scene).unwrap(), Some(-0.4));
        assert_eq!(scene.bodies().get(BodyId::Saturn).revolution_speed(), Some(-0.4));
        assert!(surface.editing().is_none());
        assert_eq!(surface.commit_edit(&mut scene).unwrap(), None);
    }

    #[test]
    fn selection_wraps() {
        let scene = SceneState::default();
        let mut surface = SpeedControlSurface::new(scene.bodies(), SliderRange::default());
        surface.select_offset(-1);
        assert_eq!(surface.selected(), BodyId::Neptune);
        surface.select_offset(2);
        assert_eq!(surface.selected(), BodyId::Venus);
    }
}
