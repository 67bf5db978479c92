//! Shrink-to-fit heuristic for translated text.
//!
//! Translations are often longer than the source. There is no text
//! measurement here: a shape is deemed overfull when it holds a lot of text
//! in a narrow box, and the whole slide's fonts are then scaled down.

/// Thresholds and scaling factors for font shrinking.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFitPolicy {
    /// Shapes with more characters than this are candidates.
    pub max_chars: usize,
    /// Candidates narrower than this (inches) trigger scaling.
    pub min_width_in: f64,
    /// Width assumed for shapes that do not declare one (inches).
    pub default_width_in: f64,
    /// Factor applied to every run's size.
    pub scale: f64,
    /// Size assumed for runs without an explicit size (points).
    pub default_size_pt: f64,
    /// Sizes never go below this (points).
    pub min_size_pt: f64,
}

impl Default for FontFitPolicy {
    fn default() -> Self {
        Self {
            max_chars: 200,
            min_width_in: 5.0,
            default_width_in: 10.0,
            scale: 0.8,
            default_size_pt: 18.0,
            min_size_pt: 7.5,
        }
    }
}

impl FontFitPolicy {
    /// Create the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scaling factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Whether a shape with `text_len` characters and the given width needs
    /// its slide scaled down.
    pub fn needs_scaling(&self, text_len: usize, width_in: Option<f64>) -> bool {
        let width = width_in.unwrap_or(self.default_width_in);
        text_len > self.max_chars && width < self.min_width_in
    }

    /// New size in points for a run currently at `current_pt`.
    pub fn scaled_size(&self, current_pt: Option<f64>) -> f64 {
        let current = current_pt.unwrap_or(self.default_size_pt);
        (current * self.scale).max(self.min_size_pt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_text_in_narrow_shape() {
        let policy = FontFitPolicy::new();
        assert!(policy.needs_scaling(201, Some(4.9)));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let policy = FontFitPolicy::new();
        assert!(!policy.needs_scaling(200, Some(2.0)));
        assert!(!policy.needs_scaling(500, Some(5.0)));
    }

    #[test]
    fn test_missing_width_uses_default() {
        let policy = FontFitPolicy::new();
        assert!(!policy.needs_scaling(1000, None));
    }

    #[test]
    fn test_scaled_size() {
        let policy = FontFitPolicy::new();
        assert!((policy.scaled_size(Some(20.0)) - 16.0).abs() < 1e-9);
        assert!((policy.scaled_size(None) - 14.4).abs() < 1e-9);
        assert!((policy.scaled_size(Some(8.0)) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_custom_scale() {
        let policy = FontFitPolicy::new().with_scale(0.5);
        assert!((policy.scaled_size(Some(30.0)) - 15.0).abs() < 1e-9);
    }
}
