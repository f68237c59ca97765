use serde::{Deserialize, Serialize};

fn default_debounce_ms() -> u64 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Locator of the image to open on startup. Absence is valid: the
    /// viewer starts with an empty viewport.
    pub image_path: Option<String>,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Last known window size. If absent, a default size is used.
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
    /// Overlay redraw debounce in milliseconds. Clamped to 100 ms when
    /// consumed so drawing stays responsive.
    #[serde(default = "default_debounce_ms")]
    pub redraw_debounce_ms: u64,
    /// Whether the confidence heatmap overlay starts visible.
    #[serde(default)]
    pub show_heatmap: bool,
    /// Initial confidence value fed to the heatmap synthesizer.
    #[serde(default)]
    pub heatmap_intensity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_path: None,
            debug_logging: false,
            window_size: None,
            redraw_debounce_ms: default_debounce_ms(),
            show_heatmap: false,
            heatmap_intensity: 0.0,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let settings = Settings::load("/nonexistent/settings.json").unwrap();
        assert!(settings.image_path.is_none());
        assert_eq!(settings.redraw_debounce_ms, 50);
        assert!(!settings.show_heatmap);
    }

    #[test]
    fn partial_file_fills_remaining_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"image_path": "scan.png", "show_heatmap": true}"#).unwrap();
        let settings = Settings::load(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.image_path.as_deref(), Some("scan.png"));
        assert!(settings.show_heatmap);
        assert_eq!(settings.redraw_debounce_ms, 50);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            image_path: Some("a.png".into()),
            debug_logging: true,
            window_size: Some((800.0, 600.0)),
            redraw_debounce_ms: 80,
            show_heatmap: true,
            heatmap_intensity: 0.75,
        };
        settings.save(path.to_str().unwrap()).unwrap();
        let back = Settings::load(path.to_str().unwrap()).unwrap();
        assert_eq!(back.image_path.as_deref(), Some("a.png"));
        assert_eq!(back.redraw_debounce_ms, 80);
        assert_eq!(back.heatmap_intensity, 0.75);
    }
}
