//! Built-in preset durations

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub emoji: &'static str,
    pub label: &'static str,
    pub seconds: i64,
}

pub const DEFAULT_PRESETS: [Preset; 7] = [
    Preset { id: "fast30", emoji: "⏱️", label: "Quick", seconds: 30 },
    Preset { id: "pom1", emoji: "🍅", label: "Pomodoro", seconds: 60 },
    Preset { id: "rest2", emoji: "☕", label: "Break", seconds: 120 },
    Preset { id: "fit5", emoji: "🏃", label: "Workout", seconds: 300 },
    Preset { id: "study10", emoji: "📚", label: "Study", seconds: 600 },
    Preset { id: "med15", emoji: "🧘", label: "Meditation", seconds: 900 },
    Preset { id: "cook60", emoji: "🍳", label: "Cooking", seconds: 3600 },
];

/// Look a preset up by id
pub fn find(id: &str) -> Option<&'static Preset> {
    DEFAULT_PRESETS.iter().find(|preset| preset.id == id)
}

/// Label of the first preset with exactly this duration
pub fn label_for(seconds: i64) -> Option<&'static str> {
    DEFAULT_PRESETS
        .iter()
        .find(|preset| preset.seconds == seconds)
        .map(|preset| preset.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(find("pom1").map(|p| p.seconds), Some(60));
        assert!(find("nope").is_none());
        assert_eq!(label_for(300), Some("Workout"));
        assert_eq!(label_for(301), None);
    }
}
