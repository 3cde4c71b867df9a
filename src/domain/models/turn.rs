use serde::{Deserialize, Serialize};

/// One user-submitted chat input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub message_id: String,
    pub chat_id: String,
    pub content: String,
}

/// Latency/quality trade-off requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationMode {
    Speed,
    #[default]
    Balanced,
    Quality,
}

impl OptimizationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationMode::Speed => "speed",
            OptimizationMode::Balanced => "balanced",
            OptimizationMode::Quality => "quality",
        }
    }
}

impl std::fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OptimizationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "speed" => Ok(OptimizationMode::Speed),
            "balanced" => Ok(OptimizationMode::Balanced),
            "quality" => Ok(OptimizationMode::Quality),
            _ => Err(format!("Unknown optimization mode: {}", s)),
        }
    }
}

/// Speaker of a prior conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    Human,
    Assistant,
}

/// Prior conversation entry handed to answer handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub text: String,
}

impl HistoryEntry {
    /// Build from a wire `[role, text]` pair: `human` is the user, anything else the assistant
    pub fn from_pair(role: &str, text: impl Into<String>) -> Self {
        let role = if role == "human" {
            HistoryRole::Human
        } else {
            HistoryRole::Assistant
        };
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Optional provider/model override sent with a turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ModelSelection {
    pub fn new(provider: Option<&str>, name: Option<&str>) -> Self {
        Self {
            provider: provider.map(str::to_string),
            name: name.map(str::to_string),
        }
    }
}
