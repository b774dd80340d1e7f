use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Flavour of the luck wheel mini-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WheelKind {
    /// Wheel of good luck.
    Good,
    /// Wheel of bad luck.
    Bad,
}

/// Wheel currently shown on displays and the outcome of its last spin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelState {
    /// Which wheel is shown.
    pub kind: WheelKind,
    /// Effect picked by the last spin, if the wheel was spun.
    pub result: Option<String>,
}

/// Effects each wheel can land on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WheelEffects {
    /// Good-luck outcomes.
    #[serde(default)]
    pub good: Vec<String>,
    /// Bad-luck outcomes.
    #[serde(default)]
    pub bad: Vec<String>,
}

impl WheelEffects {
    /// Effects available for `kind`.
    pub fn for_kind(&self, kind: WheelKind) -> &[String] {
        match kind {
            WheelKind::Good => &self.good,
            WheelKind::Bad => &self.bad,
        }
    }
}
