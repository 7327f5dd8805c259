//! Unit of measure for order items.

use serde::{Deserialize, Serialize};

/// Unit of measure for a requested or produced quantity.
///
/// The well-known codes are `UN` (units), `KG` and `LT`. Any other code is
/// kept verbatim so that new units can be entered without a migration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    /// Units (pieces).
    #[default]
    Un,
    /// Kilograms.
    Kg,
    /// Liters.
    Lt,
    /// Any other unit code, upper-cased.
    Other(String),
}

impl Unit {
    /// The unit code as stored and displayed.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Un => "UN",
            Self::Kg => "KG",
            Self::Lt => "LT",
            Self::Other(code) => code,
        }
    }
}

impl From<&str> for Unit {
    fn from(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        match code.as_str() {
            "" | "UN" => Self::Un,
            "KG" => Self::Kg,
            "LT" => Self::Lt,
            _ => Self::Other(code),
        }
    }
}

impl From<String> for Unit {
    fn from(code: String) -> Self {
        Self::from(code.as_str())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.code().to_string()
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
