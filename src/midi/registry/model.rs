use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Color channel of a fixture that a controller can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    R,
    G,
    B,
}

impl Parameter {
    /// Order in which channels are bound during setup.
    pub const ALL: [Parameter; 3] = [Parameter::R, Parameter::G, Parameter::B];
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Parameter::R => "R",
            Parameter::G => "G",
            Parameter::B => "B",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterBinding {
    #[serde(alias = "id")]
    pub fixture_id: String,
    pub parameter: Parameter,
}

impl ParameterBinding {
    pub fn new(fixture_id: impl Into<String>, parameter: Parameter) -> ParameterBinding {
        ParameterBinding {
            fixture_id: fixture_id.into(),
            parameter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_accepts_legacy_id_key() {
        let binding: ParameterBinding =
            serde_json::from_str(r#"{"id": "3", "parameter": "g"}"#).unwrap();
        assert_eq!(binding, ParameterBinding::new("3", Parameter::G));
    }

    #[test]
    fn binding_serializes_camel_case() {
        let json = serde_json::to_value(ParameterBinding::new("1", Parameter::B)).unwrap();
        assert_eq!(json, serde_json::json!({"fixtureId": "1", "parameter": "b"}));
    }
}
