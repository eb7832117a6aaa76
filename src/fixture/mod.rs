use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::hue::model::{LightMetadata, LightsSnapshot};
use crate::midi::registry::model::Parameter;

/// Channel value every fixture starts from.
pub const MID_SCALE: u8 = 127;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fixture {
    pub name: String,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Fixture {
    pub fn new(name: impl Into<String>) -> Fixture {
        Fixture {
            name: name.into(),
            r: MID_SCALE,
            g: MID_SCALE,
            b: MID_SCALE,
        }
    }

    pub fn channel(&self, parameter: Parameter) -> u8 {
        match parameter {
            Parameter::R => self.r,
            Parameter::G => self.g,
            Parameter::B => self.b,
        }
    }

    pub fn set_channel(&mut self, parameter: Parameter, value: u8) {
        let channel = match parameter {
            Parameter::R => &mut self.r,
            Parameter::G => &mut self.g,
            Parameter::B => &mut self.b,
        };
        *channel = value;
    }
}

/// Bridge light id. Numeric ids order by value, so light 10 follows light 9.
#[derive(Clone, Debug, PartialEq, Eq)]
struct LightId(String);

impl LightId {
    fn number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for LightId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.number(), other.number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for LightId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Color state of every controllable light, keyed by bridge light id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixtureRegistry(BTreeMap<LightId, Fixture>);

impl FixtureRegistry {
    /// Keeps the color capable lights of a bridge listing, all at mid scale.
    pub fn build(lights: &LightsSnapshot) -> FixtureRegistry {
        let fixtures = lights
            .iter()
            .filter_map(|(id, raw)| {
                match serde_json::from_value::<LightMetadata>(raw.clone()) {
                    Ok(light) if light.supports_color() => {
                        Some((LightId(id.clone()), Fixture::new(light.name)))
                    }
                    Ok(light) => {
                        tracing::debug!("skipping light {} ({}): no color support", id, light.name);
                        None
                    }
                    Err(err) => {
                        tracing::warn!("skipping light {}: unreadable metadata: {}", id, err);
                        None
                    }
                }
            })
            .collect();
        FixtureRegistry(fixtures)
    }

    pub fn get(&self, id: &str) -> Option<&Fixture> {
        self.0.get(&LightId(id.to_string()))
    }

    /// Returns false when the id is unknown.
    pub fn set(&mut self, id: &str, parameter: Parameter, value: u8) -> bool {
        match self.0.get_mut(&LightId(id.to_string())) {
            Some(fixture) => {
                fixture.set_channel(parameter, value);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Lights in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fixture)> {
        self.0.iter().map(|(id, fixture)| (id.0.as_str(), fixture))
    }
}
