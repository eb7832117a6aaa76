use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::midi::model::DataByte;
use crate::midi::registry::model::ParameterBinding;

/// Controller number to the fixture channels it drives.
/// Bindings under one controller keep the order they were added in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable(BTreeMap<DataByte, Vec<ParameterBinding>>);

impl RoutingTable {
    pub fn new() -> RoutingTable {
        RoutingTable::default()
    }

    pub fn bind(&mut self, controller: DataByte, binding: ParameterBinding) {
        self.0.entry(controller).or_default().push(binding);
    }

    pub fn bindings_for(&self, controller: DataByte) -> &[ParameterBinding] {
        self.0.get(&controller).map(Vec::as_slice).unwrap_or_default()
    }

    /// Bindings whose fixture is not known to `is_known`.
    pub fn dangling<'a, F>(&'a self, is_known: F) -> impl Iterator<Item = &'a ParameterBinding>
    where
        F: Fn(&str) -> bool + 'a,
    {
        self.0
            .values()
            .flatten()
            .filter(move |binding| !is_known(&binding.fixture_id))
    }
}
