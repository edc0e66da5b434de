use serde::Serialize;

use crate::database::models::{ProductSpec, SpecGroup};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecTableGroup {
    pub group_name: String,
    pub specs: Vec<SpecEntry>,
}

/// Pair each product spec value with the name its group template gives it.
/// Values beyond the template get an empty name; specs whose group no
/// longer exists are left out.
pub fn build_spec_table(specs: &[ProductSpec], groups: &[SpecGroup]) -> Vec<SpecTableGroup> {
    specs
        .iter()
        .filter_map(|spec| {
            let group = groups.iter().find(|g| g.id == spec.spec_group_id)?;
            let entries = spec
                .spec_values
                .iter()
                .enumerate()
                .map(|(index, value)| SpecEntry {
                    name: group.specs.get(index).cloned().unwrap_or_default(),
                    value: value.clone(),
                })
                .collect();

            Some(SpecTableGroup {
                group_name: group.title.clone(),
                specs: entries,
            })
        })
        .collect()
}
