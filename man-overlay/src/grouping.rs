use man_core::measurement::Measurement;
use serde::Serialize;
use std::collections::HashMap;

/// One render group: indices into the fetched measurement slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteGroup {
    pub site: String,
    pub indices: Vec<usize>,
}

/// Measurements partitioned by site.
///
/// Groups appear in the order their site was first seen; indices within a
/// group keep arrival order and are not sorted by date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteGroups {
    groups: Vec<SiteGroup>,
    #[serde(skip)]
    position: HashMap<String, usize>,
}

impl SiteGroups {
    pub fn build(measurements: &[Measurement]) -> Self {
        let mut groups = SiteGroups::default();
        for (idx, m) in measurements.iter().enumerate() {
            let slot = match groups.position.get(&m.site) {
                Some(slot) => *slot,
                None => {
                    groups.groups.push(SiteGroup {
                        site: m.site.clone(),
                        indices: Vec::new(),
                    });
                    let slot = groups.groups.len() - 1;
                    groups.position.insert(m.site.clone(), slot);
                    slot
                }
            };
            groups.groups[slot].indices.push(idx);
        }
        groups
    }

    pub fn get(&self, site: &str) -> Option<&SiteGroup> {
        self.position.get(site).map(|slot| &self.groups[*slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiteGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.position.clear();
    }
}
