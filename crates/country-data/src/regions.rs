//! # UN M.49 Regions
//!
//! A read-only region tree parsed from the embedded `data/un-m49.yaml`.
//! Region codes and country codes share the M.49 numeric space: a member
//! of a region is either another region or the ISO 3166-1 numeric code of
//! a country.
//!
//! ## Structure
//!
//! - `regions` form a strict tree rooted at World (`001`). Every member has
//!   exactly one parent, which is what [`RegionTable::parent`] and
//!   [`RegionTable::parents`] walk.
//! - `groupings` (North America, `003`) overlap the tree. They have names
//!   and members and answer [`RegionTable::is_subdivision_of`] and
//!   [`RegionTable::subdivisions`], but are never anybody's parent.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use country_core::{DataIntegrityError, TranslatableName};
use serde::{Deserialize, Serialize};

use crate::dataset::{self, BaseTable};

const UN_M49: &str = include_str!("../data/un-m49.yaml");
const UN_M49_NAME: &str = "un-m49.yaml";

/// An M.49 numeric code (region or country).
pub type RegionCode = u16;

/// A named region and its direct members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    code: RegionCode,
    name: TranslatableName,
    members: Vec<RegionCode>,
    grouping: bool,
}

impl Region {
    pub fn code(&self) -> RegionCode {
        self.code
    }

    pub fn name(&self) -> &TranslatableName {
        &self.name
    }

    /// Direct members, in document order.
    pub fn members(&self) -> &[RegionCode] {
        &self.members
    }

    /// True for an overlapping aggregate outside the parent tree.
    pub fn is_grouping(&self) -> bool {
        self.grouping
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegions {
    regions: Vec<RawRegion>,
    #[serde(default)]
    groupings: Vec<RawRegion>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegion {
    code: u16,
    name: Option<String>,
    #[serde(default)]
    members: Vec<u16>,
}

/// The validated region tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTable {
    regions: BTreeMap<RegionCode, Region>,
    parents: BTreeMap<RegionCode, RegionCode>,
}

impl RegionTable {
    /// Parse and validate a region document against the countries of
    /// `base`.
    ///
    /// # Errors
    ///
    /// Returns [`DataIntegrityError`] for unparseable YAML, a nameless or
    /// out-of-range region, a region or tree member listed twice, a member
    /// that is neither a region nor a country numeric code in `base`, and
    /// a cycle in the parent tree.
    pub fn from_yaml_str(
        source: &str,
        source_name: &str,
        base: &BaseTable,
    ) -> Result<Self, DataIntegrityError> {
        let raw: RawRegions = serde_yaml::from_str(source).map_err(|e| DataIntegrityError::Parse {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;

        let tree_len = raw.regions.len();
        let mut regions = BTreeMap::new();
        let rows = raw
            .regions
            .into_iter()
            .map(|r| (r, false))
            .chain(raw.groupings.into_iter().map(|r| (r, true)));
        for (row, (region, grouping)) in rows.enumerate() {
            if region.code == 0 || region.code > 999 {
                return Err(DataIntegrityError::InvalidValue {
                    row,
                    field: "code",
                    value: region.code.to_string(),
                });
            }
            let name = region
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .ok_or(DataIntegrityError::MissingField { row, field: "name" })?;
            if regions.contains_key(&region.code) {
                return Err(DataIntegrityError::Duplicate {
                    row,
                    field: "code",
                    value: region.code.to_string(),
                });
            }
            regions.insert(
                region.code,
                Region {
                    code: region.code,
                    name: TranslatableName::new(name),
                    members: region.members,
                    grouping,
                },
            );
        }

        let mut parents = BTreeMap::new();
        for (row, region) in regions.values().filter(|r| !r.grouping).enumerate() {
            for &member in &region.members {
                if parents.insert(member, region.code).is_some() {
                    return Err(DataIntegrityError::Duplicate {
                        row,
                        field: "members",
                        value: member.to_string(),
                    });
                }
            }
        }
        for region in regions.values() {
            for &member in &region.members {
                if !regions.contains_key(&member) && base.code_for_numeric(member).is_none() {
                    return Err(DataIntegrityError::UnknownReference {
                        table: "un-m49",
                        code: format!("{member:03}"),
                    });
                }
            }
        }

        let table = Self { regions, parents };
        for (row, &code) in table.regions.keys().enumerate() {
            let mut steps = 0;
            let mut cursor = table.parent(code);
            while let Some(parent) = cursor {
                steps += 1;
                if steps > tree_len {
                    return Err(DataIntegrityError::InvalidValue {
                        row,
                        field: "members",
                        value: format!("cycle through {code:03}"),
                    });
                }
                cursor = table.parent(parent);
            }
        }
        Ok(table)
    }

    /// A region by code.
    pub fn get(&self, code: RegionCode) -> Option<&Region> {
        self.regions.get(&code)
    }

    /// True when `code` names a region (not a country).
    pub fn contains(&self, code: RegionCode) -> bool {
        self.regions.contains_key(&code)
    }

    /// The region name, if `code` names a region.
    pub fn name(&self, code: RegionCode) -> Option<&TranslatableName> {
        self.regions.get(&code).map(Region::name)
    }

    /// All regions in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The tree parent of a region or country.
    pub fn parent(&self, code: RegionCode) -> Option<RegionCode> {
        self.parents.get(&code).copied()
    }

    /// Every ancestor of `code`, nearest first.
    ///
    /// With `upto`, the walk stops before reaching that region, so the last
    /// element is the ancestor directly beneath it. The direct parent is
    /// always included, even when it is `upto` itself.
    pub fn parents(&self, code: RegionCode, upto: Option<RegionCode>) -> Vec<RegionCode> {
        let mut chain = Vec::new();
        let mut cursor = self.parent(code);
        while let Some(region) = cursor {
            chain.push(region);
            cursor = self.parent(region);
            if cursor == upto {
                break;
            }
        }
        chain
    }

    /// True when `code` lies anywhere inside `region`, through the tree or
    /// through a grouping.
    pub fn is_subdivision_of(&self, code: RegionCode, region: RegionCode) -> bool {
        match self.regions.get(&region) {
            Some(r) if r.grouping => self.subdivisions(region, false).contains(&code),
            Some(_) => self.parents(code, None).contains(&region),
            None => false,
        }
    }

    /// Every region and country inside `code`, depth first with each
    /// member after its own subdivisions. With `countries_only`, regions
    /// are left out.
    pub fn subdivisions(&self, code: RegionCode, countries_only: bool) -> Vec<RegionCode> {
        let mut out = Vec::new();
        let mut visited = BTreeSet::new();
        self.collect_subdivisions(code, countries_only, &mut visited, &mut out);
        out
    }

    fn collect_subdivisions(
        &self,
        code: RegionCode,
        countries_only: bool,
        visited: &mut BTreeSet<RegionCode>,
        out: &mut Vec<RegionCode>,
    ) {
        let Some(region) = self.regions.get(&code) else {
            return;
        };
        if !visited.insert(code) {
            return;
        }
        for &member in &region.members {
            let is_region = self.regions.contains_key(&member);
            if is_region {
                self.collect_subdivisions(member, countries_only, visited, out);
            }
            if !countries_only || !is_region {
                out.push(member);
            }
        }
    }
}

/// The embedded UN M.49 region table, validated against [`dataset::load()`]
/// on first call.
///
/// # Errors
///
/// Returns the memoized [`DataIntegrityError`] of the base dataset or of
/// the region document.
pub fn load_regions() -> Result<&'static RegionTable, DataIntegrityError> {
    static REGIONS: OnceLock<Result<RegionTable, DataIntegrityError>> = OnceLock::new();
    REGIONS
        .get_or_init(|| {
            let table = dataset::load()
                .and_then(|base| RegionTable::from_yaml_str(UN_M49, UN_M49_NAME, base));
            match &table {
                Ok(table) => tracing::debug!(regions = table.len(), "loaded UN M.49 region tree"),
                Err(e) => tracing::error!(error = %e, "UN M.49 region data is malformed"),
            }
            table
        })
        .as_ref()
        .map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BaseTable {
        BaseTable::from_yaml_str(
            r#"
countries:
  - { code: "NZ", name: "New Zealand", numeric: 554 }
  - { code: "AU", name: "Australia", numeric: 36 }
  - { code: "FJ", name: "Fiji", numeric: 242 }
  - { code: "US", name: "United States", numeric: 840 }
"#,
            "test",
        )
        .unwrap()
    }

    const TREE: &str = r#"
regions:
  - { code: 1, name: "World", members: [9, 19] }
  - { code: 9, name: "Oceania", members: [53, 54] }
  - { code: 19, name: "Americas", members: [21] }
  - { code: 21, name: "Northern America", members: [840] }
  - { code: 53, name: "Australia and New Zealand", members: [36, 554] }
  - { code: 54, name: "Melanesia", members: [242] }
groupings:
  - { code: 3, name: "North America", members: [21] }
"#;

    fn tree() -> RegionTable {
        RegionTable::from_yaml_str(TREE, "test", &base()).unwrap()
    }

    #[test]
    fn parent_chain() {
        let t = tree();
        assert_eq!(t.parent(554), Some(53));
        assert_eq!(t.parents(554, None), vec![53, 9, 1]);
        assert_eq!(t.parents(554, Some(1)), vec![53, 9]);
        assert_eq!(t.parents(554, Some(9)), vec![53]);
        assert_eq!(t.parents(554, Some(53)), vec![53]);
        assert_eq!(t.parents(1, None), Vec::<u16>::new());
        assert_eq!(t.parent(3), None);
    }

    #[test]
    fn subdivision_through_tree_and_grouping() {
        let t = tree();
        assert!(t.is_subdivision_of(554, 9));
        assert!(t.is_subdivision_of(554, 1));
        assert!(!t.is_subdivision_of(554, 19));
        assert!(t.is_subdivision_of(840, 3));
        assert!(!t.is_subdivision_of(554, 3));
        assert!(!t.is_subdivision_of(554, 999));
    }

    #[test]
    fn subdivisions_depth_first() {
        let t = tree();
        assert_eq!(t.subdivisions(9, false), vec![36, 554, 53, 242, 54]);
        assert_eq!(t.subdivisions(9, true), vec![36, 554, 242]);
        assert!(t.subdivisions(554, false).is_empty());
    }

    #[test]
    fn names() {
        let t = tree();
        assert_eq!(t.name(53).unwrap().key(), "Australia and New Zealand");
        assert!(t.get(3).unwrap().is_grouping());
        assert!(t.name(554).is_none());
        assert_eq!(t.len(), 7);
    }

    #[test]
    fn dangling_member_is_fatal() {
        let err = RegionTable::from_yaml_str(
            "regions:\n  - { code: 1, name: \"World\", members: [4] }\n",
            "test",
            &base(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            DataIntegrityError::UnknownReference { table: "un-m49", code: "004".into() }
        );
    }

    #[test]
    fn second_tree_parent_is_fatal() {
        let err = RegionTable::from_yaml_str(
            "regions:\n  - { code: 1, name: \"a\", members: [554] }\n  - { code: 2, name: \"b\", members: [554] }\n",
            "test",
            &base(),
        )
        .unwrap_err();
        assert!(matches!(err, DataIntegrityError::Duplicate { field: "members", .. }));
    }

    #[test]
    fn cycle_is_fatal() {
        let err = RegionTable::from_yaml_str(
            "regions:\n  - { code: 1, name: \"a\", members: [2] }\n  - { code: 2, name: \"b\", members: [1] }\n",
            "test",
            &base(),
        )
        .unwrap_err();
        assert!(matches!(err, DataIntegrityError::InvalidValue { field: "members", .. }));
    }

    #[test]
    fn nameless_region_is_fatal() {
        let err = RegionTable::from_yaml_str("regions:\n  - { code: 1 }\n", "test", &base()).unwrap_err();
        assert_eq!(err, DataIntegrityError::MissingField { row: 0, field: "name" });
    }
}
