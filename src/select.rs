//! Choosing which parts and variables of a case to import.
//!
//! Rejected candidates are reported through [`Diagnostics`] and never cause an error. The only
//! failure is a malformed pattern, which is caught before any file is touched.

use crate::diagnostics::Diagnostics;
use crate::reader::VariableLocation;
use crate::traits::{PartSource, VariableInfo};

use regex::Regex;

/// A part name pattern that failed to compile
#[derive(Debug, thiserror::Error)]
#[error("invalid {which} pattern `{pattern}`: {source}")]
pub struct ConfigurationError {
    pub which: &'static str,
    pub pattern: String,
    #[source]
    source: regex::Error,
}

/// Include / exclude regular expressions on part names.
///
/// Patterns match anywhere in the name. An empty include pattern includes every part and an
/// empty exclude pattern excludes none; exclude takes priority over include.
#[derive(Debug, Clone)]
pub struct PartFilter {
    include: Regex,
    exclude: Option<Regex>,
}

impl PartFilter {
    pub fn new(include: &str, exclude: &str) -> Result<Self, ConfigurationError> {
        let include = if include.is_empty() { ".*" } else { include };
        let include = compile("include", include)?;

        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(compile("exclude", exclude)?)
        };

        Ok(Self { include, exclude })
    }

    /// true if a part called `part_name` passes both patterns
    pub fn accepts(&self, part_name: &str) -> bool {
        self.include.is_match(part_name) && !self.is_excluded(part_name)
    }

    fn is_excluded(&self, part_name: &str) -> bool {
        self.exclude
            .as_ref()
            .map_or(false, |exclude| exclude.is_match(part_name))
    }

    /// Parts that pass both patterns and contain surface elements, in input order
    pub fn select<'a, P, I>(&self, parts: I, diagnostics: &mut Diagnostics) -> Vec<&'a P>
    where
        P: PartSource + 'a,
        I: IntoIterator<Item = &'a P>,
    {
        let mut selected = Vec::new();

        for part in parts {
            let name = part.part_name();
            if self.is_excluded(name) {
                diagnostics.info(format!("Not reading part {name} (exclude pattern matches)"));
            } else if !self.include.is_match(name) {
                diagnostics.info(format!(
                    "Not reading part {name} (include pattern does not match)"
                ));
            } else if !part.is_surface() {
                diagnostics.warn(format!("Not reading part {name} (no surface elements)"));
            } else {
                diagnostics.info(format!("Reading part {name}"));
                selected.push(part);
            }
        }

        selected
    }
}

fn compile(which: &'static str, pattern: &str) -> Result<Regex, ConfigurationError> {
    Regex::new(pattern).map_err(|source| ConfigurationError {
        which,
        pattern: pattern.to_string(),
        source,
    })
}

/// The comma separated list of variables to import. `*` requests every variable, an empty
/// list requests none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableRequest {
    all: bool,
    names: Vec<String>,
}

impl VariableRequest {
    pub fn parse(list: &str) -> Self {
        let mut request = Self::default();

        for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            if name == "*" {
                request.all = true;
            } else {
                request.names.push(name.to_string());
            }
        }

        request
    }

    /// request every variable
    pub fn all() -> Self {
        Self {
            all: true,
            names: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.all || self.names.iter().any(|requested| requested == name)
    }

    /// Per-node variables that were requested, in input order
    pub fn select<'a, V, I>(&self, variables: I, diagnostics: &mut Diagnostics) -> Vec<&'a V>
    where
        V: VariableInfo + 'a,
        I: IntoIterator<Item = &'a V>,
    {
        let mut selected = Vec::new();
        let mut seen: Vec<&str> = Vec::new();

        for variable in variables {
            let name = variable.variable_name();
            seen.push(name);

            if variable.variable_location() != VariableLocation::PerNode {
                diagnostics.warn(format!(
                    "Not reading variable {name} (per-element variables are not supported)"
                ));
            } else if !self.contains(name) {
                diagnostics.info(format!("Not reading variable {name} (not in requested variables)"));
            } else {
                selected.push(variable);
            }
        }

        for missing in self.names.iter().filter(|name| !seen.contains(&name.as_str())) {
            diagnostics.warn(format!("Requested variable {missing} is not defined in the case"));
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::VariableType;
    use crate::testing::{FakeBlock, FakePart, FakeVariable};
    use log::Level;

    fn surface(name: &str) -> FakePart {
        FakePart::new(name, 3).with_block(FakeBlock::fixed("tria3", vec![[1, 2, 3]]))
    }

    fn names<P: PartSource>(parts: &[&P]) -> Vec<String> {
        parts.iter().map(|p| p.part_name().to_string()).collect()
    }

    #[test]
    fn exclude_internal_mesh() {
        let parts = vec![surface("wall"), surface("internalMesh"), surface("outlet")];
        let filter = PartFilter::new(".*", "internalMesh").unwrap();
        let mut diagnostics = Diagnostics::new();

        let selected = filter.select(&parts, &mut diagnostics);
        assert_eq!(names(&selected), vec!["wall", "outlet"]);
        assert!(diagnostics
            .records()
            .iter()
            .any(|r| r.message.contains("internalMesh") && r.level == Level::Info));
    }

    #[test]
    fn empty_exclude_matches_nothing() {
        let filter = PartFilter::new(".*", "").unwrap();
        for name in ["", "wall", "internalMesh", "a b c"] {
            assert!(filter.accepts(name), "{name}");
        }
    }

    #[test]
    fn empty_include_matches_everything() {
        let filter = PartFilter::new("", "").unwrap();
        assert!(filter.accepts("anything"));
    }

    #[test]
    fn exclude_wins() {
        let filter = PartFilter::new("wall", "wall").unwrap();
        assert!(!filter.accepts("wall"));

        let filter = PartFilter::new("^patch", "outlet$").unwrap();
        assert!(filter.accepts("patch_inlet"));
        assert!(!filter.accepts("patch_outlet"));
        assert!(!filter.accepts("wall"));
    }

    #[test]
    fn malformed_pattern() {
        let err = PartFilter::new("(unclosed", "").unwrap_err();
        assert_eq!(err.which, "include");
        assert_eq!(err.pattern, "(unclosed");

        let err = PartFilter::new(".*", "[z-a]").unwrap_err();
        assert_eq!(err.which, "exclude");
        assert!(err.to_string().contains("[z-a]"));
    }

    #[test]
    fn non_surface_parts_are_warned_about() {
        let lines = FakePart::new("feature edges", 2)
            .with_block(FakeBlock::fixed("bar2", vec![[1, 2]]));
        let parts = vec![lines, surface("wall")];
        let filter = PartFilter::new(".*", "").unwrap();
        let mut diagnostics = Diagnostics::new();

        let selected = filter.select(&parts, &mut diagnostics);
        assert_eq!(names(&selected), vec!["wall"]);

        let warnings: Vec<_> = diagnostics.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("feature edges"));
    }

    fn variables() -> Vec<FakeVariable> {
        vec![
            FakeVariable::scalar("p", vec![]),
            FakeVariable::vector("U", vec![]),
            FakeVariable::scalar("cellZone", vec![]).per_element(),
            FakeVariable::new("sigma", VariableType::TensorSymm, vec![]),
        ]
    }

    fn variable_names(selected: &[&FakeVariable]) -> Vec<String> {
        selected.iter().map(|v| v.variable_name().to_string()).collect()
    }

    #[test]
    fn star_selects_all_per_node_variables() {
        let variables = variables();
        let mut diagnostics = Diagnostics::new();

        let selected = VariableRequest::parse("*").select(&variables, &mut diagnostics);
        assert_eq!(variable_names(&selected), vec!["p", "U", "sigma"]);

        let warnings: Vec<_> = diagnostics.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("cellZone"));
    }

    #[test]
    fn empty_request_selects_nothing() {
        let variables = variables();
        let request = VariableRequest::parse("");
        assert!(request.is_empty());

        let selected = request.select(&variables, &mut Diagnostics::new());
        assert!(selected.is_empty());
    }

    #[test]
    fn named_request() {
        let variables = variables();
        let mut diagnostics = Diagnostics::new();

        let request = VariableRequest::parse("U, p,,missing");
        let selected = request.select(&variables, &mut diagnostics);

        // case order, not request order
        assert_eq!(variable_names(&selected), vec!["p", "U"]);
        assert!(diagnostics
            .warnings()
            .any(|r| r.message.contains("missing")));
    }

    #[test]
    fn per_element_request_is_skipped() {
        let variables = variables();
        let mut diagnostics = Diagnostics::new();

        let selected = VariableRequest::parse("cellZone").select(&variables, &mut diagnostics);
        assert!(selected.is_empty());
        assert!(diagnostics
            .warnings()
            .any(|r| r.message.contains("per-element")));
    }
}
