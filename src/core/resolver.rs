//! Template name resolution against a library index.

use std::collections::HashSet;

use crate::util::normalize;

/// Find the name to request from the library for `template_id`.
///
/// The exact id wins; otherwise its normalized form is tried, since
/// libraries sometimes store the base name while catalogs keep the
/// decorated one (or the other way round).
pub fn resolve<'a>(template_id: &str, names: &'a HashSet<String>) -> Option<&'a str> {
    if let Some(name) = names.get(template_id) {
        return Some(name.as_str());
    }
    names.get(normalize(template_id).as_str()).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match() {
        let names = index(&["default_pbr_cycles"]);
        assert_eq!(resolve("default_pbr_cycles", &names), Some("default_pbr_cycles"));
    }

    #[test]
    fn test_normalized_match() {
        let names = index(&["stone"]);
        assert_eq!(resolve("stone.001", &names), Some("stone"));
    }

    #[test]
    fn test_prefers_exact() {
        let names = index(&["stone", "stone.001"]);
        assert_eq!(resolve("stone.001", &names), Some("stone.001"));
    }

    #[test]
    fn test_missing() {
        let names = index(&["glass"]);
        assert_eq!(resolve("stone.001", &names), None);
        assert_eq!(resolve("anything", &HashSet::new()), None);
    }
}
