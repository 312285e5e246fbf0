// This module hands out process-unique identifiers for compiler-generated
// helper variables. The supply keeps a per-prefix monotonic counter plus a
// reserved set primed with every identifier already bound in the functions
// being lowered (parameters, locals, thread variables), so a generated name
// can never shadow or collide with user code within one translation unit.
// Names are never reused across two synthesized constructs in the same
// session even when their live ranges do not overlap.

//! Unique helper identifiers for one lowering session.

use std::collections::{HashMap, HashSet};

/// Allocator for fresh identifiers.
#[derive(Debug, Default)]
pub struct NameSupply {
    counters: HashMap<String, u32>,
    reserved: HashSet<String>,
}

impl NameSupply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an identifier as taken so `fresh` skips it.
    pub fn reserve(&mut self, name: &str) {
        self.reserved.insert(name.to_string());
    }

    /// Return a name starting with `prefix` that is unique for this session.
    ///
    /// The first request for a prefix returns the prefix itself when free;
    /// later requests append `_<n>` with a monotonic counter.
    pub fn fresh(&mut self, prefix: &str) -> String {
        self.fresh_group(prefix, &[])
    }

    /// Like [`fresh`](Self::fresh), but the returned name anchors a family of
    /// derived identifiers `<name><suffix>`. A candidate is rejected when the
    /// base name or any derived name is already taken, and the whole family
    /// is reserved on success, so emitted helper declarations can never
    /// shadow a user identifier that happens to end in one of the suffixes.
    pub fn fresh_group(&mut self, prefix: &str, suffixes: &[&str]) -> String {
        loop {
            let counter = self.counters.entry(prefix.to_string()).or_insert(0);
            let candidate = if *counter == 0 {
                prefix.to_string()
            } else {
                format!("{prefix}_{counter}")
            };
            *counter += 1;
            let taken = self.reserved.contains(&candidate)
                || suffixes
                    .iter()
                    .any(|s| self.reserved.contains(&format!("{candidate}{s}")));
            if !taken {
                for s in suffixes {
                    self.reserved.insert(format!("{candidate}{s}"));
                }
                self.reserved.insert(candidate.clone());
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_names_are_unique() {
        let mut supply = NameSupply::new();
        let mut seen = HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(supply.fresh("_dlc_vec")));
        }
    }

    #[test]
    fn test_first_use_returns_prefix() {
        let mut supply = NameSupply::new();
        assert_eq!(supply.fresh("_dlc_vec"), "_dlc_vec");
        assert_eq!(supply.fresh("_dlc_vec"), "_dlc_vec_1");
        assert_eq!(supply.fresh("_dlc_vec"), "_dlc_vec_2");
    }

    #[test]
    fn test_reserved_names_are_skipped() {
        let mut supply = NameSupply::new();
        supply.reserve("_dlc_vec");
        supply.reserve("_dlc_vec_1");
        assert_eq!(supply.fresh("_dlc_vec"), "_dlc_vec_2");
    }

    #[test]
    fn test_group_skips_derived_name_clashes() {
        let mut supply = NameSupply::new();
        supply.reserve("_dlc_vec_x");
        assert_eq!(supply.fresh_group("_dlc_vec", &["_x", "_i"]), "_dlc_vec_1");
        // The winning group's derived names are taken as well.
        assert_eq!(supply.fresh("_dlc_vec_1_i"), "_dlc_vec_1_i_1");
    }

    #[test]
    fn test_independent_prefixes() {
        let mut supply = NameSupply::new();
        assert_eq!(supply.fresh("a"), "a");
        assert_eq!(supply.fresh("b"), "b");
        assert_eq!(supply.fresh("a"), "a_1");
    }
}
