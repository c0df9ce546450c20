use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::error::GeoError;
use crate::normalize::normalize_name;
use crate::reference::{CountryCode, ReferenceTable};

/// Outcome of resolving one country name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "code", rename_all = "snake_case")]
pub enum Resolution {
    Canonical(CountryCode),
    /// No reference entry matches. A normal outcome, not an error.
    Unresolved,
}

/// A country name paired with its resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedKey {
    pub name: String,
    pub resolution: Resolution,
}

impl ResolvedKey {
    pub fn code(&self) -> Option<&CountryCode> {
        match &self.resolution {
            Resolution::Canonical(code) => Some(code),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.resolution, Resolution::Canonical(_))
    }
}

/// Memoizing country-name resolver.
///
/// Safe to share across threads. The memo cache uses insert-if-absent, so two
/// workers racing on the same name may both compute the lookup, but the stored
/// value is always the one the reference table produces.
///
/// Entries are never evicted on their own. A long-lived resolver fed
/// unbounded input should call `clear_cache` between batches.
#[derive(Debug)]
pub struct CountryResolver {
    table: Arc<ReferenceTable>,
    cache: RwLock<HashMap<String, Option<CountryCode>>>,
}

impl CountryResolver {
    pub fn new(table: Arc<ReferenceTable>) -> Self {
        Self {
            table,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolver over the embedded ISO-3166 table.
    pub fn embedded() -> Result<Self, GeoError> {
        Ok(Self::new(Arc::new(ReferenceTable::embedded()?)))
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    /// Resolve a free-form country name.
    ///
    /// Returns `Ok(Unresolved)` when nothing matches. `Err` only signals a
    /// fault in the resolver itself.
    pub fn resolve(&self, name: &str) -> Result<ResolvedKey, GeoError> {
        let key = normalize_name(name);

        let cached = {
            let cache = self.cache.read().map_err(|_| GeoError::CachePoisoned)?;
            cache.get(&key).cloned()
        };

        let code = match cached {
            Some(code) => code,
            None => {
                let computed = self.table.lookup_normalized(&key).map(|e| e.code());
                if computed.is_none() {
                    log::debug!("no reference match for country name {name:?}");
                }
                let mut cache = self.cache.write().map_err(|_| GeoError::CachePoisoned)?;
                cache.entry(key).or_insert(computed).clone()
            }
        };

        Ok(ResolvedKey {
            name: name.to_string(),
            resolution: match code {
                Some(code) => Resolution::Canonical(code),
                None => Resolution::Unresolved,
            },
        })
    }

    /// Number of distinct normalized names seen so far.
    pub fn cached_names(&self) -> Result<usize, GeoError> {
        Ok(self.cache.read().map_err(|_| GeoError::CachePoisoned)?.len())
    }

    /// Forget every memoized name. Later lookups go back to the table.
    pub fn clear_cache(&self) -> Result<(), GeoError> {
        self.cache.write().map_err(|_| GeoError::CachePoisoned)?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> CountryResolver {
        CountryResolver::embedded().unwrap()
    }

    #[test]
    fn resolves_plain_name() {
        let key = resolver().resolve("Germany").unwrap();
        assert_eq!(key.name, "Germany");
        assert_eq!(key.code().unwrap().alpha3, "DEU");
        assert!(key.is_resolved());
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let key = resolver().resolve("Narnia").unwrap();
        assert_eq!(key.resolution, Resolution::Unresolved);
        assert!(key.code().is_none());
    }

    #[test]
    fn dataset_spellings_resolve() {
        let r = resolver();
        for (raw, alpha3) in [
            ("US", "USA"),
            ("Korea, South", "KOR"),
            ("Congo (Kinshasa)", "COD"),
            ("Congo (Brazzaville)", "COG"),
            ("Burma", "MMR"),
            ("West Bank and Gaza", "PSE"),
            ("Cote d'Ivoire", "CIV"),
            ("Taiwan*", "TWN"),
            ("UK", "GBR"),
        ] {
            assert_eq!(r.resolve(raw).unwrap().code().unwrap().alpha3, alpha3, "{raw}");
        }
    }

    #[test]
    fn ships_and_disputed_regions_stay_unresolved() {
        let r = resolver();
        for raw in ["Diamond Princess", "MS Zaandam", "Kosovo", "Channel Islands"] {
            assert!(!r.resolve(raw).unwrap().is_resolved(), "{raw}");
        }
    }

    #[test]
    fn casing_and_spacing_do_not_matter() {
        let r = resolver();
        let a = r.resolve("united   KINGDOM").unwrap();
        assert_eq!(a.code().unwrap().alpha3, "GBR");
        // Original spelling is preserved on the key.
        assert_eq!(a.name, "united   KINGDOM");
    }

    #[test]
    fn canonical_forms_are_idempotent() {
        let r = resolver();
        let by_name = r.resolve("Viet Nam").unwrap();
        let code = by_name.code().unwrap().clone();
        assert_eq!(r.resolve(&code.alpha3).unwrap().resolution, by_name.resolution);
        assert_eq!(r.resolve(&code.name).unwrap().resolution, by_name.resolution);
    }

    #[test]
    fn memoizes_by_normalized_name() {
        let r = resolver();
        r.resolve("France").unwrap();
        r.resolve(" FRANCE ").unwrap();
        r.resolve("Narnia").unwrap();
        r.resolve("narnia").unwrap();
        assert_eq!(r.cached_names().unwrap(), 2);
    }

    #[test]
    fn clear_cache_keeps_answers() {
        let r = resolver();
        r.resolve("France").unwrap();
        r.resolve("Narnia").unwrap();
        r.clear_cache().unwrap();
        assert_eq!(r.cached_names().unwrap(), 0);
        assert_eq!(r.resolve("france").unwrap().code().unwrap().alpha3, "FRA");
        assert!(!r.resolve("Narnia").unwrap().is_resolved());
        assert_eq!(r.cached_names().unwrap(), 2);
    }

    #[test]
    fn concurrent_resolution_agrees() {
        let r = Arc::new(resolver());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = Arc::clone(&r);
                std::thread::spawn(move || {
                    ["Italy", "Narnia", "US", "Burma"]
                        .iter()
                        .map(|n| r.resolve(n).unwrap().code().map(|c| c.alpha3.clone()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for h in handles {
            let got = h.join().unwrap();
            assert_eq!(
                got,
                vec![Some("ITA".to_string()), None, Some("USA".to_string()), Some("MMR".to_string())]
            );
        }
        assert_eq!(r.cached_names().unwrap(), 4);
    }
}
