use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::GeoError;
use crate::normalize::normalize_name;

const EMBEDDED_ENTRIES: &str = include_str!("../data/iso3166.csv");
const EMBEDDED_ALIASES: &str = include_str!("../data/aliases.csv");

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One ISO-3166-1 country row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountryEntry {
    pub alpha2: String,
    pub alpha3: String,
    /// Kept as text so leading zeros survive (`"004"`).
    pub numeric: String,
    pub name: String,
    #[serde(default)]
    pub common_name: Option<String>,
}

impl CountryEntry {
    pub fn code(&self) -> CountryCode {
        CountryCode {
            alpha3: self.alpha3.clone(),
            name: self.name.clone(),
        }
    }
}

/// Map-plottable key for a resolved country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CountryCode {
    /// ISO-3166-1 alpha-3, e.g. `DEU`.
    pub alpha3: String,
    /// Standardized ISO short name, e.g. `Germany`.
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct AliasRow {
    alias: String,
    alpha3: String,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Read-only name → country lookup.
///
/// Every entry is reachable by its alpha-2, alpha-3, numeric code, ISO name,
/// common name, and any alias, all compared in normalized form. The table is
/// never mutated after construction, so it can be shared across workers
/// without locking.
#[derive(Debug)]
pub struct ReferenceTable {
    entries: Vec<CountryEntry>,
    index: HashMap<String, usize>,
}

impl ReferenceTable {
    /// The ISO-3166-1 table and alias list compiled into this crate.
    pub fn embedded() -> Result<Self, GeoError> {
        Self::from_readers(EMBEDDED_ENTRIES.as_bytes(), EMBEDDED_ALIASES.as_bytes())
    }

    /// Build a table from two CSV sources:
    /// `alpha2,alpha3,numeric,name,common_name` and `alias,alpha3`.
    pub fn from_readers<E: Read, A: Read>(entries: E, aliases: A) -> Result<Self, GeoError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(entries);
        let mut rows: Vec<CountryEntry> = Vec::new();
        for result in reader.deserialize() {
            let row: CountryEntry =
                result.map_err(|e| GeoError::ReferenceParse(e.to_string()))?;
            rows.push(row);
        }

        let mut by_code: HashMap<String, usize> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            if by_code.insert(row.alpha3.clone(), idx).is_some() {
                return Err(GeoError::DuplicateCode(row.alpha3.clone()));
            }
        }

        let mut index: HashMap<String, usize> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            let keys = [
                Some(row.alpha2.as_str()),
                Some(row.alpha3.as_str()),
                Some(row.numeric.as_str()),
                Some(row.name.as_str()),
                row.common_name.as_deref(),
            ];
            for key in keys.into_iter().flatten() {
                insert_key(&mut index, &rows, normalize_name(key), idx)?;
            }
        }

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(aliases);
        let mut alias_count = 0usize;
        for result in reader.deserialize() {
            let alias: AliasRow = result.map_err(|e| GeoError::ReferenceParse(e.to_string()))?;
            let idx = *by_code.get(&alias.alpha3).ok_or_else(|| GeoError::UnknownAliasTarget {
                alias: alias.alias.clone(),
                alpha3: alias.alpha3.clone(),
            })?;
            insert_key(&mut index, &rows, normalize_name(&alias.alias), idx)?;
            alias_count += 1;
        }

        log::debug!(
            "reference table loaded: {} entries, {} aliases, {} lookup keys",
            rows.len(),
            alias_count,
            index.len()
        );

        Ok(Self { entries: rows, index })
    }

    /// Look up an already-normalized key.
    pub fn lookup_normalized(&self, key: &str) -> Option<&CountryEntry> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }

    /// Look up a raw name; normalizes first.
    pub fn lookup(&self, name: &str) -> Option<&CountryEntry> {
        self.lookup_normalized(&normalize_name(name))
    }

    pub fn entries(&self) -> &[CountryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn insert_key(
    index: &mut HashMap<String, usize>,
    rows: &[CountryEntry],
    key: String,
    idx: usize,
) -> Result<(), GeoError> {
    if key.is_empty() {
        return Ok(());
    }
    match index.entry(key) {
        Entry::Occupied(existing) if *existing.get() != idx => Err(GeoError::AmbiguousKey {
            key: existing.key().clone(),
            first: rows[*existing.get()].alpha3.clone(),
            second: rows[idx].alpha3.clone(),
        }),
        Entry::Occupied(_) => Ok(()),
        Entry::Vacant(slot) => {
            slot.insert(idx);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
