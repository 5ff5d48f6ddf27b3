use crate::types::{AttributeRecord, AttributeTable, JoinedRegion, Region};
use std::collections::HashMap;
use tracing::{info, warn};

/// Canonical form of a region name: trimmed, single-spaced, lowercase.
pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Index of the first record per normalized key. Later duplicates are dropped
/// so that a join never multiplies regions.
fn index_by_key(table: &AttributeTable) -> HashMap<String, &AttributeRecord> {
    let mut index = HashMap::with_capacity(table.records.len());
    let mut duplicates = 0;

    for record in &table.records {
        let key = normalize_key(&record.key);
        if index.contains_key(&key) {
            duplicates += 1;
            continue;
        }
        index.insert(key, record);
    }

    if duplicates > 0 {
        warn!("Ignored {} duplicate keys in {} data (first row kept)", duplicates, table.name);
    }
    index
}

/// Left outer join of the boundary regions with both attribute tables.
/// Output has exactly one entry per region, in input order.
pub fn join(regions: Vec<Region>, population: &AttributeTable, land: &AttributeTable) -> Vec<JoinedRegion> {
    let population_index = index_by_key(population);
    let land_index = index_by_key(land);

    let joined: Vec<JoinedRegion> = regions.into_iter().map(|region| {
        let key = normalize_key(&region.name);
        JoinedRegion {
            population: population_index.get(&key).map(|r| (*r).clone()),
            land: land_index.get(&key).map(|r| (*r).clone()),
            region,
        }
    }).collect();

    let matched_population = joined.iter().filter(|j| j.population.is_some()).count();
    let matched_land = joined.iter().filter(|j| j.land.is_some()).count();
    info!(
        "Joined {} regions: {} matched population rows, {} matched land rows",
        joined.len(), matched_population, matched_land
    );

    for j in &joined {
        let missing: Vec<&str> = [(j.population.is_none(), population), (j.land.is_none(), land)]
            .into_iter()
            .filter(|(unmatched, _)| *unmatched)
            .map(|(_, table)| table.name.as_str())
            .collect();
        if !missing.is_empty() {
            warn!("No {} data for region '{}'", missing.join(" or "), j.region.name);
        }
    }

    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;
    use std::collections::BTreeMap;

    fn region(name: &str) -> Region {
        Region {
            name: name.to_string(),
            geometry: MultiPolygon::new(vec![]),
            attributes: BTreeMap::new(),
        }
    }

    fn table(name: &str, rows: &[(&str, &str)]) -> AttributeTable {
        AttributeTable {
            name: name.to_string(),
            headers: vec!["key".to_string(), "value".to_string()],
            records: rows.iter().map(|(k, v)| AttributeRecord {
                key: k.to_string(),
                values: BTreeMap::from([
                    ("key".to_string(), k.to_string()),
                    ("value".to_string(), v.to_string()),
                ]),
            }).collect(),
        }
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Andhra   Pradesh "), "andhra pradesh");
        assert_eq!(normalize_key("NCT OF DELHI"), "nct of delhi");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_join_keeps_every_region_in_order() {
        let regions = vec![region("Kerala"), region("Goa"), region("Sikkim")];
        let population = table("population", &[("Goa", "62%"), ("Kerala", "47%")]);
        let land = table("land", &[("Sikkim", "77")]);

        let joined = join(regions, &population, &land);

        let names: Vec<&str> = joined.iter().map(|j| j.region.name.as_str()).collect();
        assert_eq!(names, vec!["Kerala", "Goa", "Sikkim"]);
        assert_eq!(joined[0].population.as_ref().unwrap().get("value"), Some("47%"));
        assert!(joined[0].land.is_none());
        assert!(joined[2].population.is_none());
        assert_eq!(joined[2].land.as_ref().unwrap().get("value"), Some("77"));
    }

    #[test]
    fn test_join_with_no_matches() {
        let regions = vec![region("Kerala"), region("Goa")];
        let empty = table("population", &[]);
        let other = table("land", &[("Atlantis", "1")]);

        let joined = join(regions, &empty, &other);

        assert_eq!(joined.len(), 2);
        assert!(joined.iter().all(|j| j.population.is_none() && j.land.is_none()));
    }

    #[test]
    fn test_join_first_duplicate_wins() {
        let regions = vec![region("Goa")];
        let population = table("population", &[("Goa", "first"), ("goa ", "second"), ("Goa", "third")]);
        let land = table("land", &[]);

        let joined = join(regions, &population, &land);

        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].population.as_ref().unwrap().get("value"), Some("first"));
    }

    #[test]
    fn test_join_matches_on_normalized_names() {
        let regions = vec![region("Tamil  Nadu")];
        let population = table("population", &[("TAMIL NADU", "48%")]);
        let land = table("land", &[(" tamil nadu", "4500")]);

        let joined = join(regions, &population, &land);

        assert!(joined[0].population.is_some());
        assert!(joined[0].land.is_some());
    }
}
