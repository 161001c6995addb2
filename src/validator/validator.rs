use std::collections::{BTreeMap, HashSet};
use anyhow::{Result, anyhow};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::items::{CommonItemsData, ItemKit};
use super::ItemRegistry;
use super::types::{IssueKind, MissingItemInfo, ValidationIssue, ValidationReport};

static CLASSNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("class name pattern is valid")
});

/// Check if a string looks like a class name
pub fn looks_like_classname(name: &str) -> bool {
    CLASSNAME_REGEX.is_match(name)
}

fn push_issue(issues: &mut Vec<ValidationIssue>, kind: IssueKind, location: String, item: Option<&str>) {
    issues.push(ValidationIssue {
        severity: kind.severity(),
        kind,
        location,
        item: item.map(str::to_string),
    });
}

fn check_kit(kit: &ItemKit, location: &str, issues: &mut Vec<ValidationIssue>) {
    if kit.is_empty() {
        push_issue(issues, IssueKind::EmptyKit, location.to_string(), None);
        return;
    }

    let mut seen = HashSet::new();
    for (idx, item) in kit.iter().enumerate() {
        let item_location = format!("{}[{}]", location, idx);
        let trimmed = item.trim();

        if trimmed.is_empty() {
            push_issue(issues, IssueKind::BlankItemName, item_location, Some(item.as_str()));
            continue;
        }

        if trimmed.len() != item.len() {
            push_issue(issues, IssueKind::PaddedItemName, item_location.clone(), Some(item.as_str()));
        }

        if !looks_like_classname(trimmed) {
            push_issue(issues, IssueKind::MalformedItemName, item_location.clone(), Some(item.as_str()));
        }

        if !seen.insert(trimmed) {
            push_issue(issues, IssueKind::DuplicateItem, item_location, Some(item.as_str()));
        }
    }
}

/// Lint items data without modifying it
pub fn validate_items_data(data: &CommonItemsData) -> ValidationReport {
    let mut issues = Vec::new();

    for (kit_idx, kit) in data.item_kits.iter().enumerate() {
        check_kit(kit, &format!("item_kits[{}]", kit_idx), &mut issues);
    }

    for (group_idx, group) in data.random_item_kit_groups.iter().enumerate() {
        let group_location = format!("random_item_kit_groups[{}]", group_idx);
        if group.is_empty() {
            push_issue(&mut issues, IssueKind::EmptyGroup, group_location, None);
            continue;
        }
        for (kit_idx, kit) in group.iter().enumerate() {
            check_kit(kit, &format!("{}[{}]", group_location, kit_idx), &mut issues);
        }
    }

    debug!("Validation found {} issues", issues.len());

    ValidationReport { issues }
}

/// Check every item name in `data` against the registry
pub fn check_items(registry: &ItemRegistry, data: &CommonItemsData) -> Result<Vec<MissingItemInfo>> {
    if !registry.loaded {
        return Err(anyhow!("Item registry not loaded"));
    }

    // Keyed by name so the report comes out sorted
    let mut missing: BTreeMap<String, MissingItemInfo> = BTreeMap::new();

    for (location, item) in data.item_references() {
        let name = item.trim();
        if name.is_empty() || registry.item_exists(name) {
            continue;
        }

        let entry = missing
            .entry(name.to_string())
            .or_insert_with(|| MissingItemInfo {
                item_name: name.to_string(),
                reference_count: 0,
                reference_locations: Vec::new(),
                suggested_alternatives: Vec::new(),
            });

        entry.reference_count += 1;
        entry.reference_locations.push(location);
    }

    for (name, info) in missing.iter_mut() {
        info.suggested_alternatives = find_similar_items(registry, name);
    }

    info!("Found {} unknown item names", missing.len());

    Ok(missing.into_values().collect())
}

/// Find known items with names close to `item_name`
pub fn find_similar_items(registry: &ItemRegistry, item_name: &str) -> Vec<String> {
    if !registry.loaded {
        return Vec::new();
    }

    let wanted = item_name.to_lowercase();
    // Similar if the distance is within 25% of the name length
    let threshold = (item_name.chars().count() as f64 * 0.25).ceil() as usize;

    let mut similar: Vec<(usize, &String)> = registry.items
        .iter()
        .filter(|known| known.as_str() != item_name)
        .map(|known| (levenshtein_distance(&wanted, &known.to_lowercase()), known))
        .filter(|(distance, _)| *distance <= threshold)
        .collect();

    // Stable sort keeps the registry's alphabetical order among ties
    similar.sort_by_key(|(distance, _)| *distance);
    similar.truncate(5);

    similar.into_iter().map(|(_, name)| name.clone()).collect()
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let m = s1_chars.len();
    let n = s2_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows are enough
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
