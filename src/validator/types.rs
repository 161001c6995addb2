use std::fmt;
use serde::{Serialize, Deserialize};

/// How serious a validation issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// Kind of problem found in items data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// A kit with no items
    EmptyKit,
    /// A kit set in the random groups with no kits
    EmptyGroup,
    /// An empty or whitespace-only item name
    BlankItemName,
    /// An item name with leading or trailing whitespace
    PaddedItemName,
    /// An item name that isn't a valid class name
    MalformedItemName,
    /// The same item listed more than once in a kit
    DuplicateItem,
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::BlankItemName | IssueKind::MalformedItemName => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::EmptyKit => write!(f, "Empty kit"),
            IssueKind::EmptyGroup => write!(f, "Empty kit group"),
            IssueKind::BlankItemName => write!(f, "Blank item name"),
            IssueKind::PaddedItemName => write!(f, "Item name has surrounding whitespace"),
            IssueKind::MalformedItemName => write!(f, "Malformed item name"),
            IssueKind::DuplicateItem => write!(f, "Duplicate item in kit"),
        }
    }
}

/// A single problem, with where it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    /// Location such as `item_kits[1][0]`
    pub location: String,
    /// Offending item name, if the issue is about one
    pub item: Option<String>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {} at {}", level, self.kind, self.location)?;
        if let Some(item) = &self.item {
            write!(f, " ({:?})", item)?;
        }
        Ok(())
    }
}

/// Result of linting one items data instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Warning).count()
    }
}

/// Information about an item name the registry doesn't know
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingItemInfo {
    /// The unknown item name
    pub item_name: String,
    /// Number of references to it
    pub reference_count: usize,
    /// Locations where it is referenced
    pub reference_locations: Vec<String>,
    /// Known names that look similar
    pub suggested_alternatives: Vec<String>,
}
