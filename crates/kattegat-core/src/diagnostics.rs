//! Warnings and errors collected while checking a network before a solve.
//!
//! [`Network::validate_into`](crate::Network::validate_into) fills a
//! [`Diagnostics`] instead of stopping at the first problem, so the CLI can
//! print every issue at once and the solver can turn the first error into a
//! typed failure.
//!
//! ```
//! use kattegat_core::diagnostics::Diagnostics;
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning("structure", "Network has no loads");
//! diag.add_error_with_entity("input", "capacity is negative", "wind_Copenhagen");
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert!(diag.has_errors());
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but solvable (e.g. zero demand)
    Warning,
    /// The network cannot be solved as given
    Error,
}

/// A single issue found in a network.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Grouping tag: "structure", "input", "capacity", "topology"
    pub category: String,
    pub message: String,
    /// Element the issue refers to, e.g. "gas_Aalborg"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;
        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.add(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.add(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn add_error(&mut self, category: &str, message: &str) {
        self.add(DiagnosticIssue::new(Severity::Error, category, message));
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.add(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn issues_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    pub fn summary(&self) -> String {
        fn plural(n: usize, word: &str) -> String {
            format!("{} {}{}", n, word, if n == 1 { "" } else { "s" })
        }
        match (self.warning_count(), self.error_count()) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => plural(w, "warning"),
            (0, e) => plural(e, "error"),
            (w, e) => format!("{}, {}", plural(w, "warning"), plural(e, "error")),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut diag = Diagnostics::new();
        diag.add_warning("structure", "no loads");
        diag.add_warning("capacity", "tight reserve");
        diag.add_error("input", "negative demand");
        assert_eq!(diag.warning_count(), 2);
        assert_eq!(diag.error_count(), 1);
        assert_eq!(diag.summary(), "2 warnings, 1 error");
    }

    #[test]
    fn empty_has_no_issues() {
        let diag = Diagnostics::new();
        assert!(!diag.has_errors());
        assert!(!diag.has_warnings());
        assert_eq!(diag.summary(), "No issues");
    }

    #[test]
    fn display_mentions_entity() {
        let issue = DiagnosticIssue::new(Severity::Error, "input", "capacity is negative")
            .with_entity("solar_Aarhus");
        assert_eq!(
            issue.to_string(),
            "[error:input] capacity is negative (solar_Aarhus)"
        );
    }

    #[test]
    fn filter_by_category_and_merge() {
        let mut a = Diagnostics::new();
        a.add_warning("topology", "line has no rating");
        let mut b = Diagnostics::new();
        b.add_error("topology", "bus is isolated");
        a.merge(b);
        assert_eq!(a.issues_by_category("topology").count(), 2);
    }

    #[test]
    fn serializes_without_empty_entity() {
        let mut diag = Diagnostics::new();
        diag.add_error("structure", "Network has no buses");
        let json = serde_json::to_value(&diag).unwrap();
        let issue = &json["issues"][0];
        assert_eq!(issue["severity"], "error");
        assert!(issue.get("entity").is_none());
    }
}
