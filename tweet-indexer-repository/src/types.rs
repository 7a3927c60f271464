//! Outcome types for bulk store operations.

/// Result of a bulk operation for a single item.
///
/// Represents the outcome of one action within a bulk request. It indicates
/// whether the action succeeded and carries the store's reason if it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOperationResult {
    /// The document `_id` the action targeted.
    pub document_id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Store-reported reason if the operation failed.
    pub error: Option<String>,
}

/// Summary of a bulk operation containing the aggregate flag and individual results.
///
/// The store may durably write some items of a batch while rejecting others.
/// `has_errors` collapses that into the single flag the pipeline decides on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// The store's own aggregate `errors` flag.
    pub errors: bool,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Summary of a batch with no items.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a summary from per-item results and the store's aggregate flag.
    pub fn from_results(results: Vec<BatchOperationResult>, errors: bool) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            errors,
            results,
        }
    }

    /// Whether the store reported at least one item error.
    pub fn has_errors(&self) -> bool {
        self.errors || self.failed > 0
    }

    /// Results of the items that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, success: bool) -> BatchOperationResult {
        BatchOperationResult {
            document_id: id.to_string(),
            success,
            error: if success { None } else { Some("mapper_parsing_exception".to_string()) },
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = BatchOperationSummary::from_results(
            vec![result("1", true), result("2", false), result("3", true)],
            true,
        );

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_errors());
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn test_summary_flag_alone_is_an_error() {
        let summary = BatchOperationSummary::from_results(vec![result("1", true)], true);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchOperationSummary::empty();
        assert_eq!(summary.total, 0);
        assert!(!summary.has_errors());
    }
}
