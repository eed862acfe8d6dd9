//! Exit code logic for the batchget process.
//!
//! Single responsibility: map run outcomes to the process exit outcome.

use batchget_core::{RunReport, TransferResult};

use crate::ProcessExit;

/// A single-URL run succeeds only if its one transfer did.
pub(crate) fn single_exit_outcome(result: &TransferResult) -> ProcessExit {
    if result.success {
        ProcessExit::Success
    } else {
        ProcessExit::Failure
    }
}

/// A batch run that reached the end succeeds regardless of per-URL failures;
/// an interrupted one does not.
pub(crate) fn batch_exit_outcome(report: &RunReport) -> ProcessExit {
    if report.interrupted {
        ProcessExit::Failure
    } else {
        ProcessExit::Success
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use batchget_core::{DownloadError, RunMode};

    use super::*;

    #[test]
    fn test_single_exit_outcome_follows_transfer() {
        let ok = TransferResult::succeeded("http://h/a", Duration::ZERO, 1, PathBuf::from("a"));
        let failed = TransferResult::failed("http://h/b", &DownloadError::http_status("http://h/b", 404));
        assert_eq!(single_exit_outcome(&ok), ProcessExit::Success);
        assert_eq!(single_exit_outcome(&failed), ProcessExit::Failure);
    }

    #[test]
    fn test_batch_exit_outcome_success_with_failures() {
        let mut report = RunReport::empty(RunMode::Sequential);
        report.results.push(TransferResult::failed(
            "http://h/b",
            &DownloadError::http_status("http://h/b", 500),
        ));
        assert_eq!(batch_exit_outcome(&report), ProcessExit::Success);
    }

    #[test]
    fn test_batch_exit_outcome_failure_when_interrupted() {
        let mut report = RunReport::empty(RunMode::Concurrent { connections: 2 });
        report.interrupted = true;
        assert_eq!(batch_exit_outcome(&report), ProcessExit::Failure);
    }
}
