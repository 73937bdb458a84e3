// ABOUTME: Shared step for releasing a recorded provider resource.
// ABOUTME: Deletes through the CPI, then drops the record only once the provider agreed.

use std::future::Future;

use crate::cloud::{CloudError, Deletion};
use crate::state::{RecordKind, RecordRepo};

use super::stage::{Stage, Step};
use super::DeployError;

/// Run `deletion` as stage `label` and drop `record` from `repo` when the
/// provider deleted it or reported it missing. Any other error leaves the
/// repository untouched.
pub(super) async fn release<K, F>(
    stage: &dyn Stage,
    label: &str,
    repo: &RecordRepo<K>,
    record: &K,
    deletion: F,
) -> Result<(), DeployError>
where
    K: RecordKind,
    F: Future<Output = Result<Deletion, CloudError>>,
{
    stage
        .perform(label, async {
            let deletion = deletion.await?;
            repo.delete(record.id())?;
            Ok(match deletion {
                Deletion::Deleted => Step::Done,
                Deletion::NotFound => {
                    tracing::warn!(kind = K::NAME, cid = %record.cid(), "Resource already gone");
                    Step::Skipped(format!("{} '{}' not found", K::NAME, record.cid()))
                }
            })
        })
        .await
}
