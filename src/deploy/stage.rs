// ABOUTME: Progress reporting for named units of orchestration work.
// ABOUTME: A stage wraps one step, reports it, and hands its error back unchanged.

use std::future::Future;
use std::time::{Duration, Instant};

use super::DeployError;

/// What a finished step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Done,
    /// The step had nothing to do; the reason is shown to the user.
    Skipped(String),
}

impl Step {
    /// `Done` for a successful unit call, the converted error otherwise.
    pub fn done<E: Into<DeployError>>(result: Result<(), E>) -> Result<Step, DeployError> {
        result.map(|()| Step::Done).map_err(Into::into)
    }
}

/// How a stage ended, as seen by a reporter.
#[derive(Debug)]
pub enum StageOutcome<'a> {
    Done,
    Skipped(&'a str),
    Failed(&'a DeployError),
}

/// Receives ordered stage events. Labels are for humans only and never
/// influence control flow.
pub trait Stage: Send + Sync {
    fn begin(&self, name: &str);

    fn finish(&self, name: &str, outcome: StageOutcome<'_>, elapsed: Duration);
}

impl dyn Stage + '_ {
    /// Run `work` as the stage `name`, reporting its start and outcome.
    pub async fn perform<F>(&self, name: &str, work: F) -> Result<(), DeployError>
    where
        F: Future<Output = Result<Step, DeployError>>,
    {
        self.begin(name);
        let started = Instant::now();
        let result = work.await;
        let elapsed = started.elapsed();

        match result {
            Ok(Step::Done) => {
                tracing::info!(stage = name, "Stage finished");
                self.finish(name, StageOutcome::Done, elapsed);
                Ok(())
            }
            Ok(Step::Skipped(reason)) => {
                tracing::info!(stage = name, %reason, "Stage skipped");
                self.finish(name, StageOutcome::Skipped(&reason), elapsed);
                Ok(())
            }
            Err(e) => {
                self.finish(name, StageOutcome::Failed(&e), elapsed);
                Err(e)
            }
        }
    }
}

/// A stage that reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentStage;

impl Stage for SilentStage {
    fn begin(&self, _name: &str) {}

    fn finish(&self, _name: &str, _outcome: StageOutcome<'_>, _elapsed: Duration) {}
}
