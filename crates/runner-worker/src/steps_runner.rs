// StepsRunner: runs a job's steps once, in order.
// Decides run/skip for each step from its condition, the critical-failure
// short-circuit and its finally/enabled flags, then folds the step outcome into
// the job result. Step failures are data; only collaborator faults are errors.

use anyhow::{Context, Result};
use runner_common::util::task_result_util::{TaskResult, TaskResultUtil};
use std::sync::Arc;

use crate::condition_trace_writer::ConditionTraceWriter;
use crate::execution_context::{ExecutionContext, IStep};
use crate::expressions::{evaluate_builtin, ConditionEvaluator, ConditionSignal, StatusFunctionEvaluator};
use crate::steps_context::StepsContext;

/// A collaborator broke its contract with the runner. The run is aborted.
#[derive(Debug, thiserror::Error)]
pub enum StepsRunnerError {
    #[error("Step '{step}' completed without reporting an outcome")]
    MissingOutcome { step: String },

    #[error("Failed to evaluate condition '{condition}' for step '{step}': {source}")]
    ConditionEvaluation {
        step: String,
        condition: String,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Executes all steps in a job, in order.
pub struct StepsRunner {
    /// Evaluator for conditions the runner does not answer itself.
    condition_evaluator: Arc<dyn ConditionEvaluator>,
}

impl StepsRunner {
    pub fn new(condition_evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        Self {
            condition_evaluator,
        }
    }

    /// Run all steps and write the job result to `job_context`.
    ///
    /// Returns `Err` only when a step raises instead of reporting an outcome,
    /// a step finishes without an outcome, or the condition evaluator fails.
    /// The job result is left untouched in those cases.
    pub async fn run_async(
        &self,
        job_context: &mut ExecutionContext,
        steps: &mut [Box<dyn IStep>],
    ) -> Result<()> {
        let mut job_outcome = TaskResult::Succeeded;
        let mut critical_failure_seen = false;

        for step in steps.iter_mut() {
            let display_name = step.display_name().to_string();

            if !step.is_finally() && critical_failure_seen {
                job_context.info(&format!(
                    "Skipping step '{}' due to a previous critical failure.",
                    display_name
                ));
                self.skip_step(job_context, step.as_mut());
                continue;
            }

            if !step.enabled() {
                job_context.info(&format!(
                    "Skipping step '{}' because it is disabled.",
                    display_name
                ));
                self.skip_step(job_context, step.as_mut());
                continue;
            }

            if !step.is_finally() {
                let should_run = self
                    .evaluate_step_condition(step.as_mut(), job_outcome)
                    .await?;
                if !should_run {
                    job_context.info(&format!(
                        "Skipping step '{}' (condition evaluated to false).",
                        display_name
                    ));
                    self.skip_step(job_context, step.as_mut());
                    continue;
                }
            }

            job_context.info(&format!("Starting step: {}", display_name));

            step.run_async()
                .await
                .with_context(|| format!("Step '{}' raised an error", display_name))?;

            let outcome = step
                .execution_context()
                .result()
                .ok_or_else(|| StepsRunnerError::MissingOutcome {
                    step: display_name.clone(),
                })?;

            let continue_on_error = step.continue_on_error();
            let contribution = TaskResultUtil::effective_contribution(outcome, continue_on_error);
            job_outcome = TaskResultUtil::merge_task_results(job_outcome, contribution);

            if outcome == TaskResult::Failed && !continue_on_error && step.critical() {
                critical_failure_seen = true;
                job_context.warning(&format!(
                    "Critical step '{}' failed. Remaining steps other than finally steps will be skipped.",
                    display_name
                ));
            }

            job_context.steps_context_mut().record_step(
                step.id(),
                outcome,
                StepsContext::conclusion(outcome, continue_on_error),
            );

            job_context.info(&format!(
                "Step '{}' completed with outcome={}, job status={}",
                display_name, outcome, job_outcome
            ));
        }

        job_context.set_result(job_outcome);
        tracing::info!("Steps completed with job result {}", job_outcome);

        Ok(())
    }

    /// Mark a step as skipped and record it.
    fn skip_step(&self, job_context: &mut ExecutionContext, step: &mut dyn IStep) {
        step.mark_skipped();
        job_context
            .steps_context_mut()
            .record_step(step.id(), TaskResult::Skipped, TaskResult::Skipped);
    }

    /// Decide whether a non-finally step runs, given the job result so far.
    async fn evaluate_step_condition(
        &self,
        step: &mut dyn IStep,
        job_outcome: TaskResult,
    ) -> Result<bool> {
        let signal = ConditionSignal::from_job_outcome(job_outcome);
        let condition = step.condition().to_string();
        let display_name = step.display_name().to_string();

        let mut trace = ConditionTraceWriter::new(step.execution_context().write_debug());
        trace.trace_condition_start(&display_name, &condition);

        let evaluated = match evaluate_builtin(&condition, &signal) {
            Some(result) => {
                trace.trace_builtin(&signal, result);
                Ok(result)
            }
            None => match self.condition_evaluator.evaluate(&condition, &signal).await {
                Ok(result) => {
                    trace.trace_delegated(&signal, result);
                    Ok(result)
                }
                Err(e) => {
                    trace.trace_evaluation_error(&e);
                    Err(StepsRunnerError::ConditionEvaluation {
                        step: display_name.clone(),
                        condition: condition.clone(),
                        source: e.into(),
                    })
                }
            },
        };

        if let Ok(should_run) = evaluated {
            trace.trace_condition_result(&display_name, should_run);
        }

        // Traces reach the step log even when evaluation aborts the run.
        let context = step.execution_context_mut();
        for line in trace.into_traces() {
            context.debug(&line);
        }

        Ok(evaluated?)
    }
}

impl Default for StepsRunner {
    fn default() -> Self {
        Self::new(Arc::new(StatusFunctionEvaluator))
    }
}
