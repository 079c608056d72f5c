use crate::domain::{Command, ResolvedTarget};
use crate::infra::ApiError;
use thiserror::Error;
use tracing::{info, warn};

/// Upper bound on dispatches in flight at once.
pub const DISPATCH_FAN_OUT: usize = 4;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to send {command} to {device_name} ({device_id}): {source}")]
    Send {
        device_id: String,
        device_name: String,
        command: String,
        source: ApiError,
    },

    #[error("dispatch to {device_name} ({device_id}) panicked")]
    Panicked {
        device_id: String,
        device_name: String,
    },
}

#[derive(Debug)]
pub struct DispatchOutcome {
    pub target: ResolvedTarget,
    pub result: Result<(), DispatchError>,
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ResolvedTarget> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_ok())
            .map(|outcome| &outcome.target)
    }

    pub fn failed(&self) -> impl Iterator<Item = &DispatchError> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err())
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Sends `command` to every target. Each send is isolated: a failure is
/// recorded and the remaining targets still run. Outcomes keep target order.
pub fn dispatch_all<F>(targets: &[ResolvedTarget], command: &Command, send: F) -> DispatchReport
where
    F: Fn(&str, &Command) -> Result<(), ApiError> + Sync,
{
    let send = &send;
    let mut report = DispatchReport::default();

    for batch in targets.chunks(DISPATCH_FAN_OUT) {
        let results = std::thread::scope(|scope| {
            let handles = batch
                .iter()
                .map(|target| scope.spawn(move || send(&target.device_id, command)))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>()
        });

        for (target, joined) in batch.iter().zip(results) {
            let result = match joined {
                Ok(Ok(())) => {
                    info!(
                        device_id = %target.device_id,
                        query = %target.query,
                        "command sent"
                    );
                    Ok(())
                }
                Ok(Err(source)) => {
                    warn!(device_id = %target.device_id, error = %source, "command failed");
                    Err(DispatchError::Send {
                        device_id: target.device_id.clone(),
                        device_name: target.device_name.clone(),
                        command: command.command.clone(),
                        source,
                    })
                }
                Err(_) => {
                    warn!(device_id = %target.device_id, "dispatch worker panicked");
                    Err(DispatchError::Panicked {
                        device_id: target.device_id.clone(),
                        device_name: target.device_name.clone(),
                    })
                }
            };
            report.outcomes.push(DispatchOutcome {
                target: target.clone(),
                result,
            });
        }
    }

    report
}
