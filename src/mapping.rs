//! Bulk task/employee mapping submission.

use serde::{Deserialize, Serialize};

use crate::client::{BoardClient, ClientError};
use crate::models::{Employee, MappingAck, MappingRequest, Task};
use crate::selection::SelectionSet;

/// When the selection sets are reset after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    /// Clear only after the backend accepted the mapping; a failed submit
    /// keeps the selection so it can be retried.
    #[default]
    OnSuccess,
    /// Clear after every attempt, whatever the outcome.
    Always,
}

impl std::str::FromStr for ClearPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_success" | "on-success" => Ok(Self::OnSuccess),
            "always" => Ok(Self::Always),
            _ => Err(format!(
                "invalid clear policy '{}', expected on-success or always",
                s
            )),
        }
    }
}

/// Project both selections to their identifier sequences, in selection order.
pub fn build_request(
    tasks: &SelectionSet<Task>,
    employees: &SelectionSet<Employee>,
) -> MappingRequest {
    MappingRequest {
        employee_ids: employees.ids(),
        task_ids: tasks.ids(),
    }
}

/// Sends the current selections as one mapping request.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingSubmitter {
    policy: ClearPolicy,
}

impl MappingSubmitter {
    pub fn new(policy: ClearPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ClearPolicy {
        self.policy
    }

    /// Submit the selections and apply the clear policy to the outcome.
    ///
    /// Empty selections are sent as-is; rejecting an incomplete pairing is
    /// the backend's decision.
    pub async fn submit(
        &self,
        client: &BoardClient,
        tasks: &mut SelectionSet<Task>,
        employees: &mut SelectionSet<Employee>,
    ) -> Result<MappingAck, ClientError> {
        let request = build_request(tasks, employees);
        tracing::debug!(
            employees = request.employee_ids.len(),
            tasks = request.task_ids.len(),
            "submitting task mapping"
        );

        let result = client.map_tasks(&request).await;
        self.settle(&request, &result, tasks, employees);
        match &result {
            Ok(_) => tracing::info!(
                employees = ?request.employee_ids,
                tasks = ?request.task_ids,
                "task mapping accepted"
            ),
            Err(e) => tracing::error!(error = %e, "task mapping failed"),
        }
        result
    }

    /// Apply the clear policy to a finished submission of `request`.
    ///
    /// Only the ids that were sent are removed; anything selected while the
    /// request was in flight stays selected.
    pub fn settle<T>(
        &self,
        request: &MappingRequest,
        result: &Result<T, ClientError>,
        tasks: &mut SelectionSet<Task>,
        employees: &mut SelectionSet<Employee>,
    ) {
        let clear = match self.policy {
            ClearPolicy::OnSuccess => result.is_ok(),
            ClearPolicy::Always => true,
        };
        if clear {
            for id in &request.task_ids {
                tasks.remove(*id);
            }
            for id in &request.employee_ids {
                employees.remove(*id);
            }
        }
    }
}
