use serde::{Deserialize, Serialize};

use super::{EmployeeId, TaskId};

/// Bulk assignment payload for `POST /maptasks`.
///
/// The two sequences are sent as-is; how employees are paired with tasks is
/// decided by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingRequest {
    #[serde(rename = "empId")]
    pub employee_ids: Vec<EmployeeId>,
    #[serde(rename = "taskId")]
    pub task_ids: Vec<TaskId>,
}

impl MappingRequest {
    pub fn is_empty(&self) -> bool {
        self.employee_ids.is_empty() && self.task_ids.is_empty()
    }
}

/// Whatever the backend answers to a mapping request. Not interpreted.
pub type MappingAck = serde_json::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_backend_field_names() {
        let request = MappingRequest {
            employee_ids: vec![EmployeeId(1), EmployeeId(2)],
            task_ids: vec![TaskId(9)],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "empId": [1, 2], "taskId": [9] }));
    }
}
