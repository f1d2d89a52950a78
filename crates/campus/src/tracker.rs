use snafu::OptionExt;

use super::error::{AssignmentNotFoundSnafu, CampusResult};
use super::mock::mock_assignments;
use super::types::{Assignment, AssignmentStatus};

/// In-memory assignment list whose only edit is a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracker {
    assignments: Vec<Assignment>,
}

impl Tracker {
    pub fn new(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn get(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|assignment| assignment.id == id)
    }

    /// Sets the status of the assignment with `id`, returning the previous one.
    pub fn set_status(&mut self, id: &str, status: AssignmentStatus) -> CampusResult<AssignmentStatus> {
        let assignment = self
            .assignments
            .iter_mut()
            .find(|assignment| assignment.id == id)
            .context(AssignmentNotFoundSnafu {
                stage: "tracker-set-status",
                id,
            })?;

        let previous = std::mem::replace(&mut assignment.status, status);
        tracing::debug!(
            assignment_id = %id,
            from = %previous,
            to = %status,
            "assignment status changed"
        );
        Ok(previous)
    }

    pub fn count_with_status(&self, status: AssignmentStatus) -> usize {
        self.assignments
            .iter()
            .filter(|assignment| assignment.status == status)
            .count()
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(mock_assignments())
    }
}
