use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CampusError {
    #[snafu(display("assignment '{id}' was not found"))]
    AssignmentNotFound { stage: &'static str, id: String },
    #[snafu(display(
        "unknown assignment status '{raw}', expected one of: To Do, In Progress, Completed"
    ))]
    UnknownStatus { stage: &'static str, raw: String },
}

pub type CampusResult<T> = Result<T, CampusError>;
