#![deny(unsafe_code)]

//! Static campus views: schedule, upcoming events, assignment tracker.

pub mod error;
pub mod mock;
pub mod tracker;
pub mod types;

pub use error::{CampusError, CampusResult};
pub use mock::{mock_assignments, mock_events, mock_schedule};
pub use tracker::Tracker;
pub use types::{Assignment, AssignmentStatus, EventItem, ScheduleItem, ScheduleKind, View};
