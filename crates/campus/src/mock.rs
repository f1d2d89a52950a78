use super::types::{Assignment, AssignmentStatus, EventItem, ScheduleItem, ScheduleKind};

fn schedule_item(
    id: &str,
    time: &str,
    title: &str,
    location: &str,
    kind: ScheduleKind,
) -> ScheduleItem {
    ScheduleItem {
        id: id.to_string(),
        time: time.to_string(),
        title: title.to_string(),
        location: location.to_string(),
        kind,
    }
}

fn event_item(id: &str, date: &str, title: &str, description: &str) -> EventItem {
    EventItem {
        id: id.to_string(),
        date: date.to_string(),
        title: title.to_string(),
        description: description.to_string(),
    }
}

fn assignment(
    id: &str,
    title: &str,
    course: &str,
    due: &str,
    status: AssignmentStatus,
) -> Assignment {
    Assignment {
        id: id.to_string(),
        title: title.to_string(),
        course: course.to_string(),
        due: due.to_string(),
        status,
    }
}

/// Today's classes.
pub fn mock_schedule() -> Vec<ScheduleItem> {
    vec![
        schedule_item("1", "09:00 - 10:30", "Calculus II", "Room A-101", ScheduleKind::Lecture),
        schedule_item(
            "2",
            "11:00 - 12:30",
            "Introduction to Programming",
            "Lab C-02",
            ScheduleKind::Lab,
        ),
        schedule_item(
            "3",
            "14:00 - 15:30",
            "Academic English",
            "Room B-205",
            ScheduleKind::Seminar,
        ),
        schedule_item("4", "16:00 - 17:30", "Physics I", "Room A-102", ScheduleKind::Lecture),
    ]
}

pub fn mock_events() -> Vec<EventItem> {
    vec![
        event_item(
            "e1",
            "Oct 26",
            "Midterm Exams Begin",
            "The official start of the midterm examination period for the fall semester.",
        ),
        event_item(
            "e2",
            "Nov 02",
            "Guest Lecture: AI in Modern Science",
            "A special lecture by Dr. Evelyn Reed on the impact of Artificial Intelligence.",
        ),
        event_item(
            "e3",
            "Nov 10",
            "University Tech Fair",
            "Explore opportunities and new technologies from leading tech companies on campus.",
        ),
        event_item(
            "e4",
            "Nov 15",
            "Course Registration for Spring Semester",
            "Registration opens for all students for the upcoming spring semester courses.",
        ),
    ]
}

pub fn mock_assignments() -> Vec<Assignment> {
    vec![
        assignment("a1", "Problem Set 3", "Calculus II", "3 days left", AssignmentStatus::InProgress),
        assignment("a2", "Lab Report 1", "Physics I", "5 days left", AssignmentStatus::ToDo),
        assignment("a3", "Essay Draft", "Academic English", "1 week left", AssignmentStatus::ToDo),
        assignment(
            "a4",
            "Final Project Proposal",
            "Intro to Programming",
            "2 weeks left",
            AssignmentStatus::ToDo,
        ),
        assignment("a5", "Quiz 2", "Calculus II", "Completed", AssignmentStatus::Completed),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn mock_ids_are_unique_per_view() {
        let schedule = mock_schedule().into_iter().map(|item| item.id).collect::<HashSet<_>>();
        let events = mock_events().into_iter().map(|item| item.id).collect::<HashSet<_>>();
        let assignments = mock_assignments()
            .into_iter()
            .map(|item| item.id)
            .collect::<HashSet<_>>();

        assert_eq!(schedule.len(), 4);
        assert_eq!(events.len(), 4);
        assert_eq!(assignments.len(), 5);
    }
}
