//! Subcommand handlers: thin glue between clap arguments and [`SchoolApi`].

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Utc};
use clap::Subcommand;
use edutage_client::SchoolApi;
use edutage_types::{
    AssignTeacherRequest, CreateClassRequest, CreateEventRequest, CreateRoomRequest,
    CreateSubjectRequest, EventCategory, LoginRequest, UpdateClassRequest, UpdateRoomRequest,
};
use serde::Serialize;

#[derive(Subcommand)]
pub enum ClassesCommand {
    /// List every class in the school.
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        grade_level: String,
        #[arg(long)]
        room_assignment_id: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        grade_level: Option<String>,
        #[arg(long)]
        room_assignment_id: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum RoomsCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        /// Room kind, e.g. CLASSROOM or LABORATORY.
        #[arg(long = "type")]
        room_type: String,
        #[arg(long)]
        capacity: Option<u32>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        room_type: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SubjectsCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        grade_level: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Assign a teacher (by profile id) to a subject in a class.
    AssignTeacher {
        #[arg(long)]
        class_id: String,
        #[arg(long)]
        subject_id: String,
        #[arg(long)]
        teacher_profile_id: String,
        #[arg(long)]
        session_start_time: Option<String>,
        #[arg(long)]
        session_end_time: Option<String>,
        /// 0 = Sunday .. 6 = Saturday.
        #[arg(long)]
        day_of_week: Option<u8>,
    },
}

#[derive(Subcommand)]
pub enum EventsCommand {
    /// List events for a month (defaults to the current one).
    List {
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// RFC 3339 timestamp, e.g. 2026-09-01T08:00:00Z.
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        end: DateTime<Utc>,
        #[arg(long)]
        all_day: bool,
        /// Academic, Holiday, Meeting, Sports, or Other.
        #[arg(long, default_value = "Academic")]
        category: String,
    },
}

pub async fn login(api: &SchoolApi, email: String, password: String) -> Result<()> {
    let auth = api.login(&LoginRequest { email, password }).await?;
    println!(
        "Signed in as {} ({}) at {}.",
        auth.user.full_name(),
        auth.user.position,
        auth.school.name
    );
    Ok(())
}

pub fn logout(api: &SchoolApi) -> Result<()> {
    api.logout()?;
    println!("Signed out.");
    Ok(())
}

pub fn whoami(api: &SchoolApi, json: bool) -> Result<()> {
    match api.session_store().session() {
        Some(session) => {
            if json {
                emit_json(&session.identity)?;
            } else {
                println!(
                    "{} <{}> — {} at {}",
                    session.identity.full_name(),
                    session.identity.email,
                    session.identity.position,
                    session.school.name
                );
            }
            Ok(())
        }
        None => bail!("not signed in"),
    }
}

pub async fn analytics(api: &SchoolApi, json: bool) -> Result<()> {
    let analytics = api.analytics().await?;
    if json {
        return emit_json(&analytics);
    }
    let admin = &analytics.administrative_summary;
    println!("{}", analytics.school_name);
    println!(
        "  classes: {}  students: {}  teachers: {}  admins: {}  parents: {}",
        admin.total_classes,
        admin.total_students,
        admin.total_teachers,
        admin.total_admins,
        admin.total_parents
    );
    let attendance = &analytics.performance_summary.attendance;
    println!(
        "  attendance: {:.1}% across {} sessions",
        attendance.school_average_attendance_rate * 100.0,
        attendance.total_recorded_attendance_sessions
    );
    let grading = &analytics.performance_summary.grading;
    println!(
        "  grading: {:.1} average over {} graded submissions",
        grading.overall_school_average_grade, grading.total_submissions_graded
    );
    Ok(())
}

pub async fn classes(api: &SchoolApi, command: ClassesCommand, json: bool) -> Result<()> {
    match command {
        ClassesCommand::List => {
            let classes = api.classes().await?;
            if json {
                return emit_json(&classes);
            }
            for class in &classes {
                println!(
                    "{}  {} ({}) — {} students{}",
                    class.id,
                    class.name,
                    class.grade_level,
                    class.students_enrolled,
                    class
                        .room_name
                        .as_deref()
                        .map(|room| format!(", room {room}"))
                        .unwrap_or_default()
                );
            }
            summarize(classes.len(), "class", "classes");
            Ok(())
        }
        ClassesCommand::Create {
            name,
            grade_level,
            room_assignment_id,
        } => {
            let class = api
                .create_class(&CreateClassRequest {
                    name,
                    grade_level,
                    room_assignment_id,
                })
                .await?;
            if json {
                return emit_json(&class);
            }
            println!("Created class {} ({}).", class.name, class.id);
            Ok(())
        }
        ClassesCommand::Update {
            id,
            name,
            grade_level,
            room_assignment_id,
        } => {
            let class = api
                .update_class(
                    &id,
                    &UpdateClassRequest {
                        name,
                        grade_level,
                        room_assignment_id,
                    },
                )
                .await?;
            if json {
                return emit_json(&class);
            }
            println!("Updated class {} ({}).", class.name, class.id);
            Ok(())
        }
        ClassesCommand::Delete { id } => {
            let response = api.delete_class(&id).await?;
            println!("Deleted class {}.", response.id);
            Ok(())
        }
    }
}

pub async fn rooms(api: &SchoolApi, command: RoomsCommand, json: bool) -> Result<()> {
    match command {
        RoomsCommand::List => {
            let rooms = api.rooms().await?;
            if json {
                return emit_json(&rooms);
            }
            for room in &rooms {
                println!(
                    "{}  {} [{}]{}",
                    room.id,
                    room.name,
                    room.room_type,
                    room.capacity
                        .map(|capacity| format!(" — seats {capacity}"))
                        .unwrap_or_default()
                );
            }
            summarize(rooms.len(), "room", "rooms");
            Ok(())
        }
        RoomsCommand::Create {
            name,
            room_type,
            capacity,
        } => {
            let school_id = current_school_id(api)?;
            let room = api
                .create_room(&CreateRoomRequest {
                    name,
                    room_type,
                    capacity,
                    school_id,
                })
                .await?;
            if json {
                return emit_json(&room);
            }
            println!("Created room {} ({}).", room.name, room.id);
            Ok(())
        }
        RoomsCommand::Update {
            id,
            name,
            room_type,
            capacity,
        } => {
            let room = api
                .update_room(
                    &id,
                    &UpdateRoomRequest {
                        name,
                        room_type,
                        capacity,
                    },
                )
                .await?;
            if json {
                return emit_json(&room);
            }
            println!("Updated room {} ({}).", room.name, room.id);
            Ok(())
        }
        RoomsCommand::Delete { id } => {
            let response = api.delete_room(&id).await?;
            println!("Deleted room {}.", response.id);
            Ok(())
        }
    }
}

pub async fn subjects(api: &SchoolApi, command: SubjectsCommand, json: bool) -> Result<()> {
    match command {
        SubjectsCommand::List => {
            let subjects = api.subjects().await?;
            if json {
                return emit_json(&subjects);
            }
            for subject in &subjects {
                println!(
                    "{}  {} ({}) — {} classes, {} teachers",
                    subject.id,
                    subject.name,
                    subject.grade_level,
                    subject.total_classes_taught,
                    subject.total_teachers_assigned
                );
            }
            summarize(subjects.len(), "subject", "subjects");
            Ok(())
        }
        SubjectsCommand::Create {
            name,
            grade_level,
            description,
        } => {
            let response = api
                .create_subject(&CreateSubjectRequest {
                    name,
                    grade_level,
                    description,
                })
                .await?;
            if json {
                return emit_json(&response);
            }
            println!("{} ({}).", response.message, response.subject.id);
            Ok(())
        }
        SubjectsCommand::AssignTeacher {
            class_id,
            subject_id,
            teacher_profile_id,
            session_start_time,
            session_end_time,
            day_of_week,
        } => {
            let response = api
                .assign_teacher(&AssignTeacherRequest {
                    class_id,
                    subject_id,
                    teacher_profile_id,
                    session_start_time,
                    session_end_time,
                    day_of_week,
                })
                .await?;
            if json {
                return emit_json(&response);
            }
            println!(
                "Assigned {} to {} in {}.",
                response.assignment.teacher, response.assignment.subject, response.assignment.class
            );
            Ok(())
        }
    }
}

pub async fn events(api: &SchoolApi, command: EventsCommand, json: bool) -> Result<()> {
    match command {
        EventsCommand::List { month, year } => {
            let now = Utc::now();
            let month = month.unwrap_or_else(|| now.month());
            let year = year.unwrap_or_else(|| now.year());
            let events = api.events(month, year).await?;
            if json {
                return emit_json(&events);
            }
            for event in &events {
                println!(
                    "{}  {:?}  {}{}",
                    event.start_date.format("%Y-%m-%d"),
                    event.category,
                    event.title,
                    if event.is_all_day { " (all day)" } else { "" }
                );
            }
            summarize(events.len(), "event", "events");
            Ok(())
        }
        EventsCommand::Create {
            title,
            description,
            start,
            end,
            all_day,
            category,
        } => {
            let event = api
                .create_event(&CreateEventRequest {
                    title,
                    description,
                    start_date: start,
                    end_date: end,
                    is_all_day: all_day,
                    category: parse_category(&category)?,
                })
                .await?;
            if json {
                return emit_json(&event);
            }
            println!("Created event '{}' ({}).", event.title, event.id);
            Ok(())
        }
    }
}

pub async fn teachers(api: &SchoolApi, json: bool) -> Result<()> {
    let teachers = api.teachers().await?;
    if json {
        return emit_json(&teachers);
    }
    for teacher in &teachers {
        println!(
            "{}  {} <{}> — {} classes",
            teacher.profile_id, teacher.name, teacher.email, teacher.total_classes
        );
    }
    summarize(teachers.len(), "teacher", "teachers");
    Ok(())
}

pub async fn students(api: &SchoolApi, json: bool) -> Result<()> {
    let students = api.students().await?;
    if json {
        return emit_json(&students);
    }
    for student in &students {
        println!(
            "{}  {} ({}){}",
            student.profile_id,
            student.name,
            student.current_grade_level,
            student
                .class
                .as_ref()
                .map(|class| format!(" — {}", class.name))
                .unwrap_or_default()
        );
    }
    summarize(students.len(), "student", "students");
    Ok(())
}

fn current_school_id(api: &SchoolApi) -> Result<String> {
    api.session_store()
        .session()
        .map(|session| session.school.id)
        .context("not signed in; run `edutage login` first")
}

fn parse_category(raw: &str) -> Result<EventCategory> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .with_context(|| format!("unknown event category '{raw}'"))
}

fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn summarize(count: usize, singular: &str, plural: &str) {
    let noun = if count == 1 { singular } else { plural };
    println!("{count} {noun}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_categories_parse_by_name() {
        assert_eq!(parse_category("Sports").expect("known"), EventCategory::Sports);
        assert!(parse_category("Carnival").is_err());
    }
}
