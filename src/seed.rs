//! Demo data set: one manager, three engineers, three projects, four assignments.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::auth::password;
use crate::db;
use crate::db::assignments::NewAssignment;
use crate::db::projects::NewProject;
use crate::db::users::NewUser;
use crate::models::{Priority, ProjectStatus, Role, Seniority};

pub const DEMO_PASSWORD: &str = "password123";
pub const DEMO_MANAGER_EMAIL: &str = "manager@demo.com";

#[derive(Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted {
        users: usize,
        projects: usize,
        assignments: usize,
    },
    AlreadySeeded,
}

struct DemoEngineer {
    email: &'static str,
    name: &'static str,
    skills: &'static str,
    seniority: Seniority,
}

const ENGINEERS: [DemoEngineer; 3] = [
    DemoEngineer {
        email: "engineer@demo.com",
        name: "Alex Chen",
        skills: "React, Node.js, PostgreSQL",
        seniority: Seniority::Senior,
    },
    DemoEngineer {
        email: "john.smith@demo.com",
        name: "John Smith",
        skills: "Python, Django, AWS",
        seniority: Seniority::Mid,
    },
    DemoEngineer {
        email: "emma.davis@demo.com",
        name: "Emma Davis",
        skills: "JavaScript, Vue.js, MongoDB",
        seniority: Seniority::Junior,
    },
];

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, sqlx::Error> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| sqlx::Error::Protocol(format!("invalid seed date {y}-{m}-{d}")))
}

/// Insert the demo data in one transaction unless the demo manager exists.
pub async fn run(pool: &PgPool) -> Result<SeedOutcome, sqlx::Error> {
    if db::users::find_by_email(pool, DEMO_MANAGER_EMAIL).await?.is_some() {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let pw_hash = password::hash(DEMO_PASSWORD).map_err(sqlx::Error::Protocol)?;
    let mut tx = pool.begin().await?;

    let manager = db::users::create(
        &mut *tx,
        &NewUser {
            email: DEMO_MANAGER_EMAIL,
            password_hash: &pw_hash,
            name: "Sarah Johnson",
            role: Role::Manager,
            skills: None,
            seniority: None,
            hourly_capacity: 8,
        },
    )
    .await?;

    let mut engineers = Vec::with_capacity(ENGINEERS.len());
    for e in &ENGINEERS {
        let user = db::users::create(
            &mut *tx,
            &NewUser {
                email: e.email,
                password_hash: &pw_hash,
                name: e.name,
                role: Role::Engineer,
                skills: Some(e.skills),
                seniority: Some(e.seniority),
                hourly_capacity: 8,
            },
        )
        .await?;
        engineers.push(user.id);
    }

    let projects = [
        (
            "E-Commerce Platform Redesign",
            "Complete redesign of the company e-commerce platform with modern React architecture",
            date(2025, 1, 15)?,
            Some(date(2025, 4, 15)?),
            Priority::High,
            ProjectStatus::InProgress,
        ),
        (
            "Mobile API Development",
            "Develop RESTful APIs for the new mobile application",
            date(2025, 2, 1)?,
            Some(date(2025, 5, 1)?),
            Priority::Medium,
            ProjectStatus::InProgress,
        ),
        (
            "Data Analytics Dashboard",
            "Create internal dashboard for data analytics and reporting",
            date(2025, 3, 1)?,
            None,
            Priority::Low,
            ProjectStatus::Planning,
        ),
    ];

    let mut project_ids = Vec::with_capacity(projects.len());
    for (name, description, start_date, end_date, priority, status) in projects {
        let project = db::projects::create(
            &mut *tx,
            &NewProject {
                name,
                description: Some(description),
                start_date,
                end_date,
                priority,
                status,
                manager_id: manager.id,
            },
        )
        .await?;
        project_ids.push(project.id);
    }

    let assignments = [
        (0usize, 0usize, 6, date(2025, 1, 15)?, date(2025, 4, 15)?, "Lead frontend development"),
        (1, 1, 8, date(2025, 2, 1)?, date(2025, 5, 1)?, "API architecture and development"),
        (2, 0, 4, date(2025, 1, 15)?, date(2025, 4, 15)?, "UI component development"),
        (0, 1, 2, date(2025, 2, 15)?, date(2025, 3, 15)?, "Technical consultation"),
    ];

    for (engineer, project, hours, start_date, end_date, notes) in assignments {
        db::assignments::create(
            &mut *tx,
            &NewAssignment {
                user_id: engineers[engineer],
                project_id: project_ids[project],
                allocated_hours: hours,
                start_date,
                end_date: Some(end_date),
                notes: Some(notes),
            },
        )
        .await?;
    }

    tx.commit().await?;

    Ok(SeedOutcome::Inserted {
        users: 1 + engineers.len(),
        projects: project_ids.len(),
        assignments: assignments.len(),
    })
}
