//! Sample issue-tracker stories served to authenticated users.
//!
//! The board is seeded at startup and never changes.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StoryStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub status: StoryStatus,
    pub priority: Priority,
    pub points: u32,
}

impl Story {
    fn new(id: &str, title: &str, status: StoryStatus, priority: Priority, points: u32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            status,
            priority,
            points,
        }
    }
}

pub fn seed_stories() -> Vec<Story> {
    vec![
        Story::new("PROJ-123", "Refactor user authentication module", StoryStatus::InProgress, Priority::High, 8),
        Story::new("PROJ-124", "Design new dashboard UI components", StoryStatus::ToDo, Priority::Medium, 5),
        Story::new("PROJ-125", "Fix API endpoint for user profiles", StoryStatus::Done, Priority::High, 3),
        Story::new("PROJ-126", "Implement two-factor authentication (2FA)", StoryStatus::Blocked, Priority::Critical, 13),
        Story::new("PROJ-127", "Write documentation for the payment gateway", StoryStatus::ToDo, Priority::Low, 5),
    ]
}

pub async fn list_stories(user: CurrentUser, state: web::Data<AppState>) -> HttpResponse {
    tracing::debug!("Listing stories for {}", user.email);
    HttpResponse::Ok().json(state.stories.as_slice())
}
