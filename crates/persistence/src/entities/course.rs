//! Course entity (database row mapping).

use domain::models::Course;
use sqlx::FromRow;

/// Database row mapping for the courses table.
#[derive(Debug, Clone, FromRow)]
pub struct CourseEntity {
    pub id: String,
    pub title: String,
    pub telegram_group_link: Option<String>,
}

impl From<CourseEntity> for Course {
    fn from(entity: CourseEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            telegram_group_link: entity.telegram_group_link,
        }
    }
}
