use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog identifier. Gateways emit either JSON strings or integers; both
/// land in the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawLessonId", into = "String")]
pub struct LessonId(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLessonId {
    Text(String),
    Number(i64),
}

impl From<RawLessonId> for LessonId {
    fn from(value: RawLessonId) -> Self {
        match value {
            RawLessonId::Text(text) => Self(text),
            RawLessonId::Number(number) => Self(number.to_string()),
        }
    }
}

impl From<LessonId> for String {
    fn from(value: LessonId) -> Self {
        value.0
    }
}

impl From<&str> for LessonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for LessonId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(alias = "_id")]
    pub id: LessonId,
    pub subject: String,
    pub location: String,
    pub price: f64,
    pub spaces: u32,
}

impl Lesson {
    pub fn is_available(&self) -> bool {
        self.spaces > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    /// Added locally, gateway confirmation still outstanding.
    #[default]
    Pending,
    Confirmed,
    /// The gateway call failed; the server never reserved this unit.
    Unconfirmed,
}

/// One unit of a lesson held in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub lesson_id: LessonId,
    pub subject: String,
    pub location: String,
    pub price: f64,
    #[serde(default)]
    pub status: LineStatus,
}

impl CartLine {
    pub fn snapshot_of(lesson: &Lesson) -> Self {
        Self {
            lesson_id: lesson.id.clone(),
            subject: lesson.subject.clone(),
            location: lesson.location.clone(),
            price: lesson.price,
            status: LineStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub lesson_id: LessonId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
}
