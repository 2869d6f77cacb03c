use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A single normalized search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// The fixed classification taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Productivity,
    Health,
    Creativity,
}

impl Category {
    /// Every label, in the order buckets are flattened and reported.
    pub const ALL: [Category; 3] = [
        Category::Productivity,
        Category::Health,
        Category::Creativity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Productivity => "productivity",
            Category::Health => "health",
            Category::Creativity => "creativity",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search hits partitioned into the three categories.
///
/// Every category is always present, so there is no way to build a partial
/// categorization. The fallback value is [`CategorizedResult::empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorizedResult {
    pub productivity: Vec<SearchHit>,
    pub health: Vec<SearchHit>,
    pub creativity: Vec<SearchHit>,
}

impl CategorizedResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bucket(&self, category: Category) -> &[SearchHit] {
        match category {
            Category::Productivity => &self.productivity,
            Category::Health => &self.health,
            Category::Creativity => &self.creativity,
        }
    }

    pub fn bucket_mut(&mut self, category: Category) -> &mut Vec<SearchHit> {
        match category {
            Category::Productivity => &mut self.productivity,
            Category::Health => &mut self.health,
            Category::Creativity => &mut self.creativity,
        }
    }

    /// All hits in category order, then insertion order within a bucket
    pub fn flattened(&self) -> impl Iterator<Item = &SearchHit> {
        Category::ALL
            .into_iter()
            .flat_map(move |category| self.bucket(category).iter())
    }

    pub fn total_hits(&self) -> usize {
        Category::ALL
            .iter()
            .map(|&category| self.bucket(category).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_hits() == 0
    }
}

/// Externally supplied personalization profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    /// Expected to name a category; anything else is ignored
    #[serde(default, deserialize_with = "interest_or_empty")]
    pub interest: String,
}

/// Interests are never validated: null or non-string values read as empty
fn interest_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(interest)) => Ok(interest),
        _ => Ok(String::new()),
    }
}

impl UserProfile {
    pub fn new(id: impl Into<String>, interest: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            interest: interest.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Newsletter {
    pub content: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolVault {
    pub updates: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Forum {
    pub topics: Vec<String>,
}

/// Snippet knowledge base keyed by category label, plus one entry per
/// matched profile.
///
/// Keys serialize in insertion order so the three category keys always lead.
/// Replacing an entry keeps the key's position.
pub type KnowledgeBase = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoachingBot {
    pub knowledge_base: KnowledgeBase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub theme: Category,
    pub materials: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workshops {
    pub sessions: Vec<Session>,
}

/// Everything one cycle produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputBundle {
    pub newsletter: Newsletter,
    pub tool_vault: ToolVault,
    pub forum: Forum,
    pub coaching_bot: CoachingBot,
    pub workshops: Workshops,
}
