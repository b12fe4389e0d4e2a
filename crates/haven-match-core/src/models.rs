//! Core data models for the mentor-matching pipeline.
//!
//! Mentors deserialize from either export of the hosted mentor tables: the
//! nested one (`mentor_internships`, `mentor_struggles`, `groups`) or the
//! flat one (`company_org`, `struggle_area`, `group_name_1`, ...).

use serde::{Deserialize, Deserializer, Serialize};

/// Who a mentor is on campus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentorRole {
    Student,
    Senior,
    Alumni,
    Professor,
}

impl MentorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MentorRole::Student => "student",
            MentorRole::Senior => "senior",
            MentorRole::Alumni => "alumni",
            MentorRole::Professor => "professor",
        }
    }
}

/// A mentor profile together with its internship and struggle sub-records.
///
/// Owned by the mentor tables; the matching pipeline only reads it.
/// Deserialization goes through `MentorRecord`, so both the nested export
/// and the flat one-row-per-mentor export are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MentorRecord")]
pub struct Mentor {
    pub id: String,
    pub name: String,
    pub role: Option<MentorRole>,
    pub bio: Option<String>,
    pub mentoring_style: Option<String>,
    pub confident_queries: Vec<String>,
    pub internships: Vec<Internship>,
    pub struggles: Vec<Struggle>,
    pub groups: Vec<String>,
}

/// Wire shape of a mentor row.
///
/// Nested fields take the names of the hosted tables (`user_type`,
/// `bio_for_profile`, `mentor_internships`, ...). The flat columns
/// (`company_org`, `internship_role_position`, `struggle_area`,
/// `group_name_1`, ...) describe at most one internship, one struggle and
/// two groups, and are folded into the lists.
#[derive(Debug, Deserialize)]
struct MentorRecord {
    #[serde(default, alias = "mentor_id")]
    id: String,
    name: String,
    #[serde(default, alias = "user_type")]
    role: Option<MentorRole>,
    #[serde(default, alias = "bio_for_profile")]
    bio: Option<String>,
    #[serde(default)]
    mentoring_style: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    confident_queries: Vec<String>,
    #[serde(default, alias = "mentor_internships", deserialize_with = "nullable_vec")]
    internships: Vec<Internship>,
    #[serde(default, alias = "mentor_struggles", deserialize_with = "nullable_vec")]
    struggles: Vec<Struggle>,
    #[serde(default, deserialize_with = "nullable_vec")]
    groups: Vec<String>,

    #[serde(default)]
    company_org: Option<String>,
    #[serde(default)]
    internship_role_position: Option<String>,
    #[serde(default)]
    struggle_area: Option<String>,
    #[serde(default)]
    struggle_situation_description: Option<String>,
    #[serde(default)]
    struggle_advice_to_junior: Option<String>,
    #[serde(default)]
    group_name_1: Option<String>,
    #[serde(default)]
    group_name_2: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<MentorRecord> for Mentor {
    fn from(r: MentorRecord) -> Self {
        let mut internships = r.internships;
        let company_org = non_blank(r.company_org);
        let role_position = non_blank(r.internship_role_position);
        if company_org.is_some() || role_position.is_some() {
            internships.push(Internship {
                company_org,
                role_position,
            });
        }

        let mut struggles = r.struggles;
        let area = non_blank(r.struggle_area);
        let situation_description = non_blank(r.struggle_situation_description);
        if area.is_some() || situation_description.is_some() {
            struggles.push(Struggle {
                area,
                situation_description,
                advice_to_junior: non_blank(r.struggle_advice_to_junior),
            });
        }

        let mut groups = r.groups;
        for group in [r.group_name_1, r.group_name_2].into_iter().filter_map(non_blank) {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }

        Mentor {
            id: r.id,
            name: r.name,
            role: r.role,
            bio: r.bio,
            mentoring_style: r.mentoring_style,
            confident_queries: r.confident_queries,
            internships,
            struggles,
            groups,
        }
    }
}

/// An internship a mentor has held.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Internship {
    #[serde(default)]
    pub company_org: Option<String>,
    #[serde(default)]
    pub role_position: Option<String>,
}

/// A struggle a mentor went through, with advice for juniors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Struggle {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub situation_description: Option<String>,
    #[serde(default)]
    pub advice_to_junior: Option<String>,
}

/// The stored embedding for one mentor. At most one exists per mentor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorEmbedding {
    pub mentor_id: String,
    #[serde(rename = "embedding_source_text")]
    pub source_text: String,
    pub embedding: Vec<f32>,
    pub model: String,
    /// SHA-256 of `source_text`, used to detect stale embeddings.
    pub source_hash: String,
    /// Unix timestamp (seconds) of the last write.
    pub updated_at: i64,
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
