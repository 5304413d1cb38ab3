use thiserror::Error;

use crate::text_enum;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} \"{value}\"")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

text_enum!(
    pub enum ExerciseType {
        Running => "running",
        Gym => "gym",
    }
);

text_enum!(
    /// How hard a missed weekly target hits the team's HP
    pub enum Strictness {
        Relaxed => "relaxed",
        Normal => "normal",
        Strict => "strict",
    }
);

impl Strictness {
    /// HP change applied to a member who missed the weekly target
    pub const fn miss_penalty(&self) -> i64 {
        match self {
            Strictness::Relaxed => -10,
            Strictness::Normal => -15,
            Strictness::Strict => -25,
        }
    }
}

impl Default for Strictness {
    fn default() -> Self {
        Strictness::Normal
    }
}

text_enum!(
    pub enum TeamStatus {
        Forming => "forming",
        Active => "active",
        Completed => "completed",
        Disbanded => "disbanded",
    }
);

impl TeamStatus {
    /// Statuses in which a membership still binds the user to the team
    pub const LIVE: [TeamStatus; 2] = [TeamStatus::Forming, TeamStatus::Active];

    pub fn is_live(&self) -> bool {
        Self::LIVE.contains(self)
    }
}

text_enum!(
    pub enum Role {
        Leader => "leader",
        Member => "member",
    }
);

text_enum!(
    pub enum ActivityStatus {
        InProgress => "in_progress",
        Completed => "completed",
    }
);

text_enum!(
    /// Moderation state of an activity. Rejected activities never count towards a target.
    pub enum ReviewStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

text_enum!(
    pub enum Gender {
        Male => "male",
        Female => "female",
        Other => "other",
    }
);

impl Default for Gender {
    fn default() -> Self {
        Gender::Other
    }
}

text_enum!(
    pub enum Chronotype {
        Morning => "morning",
        Night => "night",
        Both => "both",
    }
);

impl Default for Chronotype {
    fn default() -> Self {
        Chronotype::Both
    }
}
