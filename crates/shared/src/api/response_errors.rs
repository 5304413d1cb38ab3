use thiserror::Error;

use super::error::{ErrorKind, ServerError};

macro_rules! response_error {
    ($name:ident {
        $(
            #[code($kind:ident, $code:literal)]
            #[error($($message:tt)*)]
            $variant:ident
            $({ $($field:ident : $field_ty:ty),* $(,)? })?
        ,)*
    }) => {
        #[derive(Debug, Clone, PartialEq, Error)]
        pub enum $name {
            $(
                #[error($($message)*)]
                $variant $({ $($field: $field_ty),* })?,
            )*
        }

        impl $name {
            pub const fn kind(&self) -> ErrorKind {
                match self {
                    $( $name::$variant { .. } => ErrorKind::$kind, )*
                }
            }

            pub const fn code(&self) -> &'static str {
                match self {
                    $( $name::$variant { .. } => $code, )*
                }
            }
        }

        impl From<$name> for ServerError {
            fn from(inner: $name) -> Self {
                ServerError::new(inner.kind(), inner.code(), inner.to_string())
            }
        }
    };
}

response_error!(AuthError {
    #[code(Unauthenticated, "unauthorized")]
    #[error("Missing bearer token")]
    MissingCredential,
    #[code(Unauthenticated, "unauthorized")]
    #[error("Invalid bearer token")]
    InvalidCredential,
    #[code(Unauthenticated, "unauthorized")]
    #[error("Invalid cron secret")]
    InvalidCronSecret,
});

response_error!(UserError {
    #[code(NotFound, "user_not_found")]
    #[error("User profile not found")]
    NotFound,
    #[code(Conflict, "user_already_exists")]
    #[error("User profile already exists")]
    AlreadyRegistered,
    #[code(InvalidInput, "invalid_request")]
    #[error("{message}")]
    Invalid { message: String },
});

response_error!(TeamError {
    #[code(NotFound, "team_not_found")]
    #[error("Team not found")]
    NotFound,
    #[code(NotFound, "no_team")]
    #[error("Not a member of any team")]
    NoTeam,
    #[code(Forbidden, "not_team_member")]
    #[error("Not a member of this team")]
    NotMember,
    #[code(Forbidden, "not_leader")]
    #[error("Only the team leader can do this")]
    NotLeader,
    #[code(Conflict, "already_in_team")]
    #[error("Already a member of a forming or active team")]
    AlreadyInTeam,
    #[code(Unprocessable, "team_not_forming")]
    #[error("Team is no longer accepting members")]
    NotForming,
    #[code(Unprocessable, "team_full")]
    #[error("Team already has {max} members")]
    Full { max: i64 },
    #[code(Unprocessable, "team_not_ready")]
    #[error("Team needs {max} members first")]
    NotReady { max: i64 },
    #[code(Unprocessable, "team_not_active")]
    #[error("Team has not started yet")]
    NotActive,
    #[code(InvalidInput, "team_closed")]
    #[error("Team is {status}")]
    Closed { status: String },
    #[code(InvalidInput, "invalid_request")]
    #[error("{message}")]
    Invalid { message: String },
});

response_error!(InviteError {
    #[code(NotFound, "code_not_found")]
    #[error("Invite code not found")]
    CodeNotFound,
    #[code(Gone, "code_expired")]
    #[error("Invite code expired")]
    CodeExpired,
    #[code(Unprocessable, "user_not_registered")]
    #[error("Create a user profile before joining a team")]
    UserNotRegistered,
    #[code(Internal, "code_generation_failed")]
    #[error("Could not find a free invite code after {attempts} attempts")]
    Exhausted { attempts: usize },
});

response_error!(GoalError {
    #[code(NotFound, "goal_not_found")]
    #[error("Team has no goal yet")]
    NotFound,
    #[code(Conflict, "goal_already_exists")]
    #[error("Team already has a goal")]
    AlreadyExists,
    #[code(InvalidInput, "invalid_request")]
    #[error("{message}")]
    Invalid { message: String },
});

response_error!(VoteError {
    #[code(Conflict, "already_voted")]
    #[error("Already voted to disband")]
    AlreadyVoted,
    #[code(NotFound, "vote_not_found")]
    #[error("No disband vote to cancel")]
    NotFound,
});

response_error!(ActivityError {
    #[code(NotFound, "activity_not_found")]
    #[error("Activity not found")]
    NotFound,
    #[code(Forbidden, "not_activity_owner")]
    #[error("Activity belongs to another user")]
    NotOwner,
    #[code(Unprocessable, "activity_not_in_progress")]
    #[error("Activity is not in progress")]
    NotInProgress,
    #[code(Conflict, "activity_in_progress")]
    #[error("Another activity is already in progress")]
    AlreadyInProgress,
    #[code(Unprocessable, "wrong_activity_type")]
    #[error("Activity is not a {expected} activity")]
    WrongType { expected: String },
    #[code(Unprocessable, "team_not_eligible")]
    #[error("Current team must be an active gym team")]
    TeamNotEligible,
    #[code(InvalidInput, "invalid_coordinates")]
    #[error("Invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
});

response_error!(GymError {
    #[code(NotFound, "gym_location_not_found")]
    #[error("Gym location not found")]
    NotFound,
    #[code(Forbidden, "not_gym_location_owner")]
    #[error("Gym location belongs to another user")]
    NotOwner,
    #[code(Unprocessable, "too_far_from_gym")]
    #[error("Too far from gym: {distance_m:.0}m away, radius is {radius_m}m")]
    TooFar { distance_m: f64, radius_m: i64 },
    #[code(InvalidInput, "invalid_request")]
    #[error("{message}")]
    Invalid { message: String },
});
