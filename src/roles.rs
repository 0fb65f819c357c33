//! Access levels carried by player records.
//!
//! Higher values imply a superset of lower capabilities. Use [role_name] for
//! display.
pub const LEVEL_PLAYER: u8 = 1;
pub const LEVEL_TEAM_MEMBER: u8 = 5;
pub const LEVEL_ADMIN: u8 = 10;

/// Human-readable role name for a numeric level.
///
/// Levels ≥10 are "Admin", ≥5 "Team Member", otherwise "Player".
pub fn role_name(level: u8) -> &'static str {
    match level {
        l if l >= LEVEL_ADMIN => "Admin",
        l if l >= LEVEL_TEAM_MEMBER => "Team Member",
        _ => "Player",
    }
}
