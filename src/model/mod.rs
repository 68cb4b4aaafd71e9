pub mod attendance_record;
pub mod role;
pub mod user;
