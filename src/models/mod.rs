pub mod appointments;
pub mod pds;
pub mod slots;
pub mod student_records;
pub mod users;

pub mod user_logins;
