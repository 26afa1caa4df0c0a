pub mod prelude;

pub mod backup_history;
pub mod member;
