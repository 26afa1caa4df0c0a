pub use super::backup_history::Entity as BackupHistory;
pub use super::member::Entity as Member;
