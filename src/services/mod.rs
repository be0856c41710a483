//! External collaborator module
//!
//! Persistence and the platform capabilities the countdown consumes
//! (vibration, system notifications) without owning them.

pub mod feedback;
pub mod storage;

// Re-export main types
pub use feedback::{
    check_notifier_available, DesktopNotifier, Haptics, LogHaptics, Notifier, FINISH_BODY,
    FINISH_TITLE, FINISH_VIBRATION,
};
pub use storage::JsonStore;
