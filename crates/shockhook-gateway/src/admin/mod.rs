//! Admin surface: form validation and the policy page.

pub mod mutator;
pub mod page;

pub use mutator::{apply_pause_toggle, apply_policy_update, PauseForm, PolicyForm};
pub use page::AdminPage;
