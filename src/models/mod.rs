pub mod settings;
pub mod tab;

pub use settings::{ProtectedDomains, Settings};
pub use tab::{DisplayMode, Tab, TabChange, TabId, WindowId};
