pub mod app_state;

pub use app_state::{default_minecraft_dir, lock_switcher, AppSettings, AppState};
