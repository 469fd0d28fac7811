//! Reusable UI components for the dashboard

pub mod banner;
pub mod sidebar;
pub mod status_card;

pub use banner::render_banners;
pub use sidebar::render_sidebar;
pub use status_card::{CardStatus, StatusCard};
