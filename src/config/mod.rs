//! Configuration module

mod site;

pub use site::BackendConfig;
pub use site::HighlightConfig;
pub use site::NotionConfig;
pub use site::RobotsConfig;
pub use site::SiteConfig;
pub use site::StatusPropertyType;
