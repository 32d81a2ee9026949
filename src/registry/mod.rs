mod core;

pub use self::core::PanelRegistry;
