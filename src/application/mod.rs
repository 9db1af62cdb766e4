pub mod command_handler;
pub mod history_service;
pub mod lookup_orchestrator;
pub mod service_container;
pub mod settings_service;
pub mod splash_service;
pub mod traits;

pub use command_handler::CommandHandler;
pub use history_service::HistoryManager;
pub use lookup_orchestrator::{LookupOrchestrator, LookupTrigger};
pub use service_container::{AppConfig, ServiceContainer, StorageKeys};
pub use settings_service::SettingsManager;
pub use splash_service::SplashTracker;
