pub mod config;
pub mod device;
pub mod diagnostics;
pub mod manager;
pub mod parser;
pub mod repository;
pub mod storage;

pub use config::Config;
pub use config::LogLevel;
pub use device::Device;
pub use device::DeviceError;
pub use device::DeviceEvent;
pub use device::DeviceKind;
pub use diagnostics::LoadError;
pub use diagnostics::LoadReport;
pub use diagnostics::format_load_errors;
pub use manager::DeviceManager;
pub use manager::ManagerError;
pub use parser::ParseError;
pub use parser::parse_line;
pub use repository::DeviceRepository;
pub use repository::MAX_DEVICES;
pub use repository::RepositoryError;
pub use storage::LineSink;
pub use storage::LineSource;
pub use storage::TextFile;
