//! Domain types and models

pub mod cgm;
pub mod endpoint;
pub mod linkup;
pub mod scheduler;
pub mod settings;

pub use cgm::{CgmEntry, Mmoll};
pub use endpoint::{endpoint_by_region, Endpoint, DEFAULT_ENDPOINT, ENDPOINTS};
pub use linkup::{
    ActiveSensor, AuthTicket, Connection, GlucoseMeasurement, GraphData, SensorInfo, Session,
};
pub use scheduler::SchedulerState;
pub use settings::Settings;
