mod headway;
mod route;
#[allow(clippy::module_inception)]
mod schedule;
mod schedule_error;
mod service;
mod stop;
mod stop_graph;
mod time_offset;
mod trip;
mod validity;
mod vehicle;
mod vehicle_diagnostics;

pub use headway::HeadwayStats;
pub use route::{Route, StopSpeed};
pub use schedule::Schedule;
pub use schedule_error::ScheduleError;
pub use service::Service;
pub use stop::{Stop, StopId};
pub use stop_graph::{StopEdge, StopGraph};
pub use time_offset::TimeOffset;
pub use trip::Trip;
pub use validity::{RouteStage, ScheduleStage, ServiceStage, Validity};
pub use vehicle::{DoorOperation, MinimalTransferTime, Vehicle, VehicleCapacity, VehicleType};
pub use vehicle_diagnostics::{TripRef, VehicleDiagnostics};
