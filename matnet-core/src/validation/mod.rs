mod crow_fly_ratio;
mod graph_report;
mod routing_report;
mod schedule_report;
mod validation_config;
mod validation_error;
mod validation_report;

pub use crow_fly_ratio::CrowFlyRatio;
pub use graph_report::{GraphReport, LinkAttributeReport, LinkSelection, ModeConnectivity};
pub use routing_report::RoutingReport;
pub use schedule_report::{RouteLevelReport, ScheduleLevelReport, ScheduleReport, ServiceLevelReport};
pub use validation_config::ValidationConfig;
pub use validation_error::ValidationError;
pub use validation_report::{validate, ValidationReport};
