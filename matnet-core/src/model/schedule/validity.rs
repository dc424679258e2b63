use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// outcome of a validity check along with the named stages that failed.
/// computed on demand from the current state, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity<S> {
    pub is_valid: bool,
    pub invalid_stages: Vec<S>,
}

impl<S> Validity<S> {
    pub fn from_failures(invalid_stages: Vec<S>) -> Validity<S> {
        Validity {
            is_valid: invalid_stages.is_empty(),
            invalid_stages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStage {
    NotHasMoreThanOneStop,
    NotHasCorrectlyOrderedRoute,
    NotHasValidOffsets,
    HasSelfLoops,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStage {
    NotHasValidRoutes,
    NotHasUniquelyIndexedRoutes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStage {
    NotHasValidServices,
    NotHasUniquelyIndexedServices,
}

impl Display for RouteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteStage::NotHasMoreThanOneStop => write!(f, "not_has_more_than_one_stop"),
            RouteStage::NotHasCorrectlyOrderedRoute => write!(f, "not_has_correctly_ordered_route"),
            RouteStage::NotHasValidOffsets => write!(f, "not_has_valid_offsets"),
            RouteStage::HasSelfLoops => write!(f, "has_self_loops"),
        }
    }
}

impl Display for ServiceStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStage::NotHasValidRoutes => write!(f, "not_has_valid_routes"),
            ServiceStage::NotHasUniquelyIndexedRoutes => {
                write!(f, "not_has_uniquely_indexed_routes")
            }
        }
    }
}

impl Display for ScheduleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleStage::NotHasValidServices => write!(f, "not_has_valid_services"),
            ScheduleStage::NotHasUniquelyIndexedServices => {
                write!(f, "not_has_uniquely_indexed_services")
            }
        }
    }
}
