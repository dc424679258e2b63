use crate::{
    algorithm::simplification::SimplifyError,
    model::{
        graph::{GraphError, LinkId, Projection},
        schedule::{ScheduleError, StopId},
    },
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error(transparent)]
    GraphError(#[from] GraphError),
    #[error(transparent)]
    ScheduleError(#[from] ScheduleError),
    #[error(transparent)]
    SimplifyError(#[from] SimplifyError),
    #[error("network has already been simplified")]
    AlreadySimplified,
    #[error("cannot merge a simplified network with one that is not")]
    SimplificationMismatch,
    #[error("link '{0}' is referenced by the schedule")]
    LinkInUse(LinkId),
    #[error("cannot merge schedules sharing service ids: {}", .0.join(", "))]
    OverlappingServices(Vec<String>),
    #[error("cannot merge a network in '{found}' into a network in '{expected}'")]
    ProjectionMismatch { expected: Projection, found: Projection },
    #[error("stop '{stop}' references link '{link}' which is not in the graph")]
    MissingStopLink { stop: StopId, link: LinkId },
    #[error("route '{route}' references link '{link}' which is not in the graph")]
    MissingRouteLink { route: String, link: LinkId },
    #[error("route '{route}' with mode '{mode}' uses link '{link}' which does not permit it")]
    ModeIncompatible {
        route: String,
        mode: String,
        link: LinkId,
    },
    #[error("network route of '{route}' breaks between links '{from}' and '{to}'")]
    DisconnectedRoute {
        route: String,
        from: LinkId,
        to: LinkId,
    },
}
