use super::{SimplifiedPath, SimplifyError};
use crate::model::{
    attribute::{AttributeMap, AttributeValue},
    graph::{LinkData, LinkId, SpatialGraph},
};
use geo::{Coord, LineString};
use itertools::Itertools;
use ordered_float::OrderedFloat;

/// bag key holding the ids of the links a simplified link replaces
pub const SIMPLIFIED_IDS_KEY: &str = "ids";

/// produces a single link replacing every link along the path.
///
/// - `freespeed`: max over all links
/// - `capacity`, `permlanes`: ceiling of the median over all links
/// - `length`: sum along the chain, taking the first parallel link of each step
/// - `modes`: union over all links
/// - nested attributes: equal values kept, differing values collected into a set
/// - geometry: the ordered coordinates of the chain
pub fn fuse_path(
    path: &SimplifiedPath,
    graph: &SpatialGraph,
    id: LinkId,
) -> Result<LinkData, SimplifyError> {
    let step_links = path
        .steps()
        .iter()
        .map(|step| {
            step.iter()
                .map(|link_id| graph.link(link_id))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    let all_links = step_links.iter().flatten().copied().collect_vec();
    let chain = step_links.iter().filter_map(|step| step.first().copied()).collect_vec();

    let length = chain.iter().map(|l| l.length.unwrap_or(0.0)).sum::<f64>();
    let freespeed = all_links
        .iter()
        .filter_map(|l| l.freespeed)
        .max_by_key(|v| OrderedFloat(*v));
    let capacity = ceil_median(all_links.iter().filter_map(|l| l.capacity));
    let permlanes = ceil_median(all_links.iter().filter_map(|l| l.permlanes));
    let modes = all_links
        .iter()
        .flat_map(|l| l.modes.iter().cloned())
        .collect();
    let oneway = match all_links.iter().map(|l| l.oneway).unique().collect_vec()[..] {
        [single] => single,
        _ => None,
    };

    let bags = all_links
        .iter()
        .map(|l| AttributeValue::Map(l.attributes.clone()))
        .collect_vec();
    let mut attributes = match AttributeValue::merge_distinct(bags) {
        Some(AttributeValue::Map(m)) => m,
        _ => AttributeMap::new(),
    };
    attributes.insert(
        SIMPLIFIED_IDS_KEY.to_string(),
        AttributeValue::List(
            all_links
                .iter()
                .map(|l| AttributeValue::from(l.id.as_str()))
                .collect(),
        ),
    );

    let geometry = chain_geometry(&chain, graph)?;

    Ok(LinkData {
        id,
        from: path.src().clone(),
        to: path.dst().clone(),
        modes,
        freespeed,
        capacity,
        permlanes,
        length: Some(length),
        oneway,
        attributes,
        geometry: Some(geometry),
    })
}

/// coordinates of each chain link in order, using the link geometry where present
/// and the endpoint node coordinates otherwise. repeated coordinates where
/// consecutive links meet are dropped.
fn chain_geometry(chain: &[&LinkData], graph: &SpatialGraph) -> Result<LineString<f64>, SimplifyError> {
    let mut coords: Vec<Coord<f64>> = vec![];
    for link in chain.iter() {
        let link_coords = match &link.geometry {
            Some(geometry) => geometry.coords().copied().collect_vec(),
            None => {
                let src = graph.node(&link.from)?;
                let dst = graph.node(&link.to)?;
                vec![Coord::from((src.x, src.y)), Coord::from((dst.x, dst.y))]
            }
        };
        for coord in link_coords.into_iter() {
            if coords.last() != Some(&coord) {
                coords.push(coord);
            }
        }
    }
    Ok(LineString::new(coords))
}

fn ceil_median<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = f64>,
{
    let sorted = values.sorted_by_key(|v| OrderedFloat(*v)).collect_vec();
    let n = sorted.len();
    let median = match n {
        0 => return None,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    };
    Some(median.ceil())
}
