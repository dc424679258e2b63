use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

/// finds the strongly connected components of a directed graph with an
/// iterative version of Tarjan's algorithm.
///
/// # Arguments
///
/// * `nodes` - every node of the graph, visited in this order
/// * `successors` - returns the out-neighbors of a node
///
/// # Returns
///
/// The components, each listed in the order nodes were popped from the
/// search stack. Nodes reachable only through `successors` are included too.
pub fn strongly_connected_components<N, F, I>(nodes: &[N], successors: F) -> Vec<Vec<N>>
where
    N: Clone + Eq + Hash,
    F: Fn(&N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut index: HashMap<N, usize> = HashMap::new();
    let mut lowlink: HashMap<N, usize> = HashMap::new();
    let mut on_stack: HashSet<N> = HashSet::new();
    let mut stack: Vec<N> = vec![];
    let mut components: Vec<Vec<N>> = vec![];
    let mut counter: usize = 0;

    for root in nodes.iter() {
        if index.contains_key(root) {
            continue;
        }
        // each frame holds a node, its successors and the position of the next one to visit
        let mut work: Vec<(N, Vec<N>, usize)> = vec![];
        index.insert(root.clone(), counter);
        lowlink.insert(root.clone(), counter);
        counter += 1;
        stack.push(root.clone());
        on_stack.insert(root.clone());
        work.push((root.clone(), successors(root).into_iter().collect(), 0));

        while let Some((v, succs, pos)) = work.last_mut() {
            if *pos < succs.len() {
                let w = succs[*pos].clone();
                *pos += 1;
                let v = v.clone();
                match index.get(&w).copied() {
                    None => {
                        index.insert(w.clone(), counter);
                        lowlink.insert(w.clone(), counter);
                        counter += 1;
                        stack.push(w.clone());
                        on_stack.insert(w.clone());
                        let w_succs = successors(&w).into_iter().collect();
                        work.push((w, w_succs, 0));
                    }
                    Some(w_index) if on_stack.contains(&w) => {
                        if let Some(low) = lowlink.get_mut(&v) {
                            *low = (*low).min(w_index);
                        }
                    }
                    Some(_) => {}
                }
                continue;
            }

            let v = v.clone();
            work.pop();
            let v_low = lowlink.get(&v).copied().unwrap_or(usize::MAX);
            if let Some((parent, _, _)) = work.last() {
                if let Some(low) = lowlink.get_mut(parent) {
                    *low = (*low).min(v_low);
                }
            }
            if Some(&v_low) == index.get(&v) {
                let mut component = vec![];
                while let Some(member) = stack.pop() {
                    on_stack.remove(&member);
                    let done = member == v;
                    component.push(member);
                    if done {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }
    components
}
