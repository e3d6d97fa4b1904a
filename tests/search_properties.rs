use parity_paths::{
    Graph, GraphBuilder, NodeId, Parity, SearchConfig, SearchError, SearchResult,
    find_shortest_paths, parse_edge_list,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

const SAMPLE: &str = include_str!("../data/sample.dot");

fn search(graph: &mut Graph, from: &str, to: &str, workers: usize) -> SearchResult {
    let start = graph.node_id(from).unwrap();
    let destination = graph.node_id(to).unwrap();
    let config = SearchConfig::default().with_workers(workers);
    find_shortest_paths(graph, start, destination, &config).unwrap()
}

fn names(graph: &Graph, path: &[NodeId]) -> Vec<String> {
    path.iter().map(|&id| graph.name(id).to_string()).collect()
}

fn path_set(result: &SearchResult) -> BTreeSet<Vec<NodeId>> {
    result.paths.iter().cloned().collect()
}

/// Fastest time to walk `path`, starting at time zero.
///
/// Leaving a node earlier never arrives later, so taking the cheapest
/// connection at every step gives the best time for the whole walk.
fn walk_time(graph: &Graph, path: &[NodeId]) -> u32 {
    let mut time = 0;
    for pair in path.windows(2) {
        let node = graph.node(pair[0]).unwrap();
        let cost = node
            .connections()
            .iter()
            .filter(|c| c.target == pair[1])
            .map(|c| c.parity.traversal_cost(time))
            .min()
            .expect("consecutive path nodes must be connected");
        time += cost;
    }
    time
}

/// Earliest arrival at `destination` by Dijkstra over arrival times
fn reference_best_time(graph: &Graph, start: NodeId, destination: NodeId) -> Option<u32> {
    let mut best = vec![u32::MAX; graph.node_count()];
    let mut heap = BinaryHeap::new();
    best[start.index()] = 0;
    heap.push(Reverse((0u32, start)));

    while let Some(Reverse((time, id))) = heap.pop() {
        if time > best[id.index()] {
            continue;
        }
        if id == destination {
            return Some(time);
        }
        for c in graph.node(id).unwrap().connections() {
            let next = time + c.parity.traversal_cost(time);
            if next < best[c.target.index()] {
                best[c.target.index()] = next;
                heap.push(Reverse((next, c.target)));
            }
        }
    }
    None
}

/// Every walk reaching `destination` exactly at `target` and not before
fn reference_paths(
    graph: &Graph,
    start: NodeId,
    destination: NodeId,
    target: u32,
) -> BTreeSet<Vec<NodeId>> {
    fn walk(
        graph: &Graph,
        path: &mut Vec<NodeId>,
        time: u32,
        destination: NodeId,
        target: u32,
        out: &mut BTreeSet<Vec<NodeId>>,
    ) {
        let current = *path.last().unwrap();
        for c in graph.node(current).unwrap().connections() {
            let next = time + c.parity.traversal_cost(time);
            if next > target {
                continue;
            }
            path.push(c.target);
            if c.target == destination {
                if next == target {
                    out.insert(path.clone());
                }
            } else {
                walk(graph, path, next, destination, target, out);
            }
            path.pop();
        }
    }

    let mut out = BTreeSet::new();
    walk(graph, &mut vec![start], 0, destination, target, &mut out);
    out
}

fn random_graph(rng: &mut ChaCha8Rng, nodes: usize, edges: usize) -> Graph {
    let mut builder = GraphBuilder::new();
    // Keep a spanning chain so that most destinations are reachable
    for i in 1..nodes {
        let parity = if rng.gen_bool(0.5) { Parity::Even } else { Parity::Odd };
        builder
            .add_edge(&format!("N{}", i - 1), &format!("N{}", i), parity)
            .unwrap();
    }
    for _ in nodes - 1..edges {
        let a = rng.gen_range(0..nodes);
        let b = rng.gen_range(0..nodes);
        if a == b {
            continue;
        }
        let parity = if rng.gen_bool(0.5) { Parity::Even } else { Parity::Odd };
        builder
            .add_edge(&format!("N{}", a), &format!("N{}", b), parity)
            .unwrap();
    }
    builder.build()
}

#[test]
fn test_sample_graph_single_optimal_path() {
    let mut graph = parse_edge_list(SAMPLE).unwrap();
    let result = search(&mut graph, "AA", "ZZ", 4);

    assert_eq!(result.best_time, 4);
    assert_eq!(result.path_count(), 1);
    assert_eq!(
        names(&graph, &result.paths[0]),
        vec!["AA", "AB", "BB", "CB", "ZZ"]
    );
}

#[test]
fn test_chain_waits_before_final_odd_edge() {
    let mut graph = parse_edge_list(
        r#"graph G {
"AA" -- "BA" [timestep="even"];
"BA" -- "CA" [timestep="odd"];
"CA" -- "DA" [timestep="odd"];
}"#,
    )
    .unwrap();
    let result = search(&mut graph, "AA", "DA", 2);

    assert_eq!(result.best_time, 4);
    assert_eq!(result.path_count(), 1);
    let path = &result.paths[0];
    assert_eq!(names(&graph, path), vec!["AA", "BA", "CA", "DA"]);
    // Three moves in four steps: exactly one wait
    let moves = path.len() as u32 - 1;
    assert_eq!(result.best_time - moves, 1);
    assert_eq!(walk_time(&graph, path), 4);
}

#[test]
fn test_start_equal_to_destination_is_rejected() {
    let mut graph = parse_edge_list(SAMPLE).unwrap();
    let aa = graph.node_id("AA").unwrap();
    let err = find_shortest_paths(&mut graph, aa, aa, &SearchConfig::default()).unwrap_err();
    assert!(matches!(err, SearchError::StartIsDestination(_)));
}

#[test]
fn test_co_optimal_paths_are_all_returned() {
    // Two symmetric routes of equal cost around a square
    let mut graph = Graph::from_edges([
        ("S", "L", Parity::Even),
        ("S", "R", Parity::Even),
        ("L", "T", Parity::Odd),
        ("R", "T", Parity::Odd),
    ])
    .unwrap();
    let result = search(&mut graph, "S", "T", 3);

    assert_eq!(result.best_time, 2);
    let found: BTreeSet<Vec<String>> = result.paths.iter().map(|p| names(&graph, p)).collect();
    let expected: BTreeSet<Vec<String>> = [
        vec!["S".to_string(), "L".to_string(), "T".to_string()],
        vec!["S".to_string(), "R".to_string(), "T".to_string()],
    ]
    .into_iter()
    .collect();
    assert_eq!(found, expected);
}

#[test]
fn test_parallel_edges_of_both_parities_never_wait() {
    let mut graph = Graph::from_edges([
        ("A", "B", Parity::Even),
        ("A", "B", Parity::Odd),
        ("B", "C", Parity::Even),
        ("B", "C", Parity::Odd),
    ])
    .unwrap();
    let result = search(&mut graph, "A", "C", 2);

    assert_eq!(result.best_time, 2);
    // The same node sequence is reported once
    assert_eq!(result.path_count(), 1);
}

#[test]
fn test_unreachable_destination_is_no_solution() {
    let mut graph = Graph::from_edges([("A", "B", Parity::Odd), ("C", "D", Parity::Even)]).unwrap();
    let result = search(&mut graph, "A", "D", 2);

    assert!(!result.found_path());
    assert_eq!(result.best_time, u32::MAX);
    assert!(result.paths.is_empty());
}

#[test]
fn test_optimal_paths_walk_in_best_time() {
    let mut graph = parse_edge_list(SAMPLE).unwrap();
    for (from, to) in [("AA", "ZZ"), ("ZZ", "AA"), ("AC", "CA"), ("BA", "BC")] {
        let result = search(&mut graph, from, to, 4);
        assert!(result.found_path(), "{} -> {} should be reachable", from, to);
        for path in &result.paths {
            assert_eq!(graph.name(path[0]), from);
            assert_eq!(graph.name(*path.last().unwrap()), to);
            assert_eq!(walk_time(&graph, path), result.best_time);
        }
    }
}

#[test]
fn test_repeated_search_is_idempotent() {
    let mut graph = parse_edge_list(SAMPLE).unwrap();
    let first = search(&mut graph, "AA", "ZZ", 4);
    let second = search(&mut graph, "AA", "ZZ", 4);

    assert_eq!(first.best_time, second.best_time);
    assert_eq!(path_set(&first), path_set(&second));
}

#[test]
fn test_random_graphs_match_reference() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let workers = [1, 2, num_cpus::get().max(3)];
    let mut checked = 0;

    for _ in 0..40 {
        let nodes = rng.gen_range(4..9);
        let edges = rng.gen_range(nodes..nodes * 2);
        let mut graph = random_graph(&mut rng, nodes, edges);
        let start = NodeId(0);
        let destination = NodeId(nodes - 1);

        let Some(best) = reference_best_time(&graph, start, destination) else {
            continue;
        };
        if best > 10 {
            continue;
        }
        let expected = reference_paths(&graph, start, destination, best);

        for &n in &workers {
            let config = SearchConfig::default().with_workers(n);
            let result = find_shortest_paths(&mut graph, start, destination, &config).unwrap();
            assert_eq!(result.best_time, best, "workers = {}", n);
            assert_eq!(path_set(&result), expected, "workers = {}", n);
            for path in &result.paths {
                assert_eq!(walk_time(&graph, path), best);
            }
        }
        checked += 1;
    }

    assert!(checked > 5, "only {} random graphs were checked", checked);
}

#[test]
fn test_worker_counts_agree_on_sample() {
    let mut graph = parse_edge_list(SAMPLE).unwrap();
    let baseline = search(&mut graph, "ZZ", "AA", 1);

    for workers in [2, 3, 8] {
        for _ in 0..5 {
            let result = search(&mut graph, "ZZ", "AA", workers);
            assert_eq!(result.best_time, baseline.best_time);
            assert_eq!(path_set(&result), path_set(&baseline));
        }
    }
}
