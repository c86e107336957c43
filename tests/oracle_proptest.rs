use frontier_bfs::{
    compute::{SerialBackend, ThreadPoolBackend},
    cpu_traverse, BackendConfig, Graph, LevelSyncDriver,
};
use petgraph::{algo::dijkstra, graph::DiGraph, graph::NodeIndex};
use proptest::prelude::*;

fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, usize)> {
    (1usize..40).prop_flat_map(|n| {
        (
            Just(n),
            // Endpoints up to n + 2 so some insertions fall out of range and are dropped.
            proptest::collection::vec((0..n + 2, 0..n + 2), 0..120),
            0..n,
        )
    })
}

fn build(n: usize, edges: &[(usize, usize)]) -> Graph {
    let mut g = Graph::try_new(n).unwrap();
    for &(a, b) in edges {
        g.add_edge(a, b);
    }
    g
}

fn petgraph_distances(g: &Graph, source: usize) -> Vec<i32> {
    let mut pg = DiGraph::<(), ()>::new();
    let nodes: Vec<NodeIndex> = (0..g.vertex_count()).map(|_| pg.add_node(())).collect();
    for v in 0..g.vertex_count() {
        for &u in g.neighbors(v) {
            pg.add_edge(nodes[v], nodes[u], ());
        }
    }
    let costs = dijkstra(&pg, nodes[source], None, |_| 1i32);
    nodes
        .iter()
        .map(|n| costs.get(n).copied().unwrap_or(-1))
        .collect()
}

fn is_edge(g: &Graph, from: usize, to: usize) -> bool {
    g.neighbors(from).contains(&to)
}

proptest! {
    #[test]
    fn parallel_matches_sequential((n, edges, source) in arb_graph()) {
        let g = build(n, &edges);
        let cpu = cpu_traverse(&g, source).unwrap();

        let serial = LevelSyncDriver::new(SerialBackend::default()).unwrap();
        let report = serial.run(&g, source).unwrap();
        prop_assert_eq!(&report.distances[..], cpu.distances());
        prop_assert!(report.levels as usize <= n);

        let threads = LevelSyncDriver::new(
            ThreadPoolBackend::new(BackendConfig::default().with_threads(3).with_max_group_size(4)).unwrap(),
        ).unwrap();
        prop_assert_eq!(threads.traverse(&g, source).unwrap(), cpu.distances());
    }

    #[test]
    fn sequential_matches_petgraph((n, edges, source) in arb_graph()) {
        let g = build(n, &edges);
        let cpu = cpu_traverse(&g, source).unwrap();
        prop_assert_eq!(cpu.distances(), &petgraph_distances(&g, source)[..]);
    }

    #[test]
    fn parents_and_paths_are_consistent((n, edges, source) in arb_graph()) {
        let g = build(n, &edges);
        let r = cpu_traverse(&g, source).unwrap();
        prop_assert_eq!(r.distances()[source], 0);
        prop_assert_eq!(r.parents()[source], -1);

        for v in 0..n {
            let d = r.distances()[v];
            let path = r.path(v).unwrap();
            if d == -1 {
                prop_assert_eq!(r.parents()[v], -1);
                prop_assert!(path.is_empty());
                continue;
            }
            if d > 0 {
                let p = usize::try_from(r.parents()[v]).unwrap();
                prop_assert_eq!(r.distances()[p], d - 1);
                prop_assert!(is_edge(&g, p, v));
            }
            prop_assert_eq!(path.len(), usize::try_from(d).unwrap() + 1);
            prop_assert_eq!(path[0], source);
            prop_assert_eq!(*path.last().unwrap(), v);
            for w in path.windows(2) {
                prop_assert!(is_edge(&g, w[0], w[1]));
            }
        }
    }

    #[test]
    fn csr_is_stable_and_matches_adjacency((n, edges, _source) in arb_graph()) {
        let g = build(n, &edges);
        let csr = g.to_csr();
        prop_assert_eq!(&csr, &g.to_csr());
        prop_assert_eq!(csr.offsets().len(), n + 1);
        prop_assert_eq!(csr.offsets()[n], csr.edge_count());
        for v in 0..n {
            prop_assert_eq!(csr.neighbors(v), g.neighbors(v));
        }
    }
}
