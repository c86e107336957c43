//! Tests for the adjacency-list graph store.

use super::*;

#[test]
fn test_add_edge_preserves_order_and_duplicates() {
    let mut g = Graph::try_new(3).unwrap();
    assert!(g.add_edge(0, 2));
    assert!(g.add_edge(0, 1));
    assert!(g.add_edge(0, 2));
    assert!(g.add_edge(1, 1));

    assert_eq!(g.neighbors(0), &[2, 1, 2]);
    assert_eq!(g.neighbors(1), &[1]);
    assert!(g.neighbors(2).is_empty());
    assert_eq!(g.edge_count(), 4);
}

#[test]
fn test_out_of_range_edges_are_dropped() {
    let mut g = Graph::try_new(2).unwrap();
    assert!(!g.add_edge(0, 2));
    assert!(!g.add_edge(5, 0));
    assert_eq!(g.edge_count(), 0);
    assert!(g.neighbors(7).is_empty());
}

#[test]
fn test_edges_are_not_symmetrized() {
    let mut g = Graph::try_new(2).unwrap();
    g.add_edge(0, 1);
    assert_eq!(g.neighbors(0), &[1]);
    assert!(g.neighbors(1).is_empty());
}

#[test]
fn test_invalid_size() {
    assert_eq!(
        Graph::try_new(MAX_VERTICES + 1),
        Err(BfsError::InvalidSize {
            vertex_count: MAX_VERTICES + 1
        })
    );
}

#[test]
fn test_from_adjacency_filters_out_of_range() {
    let g = Graph::from_adjacency(vec![vec![1, 9], vec![0], vec![]]).unwrap();
    assert_eq!(g.vertex_count(), 3);
    assert_eq!(g.neighbors(0), &[1]);
    assert_eq!(g.neighbors(1), &[0]);
}

#[test]
fn test_empty_graph() {
    let g = build_graph(0).unwrap();
    assert_eq!(g.vertex_count(), 0);
    assert_eq!(g.edge_count(), 0);
    let csr = g.to_csr();
    assert_eq!(csr.offsets(), &[0]);
    assert!(csr.edges().is_empty());
}

#[test]
fn test_check_vertex() {
    let g = Graph::try_new(2).unwrap();
    assert!(g.check_vertex(1).is_ok());
    assert_eq!(
        g.check_vertex(2),
        Err(BfsError::VertexOutOfRange {
            vertex: 2,
            vertex_count: 2
        })
    );
}

#[test]
fn test_deserialize_rejects_out_of_range_neighbors() {
    let err = serde_json::from_str::<Graph>(r#"{"adjacency":[[5],[]]}"#).unwrap_err();
    assert!(err.to_string().contains("vertex 5 out of bounds for n=2"), "{err}");
}

#[test]
fn test_deserialized_graph_traverses() {
    let g: Graph = serde_json::from_str(r#"{"adjacency":[[1],[0,1]]}"#).unwrap();
    assert_eq!(g.neighbors(1), &[0, 1]);
    assert_eq!(g.to_csr().edges(), &[1, 0, 1]);
    assert_eq!(serde_json::to_string(&g).unwrap(), r#"{"adjacency":[[1],[0,1]]}"#);
}
