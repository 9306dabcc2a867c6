// Tests for graph construction and ranking

use clickflow_core::{EdgeKey, Graph, GraphBuilder};
use clickflow_logs::{SessionMap, VisitEvent, to_sessions};

const EPSILON: f64 = 1e-9;

fn session(session_id: &str, screens: &[&str]) -> Vec<VisitEvent> {
    screens
        .iter()
        .enumerate()
        .map(|(idx, screen)| VisitEvent::new(idx as i64 * 10, session_id, *screen))
        .collect()
}

fn graph_of(sessions: Vec<Vec<VisitEvent>>) -> Graph {
    Graph::from_sessions(&to_sessions(sessions.concat()))
}

fn two_sessions() -> Graph {
    graph_of(vec![session("s1", &["A", "B"]), session("s2", &["A", "C"])])
}

fn busy_graph() -> Graph {
    graph_of(vec![
        session("s1", &["home", "payments", "home", "reports"]),
        session("s2", &["home", "reports", "export"]),
        session("s3", &["login", "home", "payments", "settings", "payments"]),
        session("s4", &["login", "home", "payments"]),
        session("s5", &["reports", "home"]),
    ])
}

// ============================================================================
// Node And Edge Counting Tests
// ============================================================================

#[test]
fn test_two_sessions_counts() {
    let graph = two_sessions();

    assert_eq!(graph.node_count(), 5);
    assert_eq!(graph.node("A").unwrap().visit_count, 2);
    assert_eq!(graph.node("B").unwrap().visit_count, 1);
    assert_eq!(graph.node("start").unwrap().visit_count, 2);
    assert_eq!(graph.node("end").unwrap().visit_count, 2);

    assert_eq!(graph.edge("start", "A").unwrap().visit_count, 2);
    assert_eq!(graph.edge("A", "B").unwrap().visit_count, 1);
    assert_eq!(graph.edge("A", "C").unwrap().visit_count, 1);
    assert_eq!(graph.edge("B", "end").unwrap().visit_count, 1);
    assert!(graph.edge("B", "C").is_none());
}

#[test]
fn test_total_click_count_excludes_end() {
    let graph = two_sessions();
    // start->A twice, A->B, A->C; the two transitions into end do not count
    assert_eq!(graph.total_click_count(), 4);
}

#[test]
fn test_first_visit_has_no_incoming_edge() {
    let graph = two_sessions();
    assert!(graph.edges().all(|edge| edge.destination() != "start"));
    assert!(graph.edges().all(|edge| edge.origin() != "end"));
}

#[test]
fn test_repeated_transition_counts_each_time() {
    let graph = graph_of(vec![session("s1", &["A", "B", "A", "B"])]);

    assert_eq!(graph.edge("A", "B").unwrap().visit_count, 2);
    assert_eq!(graph.edge("B", "A").unwrap().visit_count, 1);
    assert_eq!(graph.node("A").unwrap().visit_count, 2);
}

#[test]
fn test_self_transition() {
    let graph = graph_of(vec![session("s1", &["A", "A"])]);
    assert_eq!(graph.edge("A", "A").unwrap().visit_count, 1);
}

#[test]
fn test_builder_records_sessions_incrementally() {
    let mut builder = GraphBuilder::new();
    builder.record_session(&[VisitEvent::new(1, "s1", "A"), VisitEvent::new(2, "s1", "B")]);
    builder.record_session(&[VisitEvent::new(1, "s2", "A"), VisitEvent::new(2, "s2", "B")]);
    let graph = builder.finish();

    assert_eq!(graph.edge("A", "B").unwrap().visit_count, 2);
    assert_eq!(graph.total_click_count(), 2);
    assert_eq!(graph.edge("A", "B").unwrap().rank, 1.0);
}

// ============================================================================
// Ranking Tests
// ============================================================================

#[test]
fn test_two_sessions_ranks() {
    let graph = two_sessions();

    assert!((graph.node("A").unwrap().rank - 0.5).abs() < EPSILON);
    assert!((graph.node("B").unwrap().rank - 0.25).abs() < EPSILON);

    let a_to_b = graph.edge("A", "B").unwrap();
    assert!((a_to_b.rank - 0.25).abs() < EPSILON);
    assert!((a_to_b.local_rank - 0.5).abs() < EPSILON);
    assert!((graph.edge("A", "C").unwrap().local_rank - 0.5).abs() < EPSILON);
    assert!((graph.edge("start", "A").unwrap().local_rank - 1.0).abs() < EPSILON);
}

#[test]
fn test_tied_outgoing_edges_ordered_by_destination() {
    let graph = two_sessions();
    let a = graph.node("A").unwrap();

    assert_eq!(
        a.outgoing_keys(),
        &[EdgeKey::new("A", "B"), EdgeKey::new("A", "C")]
    );
}

#[test]
fn test_outgoing_edges_sorted_by_visits_descending() {
    let graph = busy_graph();
    let home = graph.node("home").unwrap();

    let counts: Vec<u64> = graph.outgoing(home).map(|edge| edge.visit_count).collect();
    let mut sorted = counts.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(counts, sorted);
    assert_eq!(graph.outgoing(home).next().unwrap().destination(), "payments");
}

#[test]
fn test_nodes_by_visit_descending_with_marker_tie_break() {
    let graph = two_sessions();
    let order: Vec<&str> = graph.nodes().map(|node| node.name.as_str()).collect();

    assert_eq!(order, vec!["start", "end", "A", "B", "C"]);
}

#[test]
fn test_nodes_by_visit_ties_broken_by_name() {
    let graph = graph_of(vec![session("s1", &["zeta", "alpha", "mid"])]);
    let order: Vec<&str> = graph.nodes().map(|node| node.name.as_str()).collect();

    assert_eq!(order, vec!["start", "end", "alpha", "mid", "zeta"]);
}

#[test]
fn test_busiest_screen_can_outrank_markers() {
    let graph = busy_graph();
    let first = graph.nodes().next().unwrap();

    assert_eq!(first.name, "home");
    assert_eq!(first.visit_count, 6);
    assert_eq!(graph.node("start").unwrap().visit_count, 5);
}

// ============================================================================
// Invariant Tests
// ============================================================================

#[test]
fn test_every_edge_endpoint_is_a_node() {
    for graph in [two_sessions(), busy_graph()] {
        for edge in graph.edges() {
            assert!(graph.contains_node(edge.origin()), "missing {}", edge.origin());
            assert!(
                graph.contains_node(edge.destination()),
                "missing {}",
                edge.destination()
            );
        }
    }
}

#[test]
fn test_local_ranks_of_a_node_sum_to_at_most_one() {
    let graph = busy_graph();
    for node in graph.nodes() {
        let sum: f64 = graph.outgoing(node).map(|edge| edge.local_rank).sum();
        assert!(sum <= 1.0 + EPSILON, "{} sums to {}", node.name, sum);
    }
}

#[test]
fn test_local_ranks_sum_to_one_for_non_terminal_nodes() {
    let graph = busy_graph();
    for node in graph.nodes().filter(|node| node.name != "end") {
        let sum: f64 = graph.outgoing(node).map(|edge| edge.local_rank).sum();
        assert!((sum - 1.0).abs() < EPSILON, "{} sums to {}", node.name, sum);
    }
}

#[test]
fn test_real_node_ranks_sum_to_one() {
    for graph in [two_sessions(), busy_graph()] {
        let sum: f64 = graph
            .nodes()
            .filter(|node| !node.is_marker())
            .map(|node| node.rank)
            .sum();
        assert!((sum - 1.0).abs() < EPSILON, "rank sum {}", sum);
    }
}

#[test]
fn test_every_edge_listed_once_under_its_origin() {
    let graph = busy_graph();
    let listed: usize = graph.nodes().map(|node| node.outgoing_keys().len()).sum();

    assert_eq!(listed, graph.edge_count());
    for node in graph.nodes() {
        assert!(graph.outgoing(node).all(|edge| edge.origin() == node.name));
    }
}

// ============================================================================
// Degenerate Input Tests
// ============================================================================

#[test]
fn test_empty_sessions_make_empty_graph() {
    let graph = Graph::from_sessions(&SessionMap::new());

    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.total_click_count(), 0);
    assert_eq!(graph.nodes().count(), 0);
}

#[test]
fn test_zero_clicks_rank_zero() {
    let mut builder = GraphBuilder::new();
    builder.record_session(&[VisitEvent::new(1, "s1", "A"), VisitEvent::new(2, "s1", "end")]);
    let graph = builder.finish();

    assert_eq!(graph.total_click_count(), 0);
    assert_eq!(graph.node("A").unwrap().rank, 0.0);
    assert_eq!(graph.edge("A", "end").unwrap().rank, 0.0);
    assert_eq!(graph.edge("A", "end").unwrap().local_rank, 1.0);
}

// ============================================================================
// Display Tests
// ============================================================================

#[test]
fn test_display_formats() {
    let graph = two_sessions();

    assert_eq!(graph.to_string(), "node-count:5 - total-click-count: 4");
    assert_eq!(graph.node("A").unwrap().to_string(), "node: A (50%)");
    assert_eq!(graph.edge("A", "B").unwrap().to_string(), "edge: A -> B (50%)");
}
