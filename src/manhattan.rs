//! Synthetic Manhattan-grid graphs for benchmarks and stress tests.

use crate::graph::{CostMap, Link, Node, OrientedGraph};
use oriole_common::Result;

fn length_costs(link_length: f64) -> CostMap {
    CostMap::from_iter([("length".to_string(), link_length)])
}

fn connect(graph: &mut OrientedGraph, from: usize, to: usize, link_length: f64) -> Result<()> {
    let (up, down) = (from.to_string(), to.to_string());
    graph.add_link(Link::new(
        &format!("{up}_{down}"),
        &up,
        &down,
        link_length,
        length_costs(link_length),
    ))
}

/// One compass node outside the grid, wired both ways to its interior
/// counterpart.
fn add_boundary(
    graph: &mut OrientedGraph,
    compass: &str,
    index: usize,
    interior: usize,
    x: f64,
    y: f64,
    link_length: f64,
) -> Result<()> {
    let boundary = format!("{compass}_{index}");
    let interior = interior.to_string();
    graph.add_node(Node::new(&boundary, x, y))?;
    graph.add_link(Link::new(
        &format!("{boundary}_{interior}"),
        &boundary,
        &interior,
        link_length,
        length_costs(link_length),
    ))?;
    graph.add_link(Link::new(
        &format!("{interior}_{boundary}"),
        &interior,
        &boundary,
        link_length,
        length_costs(link_length),
    ))?;
    Ok(())
}

/// An `n×n` grid whose interior nodes are four-connected in both
/// directions, ringed by four compass arrays (`WEST_k`, `EAST_k`,
/// `NORTH_k`, `SOUTH_k`) of `n` virtual nodes, each tied bidirectionally
/// to its grid-edge node. Every link carries the single cost dimension
/// `"length"` valued `link_length`.
///
/// Interior node `i*n + j` sits at `(i*link_length, j*link_length)`.
pub fn generate_manhattan(n: usize, link_length: f64) -> Result<OrientedGraph> {
    let mut graph = OrientedGraph::new();

    for i in 0..n {
        for j in 0..n {
            graph.add_node(Node::new(
                &(i * n + j).to_string(),
                i as f64 * link_length,
                j as f64 * link_length,
            ))?;
        }
    }

    for i in 0..n {
        for j in 0..n {
            let ind = i * n + j;
            if j + 1 < n {
                connect(&mut graph, ind, ind + 1, link_length)?;
            }
            if j > 0 {
                connect(&mut graph, ind, ind - 1, link_length)?;
            }
            if i + 1 < n {
                connect(&mut graph, ind, ind + n, link_length)?;
            }
            if i > 0 {
                connect(&mut graph, ind, ind - n, link_length)?;
            }
        }
    }

    for k in 0..n {
        add_boundary(
            &mut graph,
            "WEST",
            k,
            k,
            -link_length,
            k as f64 * link_length,
            link_length,
        )?;
        add_boundary(
            &mut graph,
            "EAST",
            k,
            n * (n - 1) + k,
            n as f64 * link_length,
            k as f64 * link_length,
            link_length,
        )?;
        add_boundary(
            &mut graph,
            "NORTH",
            k,
            k * n + n - 1,
            k as f64 * link_length,
            n as f64 * link_length,
            link_length,
        )?;
        add_boundary(
            &mut graph,
            "SOUTH",
            k,
            k * n,
            k as f64 * link_length,
            -link_length,
            link_length,
        )?;
    }

    Ok(graph)
}
