// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

/// Number of qubits per orientation in a Pegasus unit cell.
static PEGASUS_CELL: u32 = 12;

/// Shift along the y axis of vertical Pegasus qubits, by minor offset.
static PEGASUS_VERTICAL_OFFSETS: [u32; 12] = [2, 2, 2, 2, 10, 10, 10, 10, 6, 6, 6, 6];

/// Shift along the x axis of horizontal Pegasus qubits, by minor offset.
static PEGASUS_HORIZONTAL_OFFSETS: [u32; 12] = [6, 6, 6, 6, 2, 2, 2, 2, 10, 10, 10, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Coordinates {
    /// Chimera qubit: tile row, tile column, shore (0: vertical,
    /// 1: horizontal), index within the shore.
    Chimera {
        row: u32,
        column: u32,
        shore: u32,
        index: u32,
    },
    /// Pegasus qubit: orientation (0: vertical, 1: horizontal),
    /// perpendicular tile offset, perpendicular offset within the tile,
    /// parallel offset.
    Pegasus { u: u32, w: u32, k: u32, z: u32 },
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coordinates::Chimera {
                row,
                column,
                shore,
                index,
            } => write!(f, "({},{},{},{})", row, column, shore, index),
            Coordinates::Pegasus { u, w, k, z } => write!(f, "({},{},{},{})", u, w, k, z),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeWeight {
    /// Qubit coordinates.
    pub coordinates: Coordinates,
    /// Linear index of the qubit, as assigned by the hardware vendor.
    pub linear_index: u32,
}

impl std::fmt::Display for NodeWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.linear_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CouplerKind {
    /// Between two qubits with different orientation.
    Internal,
    /// Between two collinear qubits in adjacent tiles.
    External,
    /// Between the two qubits of a Pegasus odd pair.
    Odd,
}

impl std::fmt::Display for CouplerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CouplerKind::Internal => "internal",
                CouplerKind::External => "external",
                CouplerKind::Odd => "odd",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChimeraParams {
    /// Number of rows of tiles.
    pub rows: u32,
    /// Number of columns of tiles.
    pub columns: u32,
    /// Number of qubits in each shore of a tile.
    pub shore_size: u32,
}

impl Default for ChimeraParams {
    fn default() -> Self {
        Self {
            rows: 3,
            columns: 3,
            shore_size: 4,
        }
    }
}

impl ChimeraParams {
    fn valid(&self) -> anyhow::Result<()> {
        let mut errors = vec![];
        if self.rows == 0 {
            errors.push(String::from("vanishing number of rows"));
        }
        if self.columns == 0 {
            errors.push(String::from("vanishing number of columns"));
        }
        if self.shore_size == 0 {
            errors.push(String::from("vanishing shore size"));
        }
        if !errors.is_empty() {
            anyhow::bail!("invalid Chimera parameters: {}", errors.join(","))
        }
        Ok(())
    }

    /// Number of qubits: 2 m n t.
    pub fn num_qubits(&self) -> usize {
        2 * (self.rows * self.columns * self.shore_size) as usize
    }

    /// Number of couplers: t^2 m n + t (m - 1) n + t m (n - 1).
    pub fn num_couplers(&self) -> usize {
        let (m, n, t) = (
            self.rows as usize,
            self.columns as usize,
            self.shore_size as usize,
        );
        t * t * m * n + t * (m - 1) * n + t * m * (n - 1)
    }

    fn linear_index(&self, row: u32, column: u32, shore: u32, index: u32) -> u32 {
        ((row * self.columns + column) * 2 + shore) * self.shore_size + index
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PegasusParams {
    /// Size of the Pegasus graph, i.e., number of tiles along each dimension.
    pub size: u32,
}

impl Default for PegasusParams {
    fn default() -> Self {
        Self { size: 3 }
    }
}

impl PegasusParams {
    fn valid(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.size >= 2,
            "invalid Pegasus parameters: size ({}) < 2",
            self.size
        );
        Ok(())
    }

    /// Number of qubits in the fabric: 24 M (M - 1) - 8 (M - 1).
    pub fn num_qubits(&self) -> usize {
        let m = self.size as usize;
        24 * m * (m - 1) - 8 * (m - 1)
    }

    /// Number of couplers in the fabric: all the external, odd, and internal
    /// couplers, minus those of the qubits at the border that do not cross
    /// any qubit with a different orientation.
    pub fn num_couplers(&self) -> usize {
        let m = self.size as usize;
        let external = 24 * m * (m - 2);
        let odd = 12 * m * (m - 1);
        let internal = 144 * (m - 1) * (m - 1);
        external + odd + internal - 4 * (m - 1) - 8 * (m - 2)
    }

    fn linear_index(&self, u: u32, w: u32, k: u32, z: u32) -> u32 {
        let m1 = self.size - 1;
        ((u * self.size + w) * PEGASUS_CELL + k) * m1 + z
    }

    /// Return true if the qubit crosses at least one qubit with a different
    /// orientation.
    fn in_fabric(&self, u: u32, w: u32, k: u32) -> bool {
        let offsets = if u == 0 {
            &PEGASUS_HORIZONTAL_OFFSETS
        } else {
            &PEGASUS_VERTICAL_OFFSETS
        };
        offsets.iter().any(|offset| {
            let shift = (k < *offset) as u32;
            w >= shift && w - shift <= self.size - 2
        })
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TopologyKind {
    Chimera(ChimeraParams),
    Pegasus(PegasusParams),
}

impl std::fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyKind::Chimera(params) => write!(
                f,
                "chimera({},{},{})",
                params.rows, params.columns, params.shore_size
            ),
            TopologyKind::Pegasus(params) => write!(f, "pegasus({})", params.size),
        }
    }
}

pub type Graph = petgraph::Graph<NodeWeight, CouplerKind, petgraph::Undirected, u32>;

/// Undirected graph representing the connectivity of the qubits of a
/// quantum annealer.
///
/// An edge is present if there is a coupler between two qubits.
#[derive(Debug)]
pub struct Topology {
    kind: TopologyKind,
    graph: Graph,
}

/// Incrementally build a graph whose nodes are identified by coordinates.
#[derive(Default)]
struct GraphBuilder {
    graph: Graph,
    nodes: std::collections::HashMap<Coordinates, petgraph::graph::NodeIndex>,
}

impl GraphBuilder {
    fn add_node(&mut self, coordinates: Coordinates, linear_index: u32) {
        let ndx = self.graph.add_node(NodeWeight {
            coordinates,
            linear_index,
        });
        let old = self.nodes.insert(coordinates, ndx);
        assert!(old.is_none(), "duplicate qubit {}", coordinates);
    }

    /// Add a coupler if both qubits exist.
    fn add_coupler(&mut self, lhs: Coordinates, rhs: Coordinates, kind: CouplerKind) {
        if let (Some(u), Some(v)) = (self.nodes.get(&lhs), self.nodes.get(&rhs)) {
            assert!(u != v);
            if !self.graph.contains_edge(*u, *v) {
                self.graph.add_edge(*u, *v, kind);
            }
        }
    }
}

impl Topology {
    pub fn kind(&self) -> &TopologyKind {
        &self.kind
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Build a Chimera topology: a grid of tiles, each consisting of two
    /// shores of qubits forming a complete bipartite graph. Vertical qubits
    /// are coupled with those with the same index in the tile below,
    /// horizontal qubits with those in the tile on the right.
    pub fn chimera(params: ChimeraParams) -> anyhow::Result<Self> {
        params.valid()?;

        let chimera = |row, column, shore, index| Coordinates::Chimera {
            row,
            column,
            shore,
            index,
        };

        let mut builder = GraphBuilder::default();
        for row in 0..params.rows {
            for column in 0..params.columns {
                for shore in 0..2 {
                    for index in 0..params.shore_size {
                        builder.add_node(
                            chimera(row, column, shore, index),
                            params.linear_index(row, column, shore, index),
                        );
                    }
                }
            }
        }

        for row in 0..params.rows {
            for column in 0..params.columns {
                for index in 0..params.shore_size {
                    for other in 0..params.shore_size {
                        builder.add_coupler(
                            chimera(row, column, 0, index),
                            chimera(row, column, 1, other),
                            CouplerKind::Internal,
                        );
                    }
                    // Down
                    if row + 1 < params.rows {
                        builder.add_coupler(
                            chimera(row, column, 0, index),
                            chimera(row + 1, column, 0, index),
                            CouplerKind::External,
                        );
                    }
                    // Right
                    if column + 1 < params.columns {
                        builder.add_coupler(
                            chimera(row, column, 1, index),
                            chimera(row, column + 1, 1, index),
                            CouplerKind::External,
                        );
                    }
                }
            }
        }

        Ok(Self {
            kind: TopologyKind::Chimera(params),
            graph: builder.graph,
        })
    }

    /// Build a Pegasus topology, only including the qubits of the main
    /// fabric, i.e., those that cross at least one qubit with a different
    /// orientation.
    ///
    /// A vertical qubit (0,w,k,z) spans the column 12w+k from row
    /// 12z+v[k] for 12 rows, where v are the vertical offsets, and
    /// a horizontal qubit (1,w,k,z) spans the row 12w+k from column
    /// 12z+h[k] for 12 columns, where h are the horizontal offsets.
    pub fn pegasus(params: PegasusParams) -> anyhow::Result<Self> {
        params.valid()?;

        let size = params.size;
        let m1 = size - 1;
        let pegasus = |u, w, k, z| Coordinates::Pegasus { u, w, k, z };

        let mut builder = GraphBuilder::default();
        for u in 0..2 {
            for w in 0..size {
                for k in 0..PEGASUS_CELL {
                    if !params.in_fabric(u, w, k) {
                        continue;
                    }
                    for z in 0..m1 {
                        builder.add_node(pegasus(u, w, k, z), params.linear_index(u, w, k, z));
                    }
                }
            }
        }

        for u in 0..2 {
            for w in 0..size {
                for k in 0..PEGASUS_CELL {
                    for z in 0..m1 {
                        if z + 1 < m1 {
                            builder.add_coupler(
                                pegasus(u, w, k, z),
                                pegasus(u, w, k, z + 1),
                                CouplerKind::External,
                            );
                        }
                        if k % 2 == 0 {
                            builder.add_coupler(
                                pegasus(u, w, k, z),
                                pegasus(u, w, k + 1, z),
                                CouplerKind::Odd,
                            );
                        }
                    }
                }
            }
        }

        // Each vertical qubit crosses at most one horizontal qubit per row
        // of the cell.
        for w in 0..size {
            for k in 0..PEGASUS_CELL {
                for z in 0..m1 {
                    for kk in 0..PEGASUS_CELL {
                        let other_w = z + (kk < PEGASUS_VERTICAL_OFFSETS[k as usize]) as u32;
                        let shift = (k < PEGASUS_HORIZONTAL_OFFSETS[kk as usize]) as u32;
                        if other_w >= size || w < shift || w - shift >= m1 {
                            continue;
                        }
                        builder.add_coupler(
                            pegasus(0, w, k, z),
                            pegasus(1, other_w, kk, w - shift),
                            CouplerKind::Internal,
                        );
                    }
                }
            }
        }

        Ok(Self {
            kind: TopologyKind::Pegasus(params),
            graph: builder.graph,
        })
    }

    /// Return the number of couplers of each kind.
    pub fn coupler_counts(&self) -> std::collections::HashMap<CouplerKind, usize> {
        let mut counts = std::collections::HashMap::new();
        for kind in self.graph.edge_weights() {
            *counts.entry(*kind).or_default() += 1;
        }
        counts
    }

    /// Return the position of every node, indexed by node index, in the
    /// unit square. Distances are scaled equally along both axes.
    ///
    /// Chimera tiles are laid out on a grid, with the vertical shore on a
    /// horizontal line across the tile and vice versa, so that external
    /// couplers are straight segments. Pegasus qubits are placed at the
    /// middle of the segment that they span.
    pub fn layout(&self) -> Vec<(f64, f64)> {
        let positions: Vec<(f64, f64)> = self
            .graph
            .node_weights()
            .map(|weight| match (&self.kind, weight.coordinates) {
                (
                    TopologyKind::Chimera(params),
                    Coordinates::Chimera {
                        row,
                        column,
                        shore,
                        index,
                    },
                ) => chimera_position(params.shore_size, row, column, shore, index),
                (_, Coordinates::Pegasus { u, w, k, z }) => pegasus_position(u, w, k, z),
                (_, Coordinates::Chimera { .. }) => (0.0, 0.0),
            })
            .collect();
        normalize(positions)
    }

    pub fn to_dot(&self) -> String {
        format!(
            "{}",
            petgraph::dot::Dot::with_config(&self.graph, &[petgraph::dot::Config::EdgeNoLabel])
        )
    }
}

fn chimera_position(shore_size: u32, row: u32, column: u32, shore: u32, index: u32) -> (f64, f64) {
    let p = (if index < shore_size / 2 { index } else { index + 1 }) as f64;
    let center = shore_size as f64 / 2.0;
    let (x, y) = if shore == 0 { (p, center) } else { (center, p) };
    let tile = (shore_size + 1) as f64;
    (x + tile * column as f64, y + tile * row as f64)
}

fn pegasus_position(u: u32, w: u32, k: u32, z: u32) -> (f64, f64) {
    let cell = PEGASUS_CELL as f64;
    let half_length = (cell - 1.0) / 2.0;
    let perpendicular = cell * w as f64 + k as f64;
    if u == 0 {
        let offset = PEGASUS_VERTICAL_OFFSETS[k as usize] as f64;
        (perpendicular, cell * z as f64 + offset + half_length)
    } else {
        let offset = PEGASUS_HORIZONTAL_OFFSETS[k as usize] as f64;
        (cell * z as f64 + offset + half_length, perpendicular)
    }
}

fn normalize(positions: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let min_x = positions.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = positions.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = positions.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = positions.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let scale = (max_x - min_x).max(max_y - min_y);
    if !(scale > 0.0) {
        return positions.iter().map(|_| (0.5, 0.5)).collect();
    }
    positions
        .into_iter()
        .map(|(x, y)| ((x - min_x) / scale, (y - min_y) / scale))
        .collect()
}
