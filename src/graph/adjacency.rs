use std::{fmt, str::FromStr};

use anyhow::{Result, ensure};
use geo::{MultiPolygon, Relate};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::geom::PolygonSet;

/// Which boundary contacts count as adjacency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contiguity {
    /// Any shared boundary point, including a single corner (DE-9IM touches).
    #[default]
    Queen,
    /// A shared boundary segment of positive length.
    Rook,
}

/// How candidate pairs are enumerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjacencySearch {
    /// Test every pair of polygons.
    Exhaustive,
    /// Test only pairs whose bounding boxes intersect, found through the R-tree.
    #[default]
    Indexed,
}

impl FromStr for Contiguity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "queen" => Ok(Self::Queen),
            "rook" => Ok(Self::Rook),
            other => Err(format!("unknown contiguity {other:?}, expected queen or rook")),
        }
    }
}

impl FromStr for AdjacencySearch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exhaustive" => Ok(Self::Exhaustive),
            "indexed" => Ok(Self::Indexed),
            other => Err(format!("unknown search {other:?}, expected exhaustive or indexed")),
        }
    }
}

/// Symmetric 0/1 matrix of polygon adjacency, with ones on the diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyMatrix(Array2<f64>);

impl AdjacencyMatrix {
    /// Test every relevant pair of polygons and record which ones touch.
    pub fn build(polygons: &PolygonSet, contiguity: Contiguity, search: AdjacencySearch) -> Result<Self> {
        let n = polygons.len();
        let _span = info_span!("adjacency", n, ?contiguity, ?search).entered();

        let mut matrix = Array2::<f64>::eye(n);
        let mut tested = 0usize;

        for i in 0..n {
            let candidates = match search {
                AdjacencySearch::Exhaustive => (i + 1..n).collect::<Vec<_>>(),
                AdjacencySearch::Indexed => polygons.candidates(i, 0.0).into_iter()
                    .filter(|&j| j > i) // check each unordered pair once
                    .collect(),
            };

            for j in candidates {
                tested += 1;
                if touches(polygons.shape(i), polygons.shape(j), contiguity)? {
                    matrix[[i, j]] = 1.0;
                    matrix[[j, i]] = 1.0;
                }
            }
        }

        let adjacency = Self(matrix);
        debug!(tested, "pair predicates evaluated");
        info!(edges = adjacency.edge_count(), "built adjacency matrix");
        Ok(adjacency)
    }

    /// Wrap an existing matrix, checking that it is square, symmetric, 0/1 and has a unit diagonal.
    pub fn from_array(matrix: Array2<f64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        ensure!(rows == cols, "adjacency matrix must be square, got {rows}x{cols}");
        for ((i, j), &value) in matrix.indexed_iter() {
            ensure!(value == 0.0 || value == 1.0, "adjacency entry ({i},{j}) = {value} is not 0 or 1");
            ensure!(value == matrix[[j, i]], "adjacency matrix is not symmetric at ({i},{j})");
            ensure!(i != j || value == 1.0, "adjacency diagonal entry ({i},{i}) must be 1");
        }
        Ok(Self(matrix))
    }

    /// Number of polygons (rows).
    #[inline] pub fn len(&self) -> usize { self.0.nrows() }

    #[inline] pub fn is_empty(&self) -> bool { self.0.is_empty() }

    #[inline] pub fn as_array(&self) -> &Array2<f64> { &self.0 }

    /// Whether polygons `i` and `j` are adjacent (always true for `i == j`).
    #[inline] pub fn is_adjacent(&self, i: usize, j: usize) -> bool { self.0[[i, j]] == 1.0 }

    /// Indices adjacent to `i`, excluding `i` itself.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.0.row(i).into_iter().enumerate()
            .filter(move |&(j, &value)| j != i && value == 1.0)
            .map(|(j, _)| j)
    }

    /// Number of unordered adjacent pairs.
    pub fn edge_count(&self) -> usize {
        (0..self.len()).map(|i| self.neighbors(i).filter(|&j| j > i).count()).sum()
    }
}

impl fmt::Display for AdjacencyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.rows() {
            let line = row.iter().map(|&v| if v == 1.0 { '1' } else { '0' }).collect::<String>();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Boundary-contact predicate under the given contiguity rule.
fn touches(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>, contiguity: Contiguity) -> Result<bool> {
    let im = a.relate(b);
    Ok(match contiguity {
        Contiguity::Queen => im.is_touches(),
        // In the 9-char DE-9IM string, index 4 is Boundary/Boundary.
        Contiguity::Rook => im.is_touches() && im.matches("****1****")?,
    })
}
