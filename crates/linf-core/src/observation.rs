//! Observation tables for joint multi-view problems.
//!
//! An [`ObservationTable`] is the flat list of `(pixel, point, camera)`
//! records consumed by the translation + structure problem. It can be
//! converted from/to the column-major "mega matrix" layout where each column
//! holds `[u, v, point_index, camera_index]`.

use crate::{Pt2, Real};
use anyhow::{ensure, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Pixel observation of one 3D point in one camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observed pixel coordinate.
    pub pixel: Pt2,
    /// Index of the observed 3D point.
    pub point: usize,
    /// Index of the observing camera.
    pub camera: usize,
}

impl Observation {
    pub fn new(pixel: Pt2, point: usize, camera: usize) -> Self {
        Self {
            pixel,
            point,
            camera,
        }
    }
}

/// Flat table of observations spanning many points and cameras.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationTable {
    observations: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Build a table where camera `c` observes every point, in point order.
    ///
    /// `views[c][p]` is the projection of point `p` in camera `c`.
    pub fn from_views(views: &[Vec<Pt2>]) -> Self {
        let observations = views
            .iter()
            .enumerate()
            .flat_map(|(camera, pixels)| {
                pixels
                    .iter()
                    .enumerate()
                    .map(move |(point, px)| Observation::new(*px, point, camera))
            })
            .collect();
        Self { observations }
    }

    /// Parse the `4 x N` mega matrix layout `[u, v, point, camera]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix does not have 4 rows or an index entry is
    /// not a non-negative integer.
    pub fn from_mega_matrix(m: &DMatrix<Real>) -> Result<Self> {
        ensure!(
            m.nrows() == 4,
            "observation matrix must have 4 rows, got {}",
            m.nrows()
        );
        let mut observations = Vec::with_capacity(m.ncols());
        for (col, c) in m.column_iter().enumerate() {
            let point = index_entry(c[2], col, "point")?;
            let camera = index_entry(c[3], col, "camera")?;
            observations.push(Observation::new(Pt2::new(c[0], c[1]), point, camera));
        }
        Ok(Self { observations })
    }

    /// Export the table in the `4 x N` mega matrix layout.
    pub fn to_mega_matrix(&self) -> DMatrix<Real> {
        let mut m = DMatrix::zeros(4, self.observations.len());
        for (col, obs) in self.observations.iter().enumerate() {
            m[(0, col)] = obs.pixel.x;
            m[(1, col)] = obs.pixel.y;
            m[(2, col)] = obs.point as Real;
            m[(3, col)] = obs.camera as Real;
        }
        m
    }

    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of points referenced by the table (`max index + 1`).
    pub fn num_points(&self) -> usize {
        self.observations
            .iter()
            .map(|o| o.point + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of cameras referenced by the table (`max index + 1`).
    pub fn num_cameras(&self) -> usize {
        self.observations
            .iter()
            .map(|o| o.camera + 1)
            .max()
            .unwrap_or(0)
    }
}

impl FromIterator<Observation> for ObservationTable {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn index_entry(value: Real, col: usize, what: &str) -> Result<usize> {
    ensure!(
        value.is_finite() && value >= 0.0 && value.fract() == 0.0,
        "column {col}: {what} index must be a non-negative integer, got {value}"
    );
    Ok(value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_max_index() {
        let table = ObservationTable::new(vec![
            Observation::new(Pt2::new(0.0, 0.0), 4, 0),
            Observation::new(Pt2::new(1.0, 0.0), 1, 2),
        ]);
        assert_eq!(table.num_points(), 5);
        assert_eq!(table.num_cameras(), 3);
        assert_eq!(ObservationTable::default().num_points(), 0);
    }

    #[test]
    fn from_views_orders_by_camera_then_point() {
        let views = vec![
            vec![Pt2::new(0.0, 0.0), Pt2::new(1.0, 1.0)],
            vec![Pt2::new(2.0, 2.0), Pt2::new(3.0, 3.0)],
        ];
        let table = ObservationTable::from_views(&views);
        assert_eq!(table.len(), 4);
        let third = table.as_slice()[2];
        assert_eq!((third.camera, third.point), (1, 0));
        assert_eq!(third.pixel, Pt2::new(2.0, 2.0));
    }

    #[test]
    fn mega_matrix_layout_is_preserved() {
        let table = ObservationTable::new(vec![
            Observation::new(Pt2::new(0.5, -0.5), 3, 1),
            Observation::new(Pt2::new(0.25, 0.75), 0, 0),
        ]);
        let m = table.to_mega_matrix();
        assert_eq!(m.nrows(), 4);
        assert_eq!(m[(2, 0)], 3.0);
        let back = ObservationTable::from_mega_matrix(&m).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn mega_matrix_rejects_fractional_index() {
        let mut m = DMatrix::zeros(4, 1);
        m[(2, 0)] = 1.5;
        assert!(ObservationTable::from_mega_matrix(&m).is_err());
        assert!(ObservationTable::from_mega_matrix(&DMatrix::zeros(3, 1)).is_err());
    }

    #[test]
    fn table_serializes_as_plain_list() {
        let table = ObservationTable::new(vec![Observation::new(Pt2::new(1.0, 2.0), 3, 1)]);
        let json = serde_json::to_value(&table).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["point"], 3);
        assert_eq!(json[0]["camera"], 1);
        let back: ObservationTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}
