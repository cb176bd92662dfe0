use crate::error::{OperationError, Result};
use crate::math::vector_3d::unit;
use crate::math::{Point3, Vector3};

/// Estimates a unit tangent at each point of a polyline.
///
/// Endpoints use the direction of their single adjacent span; interior
/// points use the normalized average of the incoming and outgoing spans.
/// Zero-length spans are skipped in favour of the nearest defined direction.
#[derive(Debug)]
pub struct EstimateTangents<'a> {
    points: &'a [Point3],
}

impl<'a> EstimateTangents<'a> {
    /// Creates a new tangent estimation operation.
    #[must_use]
    pub fn new(points: &'a [Point3]) -> Self {
        Self { points }
    }

    /// Executes the estimation.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 2 points are given or all points coincide.
    pub fn execute(&self) -> Result<Vec<Vector3>> {
        let n = self.points.len();
        if n < 2 {
            return Err(OperationError::InvalidInput(
                "at least 2 points are required to estimate tangents".to_owned(),
            )
            .into());
        }

        // Direction of span i -> i+1, None when the span has zero length.
        let spans: Vec<Option<Vector3>> = self
            .points
            .windows(2)
            .map(|w| unit(&(w[1] - w[0])))
            .collect();

        let Some(first_defined) = spans.iter().flatten().next().copied() else {
            return Err(OperationError::InvalidInput(
                "all points coincide, tangent is undefined".to_owned(),
            )
            .into());
        };

        // Fill undefined spans from the nearest defined span before them,
        // or the first defined span for a leading run.
        let mut filled = Vec::with_capacity(spans.len());
        let mut last = first_defined;
        for span in &spans {
            if let Some(dir) = span {
                last = *dir;
            }
            filled.push(last);
        }

        let mut tangents = Vec::with_capacity(n);
        tangents.push(filled[0]);
        for i in 1..n - 1 {
            let incoming = filled[i - 1];
            let outgoing = filled[i];
            // Reversal: keep the incoming direction.
            tangents.push(unit(&(incoming + outgoing)).unwrap_or(incoming));
        }
        tangents.push(filled[n - 2]);

        Ok(tangents)
    }
}
