use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GeometryError {
    #[error("Coordinate sets differ in size: {left} vs {right} atoms")]
    LengthMismatch { left: usize, right: usize },
    #[error("Cannot superpose empty coordinate sets")]
    Empty,
    #[error("Singular value decomposition did not converge")]
    Svd,
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().map(|p| p.coords).sum::<Vector3<f64>>();
    Some(Point3::from(sum / points.len() as f64))
}

/// Root-mean-square deviation of two coordinate sets as they are, without superposition.
pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// Computes the rotation that best maps the centered `mobile` set onto the centered
/// `reference` set (Kabsch).
///
/// Both slices must already be centered on their centroids and have equal length.
fn optimal_rotation(
    reference: &[Vector3<f64>],
    mobile: &[Vector3<f64>],
) -> Result<Matrix3<f64>, GeometryError> {
    let mut cov = Matrix3::zeros();
    for (v_ref, v_mob) in reference.iter().zip(mobile) {
        cov += v_ref * v_mob.transpose();
    }

    let svd = cov.svd(true, true);
    let u = svd.u.ok_or(GeometryError::Svd)?;
    let v_t = svd.v_t.ok_or(GeometryError::Svd)?;

    let mut rotation = u * v_t;
    if rotation.determinant() < 0.0 {
        let mut correction = Matrix3::identity();
        correction[(2, 2)] = -1.0;
        rotation = u * correction * v_t;
    }
    Ok(rotation)
}

/// RMSD between two equally sized coordinate sets after optimal rigid superposition.
///
/// Atoms are paired by position in the slices. The result is invariant under any rotation or
/// translation applied to either set.
pub fn superposed_rmsd(
    reference: &[Point3<f64>],
    mobile: &[Point3<f64>],
) -> Result<f64, GeometryError> {
    if reference.len() != mobile.len() {
        return Err(GeometryError::LengthMismatch {
            left: reference.len(),
            right: mobile.len(),
        });
    }
    let (Some(center_ref), Some(center_mob)) = (centroid(reference), centroid(mobile)) else {
        return Err(GeometryError::Empty);
    };

    let centered_ref: Vec<Vector3<f64>> = reference.iter().map(|p| p - center_ref).collect();
    let centered_mob: Vec<Vector3<f64>> = mobile.iter().map(|p| p - center_mob).collect();

    let rotation = optimal_rotation(&centered_ref, &centered_mob)?;

    let squared_dist_sum: f64 = centered_ref
        .iter()
        .zip(&centered_mob)
        .map(|(r, m)| (r - rotation * m).norm_squared())
        .sum();
    Ok((squared_dist_sum / reference.len() as f64).sqrt())
}
