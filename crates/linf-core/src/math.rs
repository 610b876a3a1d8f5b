use nalgebra::{Matrix3, Matrix3x4, Point2, Point3, Vector2, Vector3};

pub type Real = f64;

pub type Vec2 = Vector2<Real>;
pub type Vec3 = Vector3<Real>;
pub type Pt2 = Point2<Real>;
pub type Pt3 = Point3<Real>;
pub type Mat3 = Matrix3<Real>;

/// 3x4 camera projection matrix `P = K [R | t]`.
pub type Mat34 = Matrix3x4<Real>;

pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

pub fn from_homogeneous(v: &Vec3) -> Pt2 {
    Pt2::new(v.x / v.z, v.y / v.z)
}

/// Build `[M | t]` from a 3x3 block and a column.
pub fn mat34_from_parts(m: &Mat3, t: &Vec3) -> Mat34 {
    let mut p = Mat34::zeros();
    p.fixed_view_mut::<3, 3>(0, 0).copy_from(m);
    p.fixed_view_mut::<3, 1>(0, 3).copy_from(t);
    p
}

/// Project a world point through `P` with perspective division.
pub fn project(p: &Mat34, x: &Pt3) -> Pt2 {
    from_homogeneous(&(p * x.to_homogeneous()))
}

/// Homogeneous depth (third row of `P X`) of a world point.
pub fn depth(p: &Mat34, x: &Pt3) -> Real {
    (p * x.to_homogeneous()).z
}
