//! Planar geometry helpers for the simulation.
//!
//! The world is a plane: positions are [`Vec3`] with `z` carrying draw depth
//! only. Every helper here guards its degenerate inputs (zero-length vectors,
//! quadratics without a real root) and returns a well-defined value instead
//! of propagating NaN.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

/// Tolerance below which a quadratic's leading coefficient is treated as zero.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Wrap an angle into `[0, 2π)`.
///
/// # Example
///
/// ```
/// use salvo_core::math::wrap_angle;
/// use std::f32::consts::PI;
///
/// assert!((wrap_angle(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-5);
/// assert_eq!(wrap_angle(0.0), 0.0);
/// ```
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angle into `(-π, π]`, the shortest signed rotation.
#[must_use]
pub fn wrap_signed(angle: f32) -> f32 {
    let wrapped = wrap_angle(angle);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Signed rotation from direction `from` to direction `to`, in `(-π, π]`.
///
/// Positive is counter-clockwise. Zero-length inputs behave as the `+x` axis.
#[must_use]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    wrap_signed(to.y.atan2(to.x) - from.y.atan2(from.x))
}

/// Unit facing vector for a rotation angle.
#[must_use]
pub fn bearing(angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(cos, sin, 0.0)
}

/// Unit vector pointing to the right of a rotation angle.
#[must_use]
pub fn right_of(angle: f32) -> Vec3 {
    bearing(angle - PI / 2.0)
}

/// Heading angle of a planar vector (`atan2(y, x)`).
#[must_use]
pub fn heading(v: Vec3) -> f32 {
    v.y.atan2(v.x)
}

/// Planar distance between two points, ignoring depth.
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    a.truncate().distance(b.truncate())
}

/// Real roots of `a·t² + b·t + c = 0`, ascending.
///
/// A vanishing `a` falls back to the linear solution (both roots equal).
/// Returns `None` when no real root exists.
#[must_use]
pub fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a.abs() < DEGENERATE_EPSILON {
        if b.abs() < DEGENERATE_EPSILON {
            return None;
        }
        let t = -c / b;
        return t.is_finite().then_some((t, t));
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || !discriminant.is_finite() {
        return None;
    }

    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);
    Some((t1.min(t2), t1.max(t2)))
}

/// Earliest time in `[0, max_t]` at which a point moving from `origin` with
/// constant `velocity` touches the sphere at `center` with `radius`.
///
/// A point already inside the sphere hits at `t = 0`. Spheres behind the
/// point, or out of reach within `max_t`, report `None`.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use salvo_core::math::swept_sphere_hit;
///
/// let hit = swept_sphere_hit(Vec3::ZERO, Vec3::X * 10.0, Vec3::new(5.0, 0.0, 0.0), 1.0, 1.0);
/// assert!((hit.unwrap() - 0.4).abs() < 1e-5);
///
/// let behind = swept_sphere_hit(Vec3::ZERO, Vec3::X * 10.0, Vec3::new(-5.0, 0.0, 0.0), 1.0, 1.0);
/// assert!(behind.is_none());
/// ```
#[must_use]
pub fn swept_sphere_hit(
    origin: Vec3,
    velocity: Vec3,
    center: Vec3,
    radius: f32,
    max_t: f32,
) -> Option<f32> {
    let velocity = velocity.truncate();
    let offset = origin.truncate() - center.truncate();

    let c = offset.dot(offset) - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let a = velocity.dot(velocity);
    if a < DEGENERATE_EPSILON {
        return None;
    }
    let b = 2.0 * velocity.dot(offset);

    // Starting outside (c > 0) means both roots share a sign, so the
    // smaller one is the entry time.
    let (entry, _) = solve_quadratic(a, b, c)?;
    (entry >= 0.0 && entry <= max_t).then_some(entry)
}

/// Point at which a projectile fired from `shooter` at `projectile_speed`
/// meets a target moving in a straight line.
///
/// The target is first advanced by `target_velocity × time_offset`. The
/// larger positive root of the intercept quadratic wins; without one the
/// target's position one second ahead is returned.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use salvo_core::math::intercept_point;
///
/// // A stationary target is aimed at directly.
/// let aim = intercept_point(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, 20.0, 0.0);
/// assert!((aim - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
/// ```
#[must_use]
pub fn intercept_point(
    shooter: Vec3,
    target: Vec3,
    target_velocity: Vec3,
    projectile_speed: f32,
    time_offset: f32,
) -> Vec3 {
    let velocity = target_velocity.truncate();
    let predicted = target + target_velocity * time_offset;
    let fallback = predicted + target_velocity;
    let relative = predicted.truncate() - shooter.truncate();

    let a = velocity.dot(velocity) - projectile_speed * projectile_speed;
    let b = 2.0 * velocity.dot(relative);
    let c = relative.dot(relative);

    match solve_quadratic(a, b, c) {
        Some((_, t)) if t > 0.0 => predicted + target_velocity * t,
        _ => fallback,
    }
}
