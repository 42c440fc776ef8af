//! Contact detection for circles against circles and static boxes

use glam::Vec2;

/// Result of a contact check
#[derive(Debug, Clone)]
pub struct ContactResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Contact point (if hit)
    pub point: Vec2,
    /// Unit normal. Circle/circle: from A toward B. Circle/box: from box toward circle.
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl ContactResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between two circles
pub fn circle_circle_contact(
    pos_a: Vec2,
    radius_a: f32,
    pos_b: Vec2,
    radius_b: f32,
) -> ContactResult {
    let delta = pos_b - pos_a;
    let dist_sq = delta.length_squared();
    let reach = radius_a + radius_b;

    if dist_sq >= reach * reach {
        return ContactResult::miss();
    }

    let dist = dist_sq.sqrt();
    // Coincident centers: separate straight up so stacking stays stable
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::NEG_Y
    };

    ContactResult {
        hit: true,
        point: pos_a + normal * radius_a,
        normal,
        penetration: reach - dist,
    }
}

/// Check overlap between a circle and an axis-aligned box
pub fn circle_box_contact(
    circle_pos: Vec2,
    radius: f32,
    box_center: Vec2,
    half_extents: Vec2,
) -> ContactResult {
    let min = box_center - half_extents;
    let max = box_center + half_extents;
    let closest = circle_pos.clamp(min, max);
    let delta = circle_pos - closest;
    let dist_sq = delta.length_squared();

    if dist_sq >= radius * radius {
        return ContactResult::miss();
    }

    if dist_sq > f32::EPSILON {
        let dist = dist_sq.sqrt();
        return ContactResult {
            hit: true,
            point: closest,
            normal: delta / dist,
            penetration: radius - dist,
        };
    }

    // Center is inside the box: push out through the nearest face
    let to_min = circle_pos - min;
    let to_max = max - circle_pos;
    let candidates = [
        (to_min.x, Vec2::NEG_X),
        (to_max.x, Vec2::X),
        (to_min.y, Vec2::NEG_Y),
        (to_max.y, Vec2::Y),
    ];
    let (depth, normal) = candidates
        .into_iter()
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((0.0, Vec2::NEG_Y));

    ContactResult {
        hit: true,
        point: circle_pos - normal * depth,
        normal,
        penetration: radius + depth,
    }
}
