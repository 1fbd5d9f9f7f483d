//! Body-part identifiers as named by the body model's meshes.

/// Mesh names with the anatomical description the diagnosis prompt uses
pub const BODY_PARTS: &[(&str, &str)] = &[
    ("left_elbow", "left elbow (lateral epicondyle)"),
    ("right_knee", "right knee (patellar region)"),
    ("left_shoulder", "left shoulder (glenohumeral joint)"),
    ("upper_arm", "upper arm (biceps/triceps region)"),
];

/// Anatomical description for a part id; unknown ids pass through unchanged.
pub fn anatomical_name(part: &str) -> &str {
    BODY_PARTS
        .iter()
        .find(|(id, _)| *id == part)
        .map(|(_, name)| *name)
        .unwrap_or(part)
}

/// Form display: `left_elbow` -> `left elbow`
pub fn display_name(part: &str) -> String {
    part.replace('_', " ")
}

pub fn is_known(part: &str) -> bool {
    BODY_PARTS.iter().any(|(id, _)| *id == part)
}
