//! Formatting utilities

use humansize::{DECIMAL, format_size};
use md5_model::glam::{Quat, Vec3};

/// Format a byte count in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a vector as `(x, y, z)` with four decimals
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

/// Format a quaternion as `(x, y, z, w)` with four decimals
pub fn format_quat(q: Quat) -> String {
    format!("({:.4}, {:.4}, {:.4}, {:.4})", q.x, q.y, q.z, q.w)
}

/// Joint name, or `-` for a root
pub fn format_parent(parent: Option<usize>, names: &[&str]) -> String {
    match parent {
        Some(index) => names
            .get(index)
            .map_or_else(|| format!("#{index}"), |name| format!("{name} (#{index})")),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
        assert_eq!(format_bytes(1048576), "1.05 MB");
    }

    #[test]
    fn test_format_vec3() {
        assert_eq!(format_vec3(Vec3::new(1.0, -0.5, 0.0)), "(1.0000, -0.5000, 0.0000)");
        assert_eq!(format_quat(Quat::IDENTITY), "(0.0000, 0.0000, 0.0000, 1.0000)");
    }

    #[test]
    fn test_format_parent() {
        let names = ["origin", "hip"];
        assert_eq!(format_parent(None, &names), "-");
        assert_eq!(format_parent(Some(1), &names), "hip (#1)");
        assert_eq!(format_parent(Some(7), &names), "#7");
    }
}
