//! Status icons for CLI output

/// Status icons for application states
pub struct StatusIcon;

impl StatusIcon {
    /// Runs with at least one replica
    pub const SUCCESS: &'static str = "✓";

    /// Scaled down to zero
    pub const DOWNSCALED: &'static str = "⏸";

    /// Replica count left to the cluster default
    pub const UNKNOWN: &'static str = "?";

    pub fn get_replica_icon(replicas: Option<i32>) -> &'static str {
        match replicas {
            None => Self::UNKNOWN,
            Some(0) => Self::DOWNSCALED,
            Some(_) => Self::SUCCESS,
        }
    }

    pub fn get_replica_text(replicas: Option<i32>) -> String {
        match replicas {
            None => "default".to_string(),
            Some(n) => n.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_replica_icon() {
        assert_eq!(StatusIcon::get_replica_icon(Some(2)), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_replica_icon(Some(0)), StatusIcon::DOWNSCALED);
        assert_eq!(StatusIcon::get_replica_icon(None), StatusIcon::UNKNOWN);
    }

    #[test]
    fn test_get_replica_text() {
        assert_eq!(StatusIcon::get_replica_text(Some(3)), "3");
        assert_eq!(StatusIcon::get_replica_text(None), "default");
    }
}
