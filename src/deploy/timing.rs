use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

static DEPLOY_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d{4}-\d{2}-\d{2}-\d{4})").expect("valid deploy time pattern"));

/// Deploy time embedded in a tag such as `production-2016-10-22-0103`.
pub fn parse_when(tag: &str) -> Option<NaiveDateTime> {
    let caps = DEPLOY_TIME.captures(tag)?;
    NaiveDateTime::parse_from_str(&caps[1], "%Y-%m-%d-%H%M").ok()
}

/// Human description of the gap between two deploy tags, e.g. `after 3.5 hours`.
///
/// Untimestamped names (branches) yield `pending deploy`.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn time_between_deploys(from: &str, to: &str) -> String {
    let (Some(deploy_time), Some(last_time)) = (parse_when(to), parse_when(from)) else {
        return "pending deploy".to_string();
    };

    let hours = (deploy_time - last_time).num_seconds() as f64 / 3600.0;
    if hours < 24.0 {
        format!("after {hours:.1} hours")
    } else {
        format!("after {:.1} days", hours / 24.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_when() {
        let when = parse_when("production-2016-10-22-0103").expect("timestamped tag");
        assert_eq!(when.to_string(), "2016-10-22 01:03:00");
        assert!(parse_when("origin/master").is_none());
        assert!(parse_when("staging-2016-13-40-9999").is_none());
    }

    #[test]
    fn test_time_between_deploys() {
        assert_eq!(
            time_between_deploys("production-2016-10-22-0103", "production-2016-10-22-0433"),
            "after 3.5 hours"
        );
        assert_eq!(
            time_between_deploys("production-2016-10-20-0000", "production-2016-10-22-1200"),
            "after 2.5 days"
        );
        assert_eq!(
            time_between_deploys("production-2016-10-22-0103", "master"),
            "pending deploy"
        );
        assert_eq!(
            time_between_deploys("production", "staging"),
            "pending deploy"
        );
    }
}
