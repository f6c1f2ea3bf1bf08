/// Priority weight of a caption log
///
/// +1 per caption, -1 per tombstone. Lower weight is reviewed first.
/// Never cached: callers reload the log and recompute.
use super::data::CaptionRecord;

pub fn weight(log: &[CaptionRecord]) -> i64 {
    log.iter()
        .map(|record| if record.is_tombstone() { -1 } else { 1 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::CaptionLog;

    fn log(texts: &[&str]) -> CaptionLog {
        let json = serde_json::to_string(
            &texts
                .iter()
                .map(|t| serde_json::json!({ "text": t }))
                .collect::<Vec<_>>(),
        )
        .unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_empty_log_is_zero() {
        assert_eq!(weight(&[]), 0);
    }

    #[test]
    fn test_captions_minus_tombstones() {
        assert_eq!(weight(&log(&["a", "b", "c"])), 3);
        assert_eq!(weight(&log(&["DELETE_ME"])), -1);
        assert_eq!(weight(&log(&["a", "DELETE_ME", "DELETE_ME"])), -1);
        assert_eq!(weight(&log(&["a", "DELETE_ME", "b", "DELETE_ME"])), 0);
    }

    #[test]
    fn test_sentinel_is_case_sensitive() {
        assert_eq!(weight(&log(&["delete_me", "Delete_Me"])), 2);
    }
}
