//! Scene-cut detection from the textual per-frame score stream.
//!
//! The external extractor prints one `frame:` line per analyzed frame (its
//! last colon-delimited field is the timestamp in seconds) followed by one
//! score line carrying a float after `=`. Pairing is by emission order.
//!
//! Detection degrades gracefully: malformed lines are skipped with a warning
//! and an empty cut-point list is a valid result, because the caller can
//! always fall back to fingerprinting the whole asset as one segment.

/// Scene score threshold above which a cut point is created.
pub const DEFAULT_SCENE_LIMIT: f64 = 0.4;

/// Parse the per-frame score stream into an ascending cut-point list.
///
/// A timestamp becomes a cut point when its paired score reaches
/// `scene_limit`. If the resulting list does not already end at the last
/// analyzed frame's timestamp, that timestamp is appended to close the final
/// segment. The cut at index 0 is dropped: it coincides with the asset start
/// and would only create a degenerate zero-frame first segment.
///
/// The returned list never contains the asset start and, when non-empty, ends
/// at the last frame's timestamp.
pub fn parse_scene_cuts(scene_text: &str, scene_limit: f64) -> Vec<f64> {
    let mut times: Vec<f64> = Vec::new();
    let mut scores: Vec<f64> = Vec::new();

    for line in scene_text.lines() {
        let line = line.trim();
        if line.starts_with("frame:") {
            match last_field(line, ':') {
                Some(ts) => times.push(ts),
                None => log::warn!("skipping unparsable frame line: {:?}", line),
            }
        } else if line.contains("scene_score") {
            match last_field(line, '=') {
                Some(score) => scores.push(score),
                None => log::warn!("skipping unparsable score line: {:?}", line),
            }
        }
    }

    let mut cuts: Vec<f64> = times
        .iter()
        .zip(scores.iter())
        .filter(|(_, &score)| score >= scene_limit)
        .map(|(&time, _)| time)
        .collect();
    if cuts.is_empty() {
        return cuts;
    }

    if let Some(&last_time) = times.last() {
        if cuts.last() != Some(&last_time) {
            cuts.push(last_time);
        }
    }
    // The first detected cut is always the asset start.
    cuts.remove(0);
    cuts
}

fn last_field(line: &str, sep: char) -> Option<f64> {
    line.rsplit(sep).next()?.trim().parse::<f64>().ok()
}
