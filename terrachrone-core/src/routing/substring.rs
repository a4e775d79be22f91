use geo::{Coord, Euclidean, Length, Line, LineString};

/// Part of `line` between two fractions of its length
///
/// Returns `None` for an empty interval or a line without length.
pub(crate) fn line_substring(line: &LineString<f64>, start: f64, end: f64) -> Option<LineString<f64>> {
    let (start, end) = (start.clamp(0.0, 1.0), end.clamp(0.0, 1.0));
    if end <= start {
        return None;
    }
    let total = Euclidean.length(line);
    if total <= 0.0 {
        return None;
    }
    let (from, to) = (start * total, end * total);

    let mut coords: Vec<Coord<f64>> = Vec::new();
    let mut travelled = 0.0;
    for segment in line.lines() {
        let segment_length = segment.dx().hypot(segment.dy());
        let segment_end = travelled + segment_length;

        if segment_length > 0.0 && segment_end > from && travelled < to {
            if coords.is_empty() {
                coords.push(interpolate(&segment, (from - travelled) / segment_length));
            }
            if segment_end <= to {
                coords.push(segment.end);
            } else {
                coords.push(interpolate(&segment, (to - travelled) / segment_length));
                break;
            }
        }
        travelled = segment_end;
    }

    (coords.len() >= 2).then(|| LineString::new(coords))
}

fn interpolate(segment: &Line<f64>, t: f64) -> Coord<f64> {
    let t = t.clamp(0.0, 1.0);
    segment.start + (segment.end - segment.start) * t
}
