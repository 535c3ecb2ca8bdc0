use super::model::{Detailed, Ranked, Record};

// ---------------------------------------------------------------------------
// Rank proximity
// ---------------------------------------------------------------------------

/// A row that fell inside the rank window, with its distance to the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a, T> {
    pub row: &'a T,
    pub distance: u64,
}

/// Rows of `year` whose rank lies within `tolerance` of `target`, nearest
/// first.  Ties keep file order.
///
/// An unknown year, or no rank close enough, gives an empty result.
pub fn proximity_filter<'a, T: Ranked>(
    rows: &'a [T],
    year: u16,
    target: i64,
    tolerance: u32,
) -> Vec<Match<'a, T>> {
    let mut matches: Vec<Match<'a, T>> = rows
        .iter()
        .filter(|r| r.partition() == year)
        .filter_map(|r| {
            let rank = r.rank()?;
            let distance = (i64::from(rank) - target).unsigned_abs();
            (distance <= u64::from(tolerance)).then_some(Match { row: r, distance })
        })
        .collect();

    // `sort_by_key` is stable.
    matches.sort_by_key(|m| m.distance);
    matches
}

/// Inclusive rank window shown in page headers.
pub fn rank_window(target: i64, tolerance: u32) -> (i64, i64) {
    let t = i64::from(tolerance);
    (target - t, target + t)
}

// ---------------------------------------------------------------------------
// Exact lookup
// ---------------------------------------------------------------------------

/// Rows of exactly `university`, optionally restricted to one category.
/// No fuzzy matching here; an empty result is a valid answer.
pub fn lookup<'a, T: Record>(
    rows: &'a [T],
    university: &str,
    category: Option<&str>,
) -> Vec<&'a T> {
    rows.iter()
        .filter(|r| r.university() == university)
        .filter(|r| category.map_or(true, |c| r.category() == Some(c)))
        .collect()
}

/// Order looked-up rows for display: most selective (lowest rank) first,
/// rows without any rank last.
pub fn sort_by_rank<T: Detailed>(rows: &mut [&T]) {
    rows.sort_by_key(|r| (r.sort_rank().is_none(), r.sort_rank()));
}

/// Sorted distinct values of `key` among `rows`.
pub fn distinct_sorted<'a, T, F>(rows: &[&'a T], key: F) -> Vec<&'a str>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut values: Vec<&'a str> = rows.iter().map(|r| key(*r)).collect();
    values.sort_unstable();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{AdmissionDetailRecord, AdmissionRecord, AssessmentRecord};

    fn rec(year: u16, uni: &str, group: &str, rank: u32) -> AdmissionRecord {
        AdmissionRecord {
            year,
            university: uni.into(),
            group_code: group.into(),
            group_name: format!("{uni}{group}"),
            major_list: String::new(),
            score: 500,
            rank,
        }
    }

    fn detail(uni: &str, batch: &str, avg: Option<u32>, low: Option<u32>) -> AdmissionDetailRecord {
        AdmissionDetailRecord {
            university: uni.into(),
            batch: batch.into(),
            group_name: "g".into(),
            major_name: "m".into(),
            enrollment: None,
            highest_score: None,
            lowest_score: None,
            average_score: None,
            lowest_rank: low,
            average_rank: avg,
        }
    }

    #[test]
    fn window_of_500_around_5000() {
        let rows = vec![
            rec(2024, "A", "1", 4400),
            rec(2024, "B", "1", 5500),
            rec(2024, "C", "1", 4900),
            rec(2023, "D", "1", 5000),
            rec(2024, "E", "1", 5100),
            rec(2024, "F", "1", 4500),
            rec(2024, "G", "1", 5501),
        ];
        let got = proximity_filter(&rows, 2024, 5000, 500);
        let names: Vec<&str> = got.iter().map(|m| m.row.university.as_str()).collect();
        // C and E tie at 100; B and F tie at 500. File order breaks ties.
        assert_eq!(names, vec!["C", "E", "B", "F"]);
        for m in &got {
            assert!((4500..=5500).contains(&m.row.rank));
        }
        assert!(got.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn zero_tolerance_is_exact() {
        let rows = vec![rec(2024, "A", "1", 300), rec(2024, "B", "1", 301), rec(2024, "C", "2", 300)];
        let got = proximity_filter(&rows, 2024, 300, 0);
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|m| m.row.rank == 300 && m.distance == 0));
        assert!(proximity_filter(&rows, 2024, 299, 0).is_empty());
    }

    #[test]
    fn unknown_year_and_negative_target() {
        let rows = vec![rec(2024, "A", "1", 50)];
        assert!(proximity_filter(&rows, 1999, 50, 100).is_empty());
        let got = proximity_filter(&rows, 2024, -20, 100);
        assert_eq!(got[0].distance, 70);
    }

    #[test]
    fn assessment_rows_without_rank_never_match() {
        let row = AssessmentRecord {
            year: 2024,
            university: "A".into(),
            group_code: String::new(),
            group_name: String::new(),
            major_name: "m".into(),
            enrollment: None,
            highest_score: None,
            lowest_score: None,
            lowest_rank: None,
            average_score: None,
            average_rank: Some(10),
        };
        assert!(proximity_filter(&[row], 2024, 10, 5000).is_empty());
    }

    #[test]
    fn lookup_is_exact() {
        let rows = vec![
            detail("Fudan", "普通本科", Some(1), None),
            detail("Fudan University Branch", "普通本科", Some(2), None),
            detail("fudan", "普通本科", Some(3), None),
        ];
        let got = lookup(&rows, "Fudan", None);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].university, "Fudan");
        assert!(lookup(&rows, "Fud", None).is_empty());
    }

    #[test]
    fn lookup_with_category() {
        let rows = vec![
            detail("A", "普通本科", Some(1), None),
            detail("A", "艺术类", Some(2), None),
        ];
        let got = lookup(&rows, "A", Some("普通本科"));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].batch, "普通本科");
        assert!(lookup(&rows, "A", Some("专科")).is_empty());
    }

    #[test]
    fn rank_sort_falls_back_to_lowest_rank() {
        let rows = vec![
            detail("A", "b", None, None),
            detail("A", "b", Some(900), Some(100)),
            detail("A", "b", None, Some(500)),
            detail("A", "b", Some(200), None),
        ];
        let mut got = lookup(&rows, "A", None);
        sort_by_rank(&mut got);
        let keys: Vec<Option<u32>> = got.iter().map(|r| r.sort_rank()).collect();
        assert_eq!(keys, vec![Some(200), Some(500), Some(900), None]);
    }

    #[test]
    fn window_bounds() {
        assert_eq!(rank_window(5000, 500), (4500, 5500));
    }
}
