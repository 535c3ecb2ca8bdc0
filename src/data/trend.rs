use std::collections::BTreeMap;

use super::model::AdmissionRecord;

// ---------------------------------------------------------------------------
// Trend series
// ---------------------------------------------------------------------------

/// One point of a group's history.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub year: u16,
    pub score: u32,
    pub rank: u32,
    pub group_code: String,
}

/// group_name → points, strictly ascending by year.
pub type GroupedSeries = BTreeMap<String, Vec<TrendPoint>>;

/// Per-group score/rank history of one university.
///
/// A repeated (year, group) keeps its first row.
pub fn project(rows: &[AdmissionRecord], university: &str) -> GroupedSeries {
    let mut series = GroupedSeries::new();

    for r in rows.iter().filter(|r| r.university == university) {
        let points = series.entry(r.group_name.clone()).or_default();
        if points.iter().any(|p| p.year == r.year) {
            log::warn!(
                "Duplicate trend row for {university} / {} in {}; keeping the first",
                r.group_name,
                r.year
            );
            continue;
        }
        points.push(TrendPoint {
            year: r.year,
            score: r.score,
            rank: r.rank,
            group_code: r.group_code.clone(),
        });
    }

    for points in series.values_mut() {
        points.sort_by_key(|p| p.year);
    }
    series
}

/// Distinct (code, name, majors) rows of a university for one year, in
/// file order.
pub fn group_summary<'a>(
    rows: &'a [AdmissionRecord],
    university: &str,
    year: u16,
) -> Vec<&'a AdmissionRecord> {
    let mut out: Vec<&AdmissionRecord> = Vec::new();
    for r in rows
        .iter()
        .filter(|r| r.university == university && r.year == year)
    {
        let seen = out.iter().any(|o| {
            o.group_code == r.group_code
                && o.group_name == r.group_name
                && o.major_list == r.major_list
        });
        if !seen {
            out.push(r);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Fuzzy university resolution
// ---------------------------------------------------------------------------

/// Keys containing `term`, case-insensitively, in their original order.
/// An empty term keeps every key.
pub fn resolve_candidates<'a, S: AsRef<str>>(keys: &'a [S], term: &str) -> Vec<&'a str> {
    let needle = term.to_lowercase();
    keys.iter()
        .map(|k| <S as AsRef<str>>::as_ref(k))
        .filter(|k| needle.is_empty() || k.to_lowercase().contains(&needle))
        .collect()
}

/// Outcome of a free-text university search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    NoMatch,
    /// Exactly one key; select it.
    Unique(&'a str),
    /// Several keys; the caller must let the user pick.
    Ambiguous(Vec<&'a str>),
}

pub fn resolve<'a, S: AsRef<str>>(keys: &'a [S], term: &str) -> Resolution<'a> {
    let mut candidates = resolve_candidates(keys, term);
    match candidates.len() {
        0 => Resolution::NoMatch,
        1 => Resolution::Unique(candidates.remove(0)),
        _ => Resolution::Ambiguous(candidates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: u16, uni: &str, group: &str, score: u32, rank: u32) -> AdmissionRecord {
        AdmissionRecord {
            year,
            university: uni.into(),
            group_code: "01".into(),
            group_name: group.into(),
            major_list: format!("{group} majors"),
            score,
            rank,
        }
    }

    #[test]
    fn series_are_ascending_per_group() {
        let rows = vec![
            rec(2024, "A", "g1", 580, 3000),
            rec(2022, "A", "g1", 570, 3500),
            rec(2023, "A", "g2", 560, 4000),
            rec(2023, "A", "g1", 575, 3200),
            rec(2022, "B", "g1", 600, 100),
            rec(2022, "A", "g2", 550, 4500),
        ];
        let s = project(&rows, "A");
        assert_eq!(s.len(), 2);
        let years: Vec<u16> = s["g1"].iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2022, 2023, 2024]);
        let years: Vec<u16> = s["g2"].iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2022, 2023]);
        assert_eq!(s["g1"][0].rank, 3500);
    }

    #[test]
    fn duplicate_year_keeps_first() {
        let rows = vec![rec(2023, "A", "g", 500, 10), rec(2023, "A", "g", 400, 20)];
        let s = project(&rows, "A");
        assert_eq!(s["g"].len(), 1);
        assert_eq!(s["g"][0].score, 500);
    }

    #[test]
    fn unknown_university_projects_nothing() {
        let rows = vec![rec(2023, "A", "g", 500, 10)];
        assert!(project(&rows, "Z").is_empty());
    }

    #[test]
    fn summary_is_one_year_and_distinct() {
        let rows = vec![
            rec(2024, "A", "g1", 1, 1),
            rec(2024, "A", "g1", 2, 2),
            rec(2023, "A", "g2", 3, 3),
            rec(2024, "A", "g3", 4, 4),
        ];
        let got: Vec<&str> = group_summary(&rows, "A", 2024)
            .iter()
            .map(|r| r.group_name.as_str())
            .collect();
        assert_eq!(got, vec!["g1", "g3"]);
    }

    #[test]
    fn candidates_are_case_insensitive_substrings() {
        let keys = ["Shanghai University", "Fudan University"];
        assert_eq!(resolve_candidates(&keys, "shanghai"), vec!["Shanghai University"]);
        assert_eq!(resolve_candidates(&keys, "UNIVERSITY"), keys.to_vec());
        assert_eq!(resolve_candidates(&keys, ""), keys.to_vec());
        assert!(resolve_candidates(&keys, "tongji").is_empty());
    }

    #[test]
    fn resolution_outcomes() {
        let keys = vec!["上海大学".to_string(), "上海交通大学".to_string(), "复旦大学".to_string()];
        assert_eq!(resolve(&keys, "复旦"), Resolution::Unique("复旦大学"));
        assert_eq!(
            resolve(&keys, "上海"),
            Resolution::Ambiguous(vec!["上海大学", "上海交通大学"])
        );
        assert_eq!(resolve(&keys, "同济"), Resolution::NoMatch);
    }
}
