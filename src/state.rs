use crate::config::AppConfig;
use crate::data::filter::{
    distinct_sorted, lookup, proximity_filter, rank_window, sort_by_rank, Match,
};
use crate::data::model::{AdmissionDetailRecord, AdmissionRecord, Dataset, Detailed, Ranked};
use crate::data::trend::{group_summary, project, resolve, GroupedSeries, Resolution};
use crate::error::NavError;
use crate::nav::{parse_link, PendingNavigation, Route};

// ---------------------------------------------------------------------------
// Query outcomes
// ---------------------------------------------------------------------------

/// Rows for a table, with "nothing matched" as its own state so pages
/// never draw an empty table.
#[derive(Debug, Clone, PartialEq)]
pub enum Rows<T> {
    NoMatch,
    Found(Vec<T>),
}

impl<T> Rows<T> {
    pub fn from_vec(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Rows::NoMatch
        } else {
            Rows::Found(rows)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Rows::NoMatch => 0,
            Rows::Found(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Rank search pages
// ---------------------------------------------------------------------------

/// Inputs of a rank-proximity page.
#[derive(Debug, Clone, PartialEq)]
pub struct RankQuery {
    /// `None` until the user picks; the newest year is used meanwhile.
    pub year: Option<u16>,
    pub target: u32,
    pub tolerance: u32,
}

impl RankQuery {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            year: None,
            target: config.default_rank,
            tolerance: config.default_tolerance,
        }
    }

    /// The chosen year if the data has it, else the newest one.
    pub fn effective_year(&self, years: &[u16]) -> Option<u16> {
        self.year
            .filter(|y| years.contains(y))
            .or_else(|| years.first().copied())
    }
}

#[derive(Debug)]
pub struct RankView<'a, T> {
    pub year: u16,
    pub window: (i64, i64),
    pub rows: Rows<Match<'a, T>>,
}

/// `None` when the table has no year at all.
pub fn rank_view<'a, T: Ranked>(
    dataset: &'a Dataset<T>,
    query: &RankQuery,
) -> Option<RankView<'a, T>> {
    let year = query.effective_year(&dataset.years)?;
    Some(rank_view_for(dataset, year, query))
}

/// Like [`rank_view`], but a chosen year is kept even when the data lacks
/// it, giving an empty result instead of the newest year.
pub fn rank_view_exact<'a, T: Ranked>(
    dataset: &'a Dataset<T>,
    query: &RankQuery,
) -> Option<RankView<'a, T>> {
    match query.year {
        Some(year) => Some(rank_view_for(dataset, year, query)),
        None => rank_view(dataset, query),
    }
}

fn rank_view_for<'a, T: Ranked>(
    dataset: &'a Dataset<T>,
    year: u16,
    query: &RankQuery,
) -> RankView<'a, T> {
    let target = i64::from(query.target);
    RankView {
        year,
        window: rank_window(target, query.tolerance),
        rows: Rows::from_vec(proximity_filter(&dataset.rows, year, target, query.tolerance)),
    }
}

// ---------------------------------------------------------------------------
// Assessment detail page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DetailPageState {
    pub selected: Option<String>,
    pub nav: PendingNavigation,
    /// University named by the last link when the data does not have it.
    pub notice: Option<String>,
}

impl DetailPageState {
    /// Apply a pending link parameter once, then make sure the selection
    /// names a known university (the first one by default).
    pub fn sync(&mut self, universities: &[String]) {
        if let Some(outcome) = self.nav.take(universities) {
            match outcome {
                Ok(key) => {
                    self.selected = Some(key);
                    self.notice = None;
                }
                Err(NavError::Unresolved(name)) => {
                    self.selected = None;
                    self.notice = Some(name);
                }
            }
        }
        let known = self
            .selected
            .as_ref()
            .is_some_and(|s| universities.contains(s));
        if !known {
            self.selected = universities.first().cloned();
        }
    }

    /// A choice made on the page; any link notice no longer applies.
    pub fn select(&mut self, university: String) {
        self.selected = Some(university);
        self.notice = None;
    }
}

/// Exact-match rows of one university, most selective first.
pub fn detail_view<'a, T: Detailed>(
    dataset: &'a Dataset<T>,
    university: &str,
    category: Option<&str>,
) -> Rows<&'a T> {
    let mut rows = lookup(&dataset.rows, university, category);
    sort_by_rank(&mut rows);
    Rows::from_vec(rows)
}

// ---------------------------------------------------------------------------
// General-track trend page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TrendPageState {
    /// Retained search text; survives re-renders and page switches.
    pub search_term: String,
    /// University the user picked among several matches.
    pub picked: Option<String>,
    /// Group chosen in the per-major detail table.
    pub group: Option<String>,
    pub nav: PendingNavigation,
    pub notice: Option<String>,
}

impl TrendPageState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            search_term: config.default_university.clone(),
            picked: None,
            group: None,
            nav: PendingNavigation::default(),
            notice: None,
        }
    }

    /// Apply a pending link parameter once. A known university replaces the
    /// search term and is picked outright, even when its name is part of
    /// other names; an unknown one leaves the retained term alone.
    pub fn sync(&mut self, universities: &[String]) {
        if let Some(outcome) = self.nav.take(universities) {
            match outcome {
                Ok(key) => {
                    self.picked = Some(key.clone());
                    self.search_term = key;
                    self.group = None;
                    self.notice = None;
                }
                Err(NavError::Unresolved(name)) => self.notice = Some(name),
            }
        }
    }

    pub fn set_search_term(&mut self, term: String) {
        if term != self.search_term {
            self.search_term = term;
            self.picked = None;
            self.group = None;
            self.notice = None;
        }
    }

    /// The user chose one of several matches.
    pub fn pick(&mut self, university: Option<String>) {
        if university != self.picked {
            self.picked = university;
            self.group = None;
            self.notice = None;
        }
    }

    /// Resolve the search term, honouring an earlier pick when it is still
    /// one of the candidates.
    pub fn selection<'a>(&self, universities: &'a [String]) -> Selection<'a> {
        match resolve(universities, &self.search_term) {
            Resolution::NoMatch => Selection::NoMatch,
            Resolution::Unique(u) => Selection::Selected(u),
            Resolution::Ambiguous(candidates) => {
                let picked = self
                    .picked
                    .as_deref()
                    .and_then(|p| candidates.iter().copied().find(|c| *c == p));
                match picked {
                    Some(u) => Selection::Picked { university: u, candidates },
                    None => Selection::NeedsChoice(candidates),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    NoMatch,
    Selected(&'a str),
    Picked {
        university: &'a str,
        candidates: Vec<&'a str>,
    },
    /// Several matches and nothing picked yet.
    NeedsChoice(Vec<&'a str>),
}

impl<'a> Selection<'a> {
    pub fn university(&self) -> Option<&'a str> {
        match self {
            Selection::Selected(u) | Selection::Picked { university: u, .. } => Some(*u),
            _ => None,
        }
    }

    pub fn candidates(&self) -> &[&'a str] {
        match self {
            Selection::Picked { candidates, .. } | Selection::NeedsChoice(candidates) => {
                candidates
            }
            _ => &[],
        }
    }
}

#[derive(Debug)]
pub struct TrendView<'a> {
    /// Newest year in the trend file, used for the group list.
    pub latest_year: Option<u16>,
    pub summary: Rows<&'a AdmissionRecord>,
    pub series: GroupedSeries,
}

pub fn trend_view<'a>(dataset: &'a Dataset<AdmissionRecord>, university: &str) -> TrendView<'a> {
    let latest_year = dataset.years.first().copied();
    let summary = latest_year
        .map(|y| group_summary(&dataset.rows, university, y))
        .unwrap_or_default();
    TrendView {
        latest_year,
        summary: Rows::from_vec(summary),
        series: project(&dataset.rows, university),
    }
}

#[derive(Debug)]
pub struct GroupDetailView<'a> {
    pub groups: Vec<&'a str>,
    pub group: Option<&'a str>,
    pub rows: Rows<&'a AdmissionDetailRecord>,
}

/// Per-major rows of one university in the given batch, restricted to one
/// group (the requested one if present, else the first).
pub fn group_detail_view<'a>(
    dataset: &'a Dataset<AdmissionDetailRecord>,
    university: &str,
    batch: &str,
    group: Option<&str>,
) -> GroupDetailView<'a> {
    let batch_rows = lookup(&dataset.rows, university, Some(batch));
    let groups = distinct_sorted(&batch_rows, |r| r.group_name.as_str());
    let group = group
        .and_then(|g| groups.iter().copied().find(|x| *x == g))
        .or_else(|| groups.first().copied());

    let mut rows: Vec<&AdmissionDetailRecord> = batch_rows
        .into_iter()
        .filter(|r| Some(r.group_name.as_str()) == group)
        .collect();
    sort_by_rank(&mut rows);

    GroupDetailView {
        groups,
        group,
        rows: Rows::from_vec(rows),
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub route: Route,
    pub general_rank: RankQuery,
    pub assessment_rank: RankQuery,
    pub assessment_detail: DetailPageState,
    pub general_trend: TrendPageState,
    /// Batch label of the general track in the detail file.
    pub general_batch: String,
    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            route: Route::Home,
            general_rank: RankQuery::new(config),
            assessment_rank: RankQuery::new(config),
            assessment_detail: DetailPageState::default(),
            general_trend: TrendPageState::new(config),
            general_batch: config.general_batch.clone(),
            status_message: None,
        }
    }

    /// Follow an in-app link. The `university` parameter goes to the target
    /// page, which consumes it on its next render.
    pub fn navigate(&mut self, link: &str) {
        let Some((route, token)) = parse_link(link) else {
            log::warn!("Ignoring unknown link '{link}'");
            return;
        };
        match route {
            Route::AssessmentDetail => self.assessment_detail.nav.arrive(token),
            Route::GeneralTrend => self.general_trend.nav.arrive(token),
            _ => {}
        }
        log::debug!("Navigate to {}", route.slug());
        self.route = route;
    }

    /// Address of the current page as it would appear in a browser bar;
    /// the parameter disappears once the page has consumed it.
    pub fn address(&self) -> String {
        let token = match self.route {
            Route::AssessmentDetail => self.assessment_detail.nav.token(),
            Route::GeneralTrend => self.general_trend.nav.token(),
            _ => None,
        };
        match token {
            Some(t) => format!("{}?{}={t}", self.route.slug(), crate::nav::UNIVERSITY_PARAM),
            None => self.route.slug().to_string(),
        }
    }
}
