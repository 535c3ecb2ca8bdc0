//! Cross-page selection passing.
//!
//! A table row links to another page as `"<route>?university=<token>"`.
//! The receiving page keeps the token in a [`PendingNavigation`] and
//! consumes it exactly once; after that its own selection wins.

use url::form_urlencoded;

use crate::error::NavError;

pub const UNIVERSITY_PARAM: &str = "university";

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    AssessmentRank,
    AssessmentDetail,
    GeneralRank,
    GeneralTrend,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::AssessmentRank,
        Route::AssessmentDetail,
        Route::GeneralRank,
        Route::GeneralTrend,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::AssessmentRank => "assessment-rank",
            Route::AssessmentDetail => "assessment-detail",
            Route::GeneralRank => "general-rank",
            Route::GeneralTrend => "general-trend",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "首页",
            Route::AssessmentRank => "综评排名查询",
            Route::AssessmentDetail => "综合评价分析",
            Route::GeneralRank => "普通本科投档排名查询",
            Route::GeneralTrend => "普通本科投档趋势分析",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.slug() == slug)
    }
}

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// URL-safe token for a university name.
pub fn encode(key: &str) -> String {
    form_urlencoded::byte_serialize(key.as_bytes()).collect()
}

/// Undo [`encode`] without checking the result against any key set.
pub fn unescape(token: &str) -> String {
    let query = format!("{UNIVERSITY_PARAM}={token}");
    form_urlencoded::parse(query.as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

/// Decode a token and check it names a known university.
pub fn decode<S: AsRef<str>>(token: &str, known: &[S]) -> Result<String, NavError> {
    let key = unescape(token);
    if known.iter().any(|k| k.as_ref() == key) {
        Ok(key)
    } else {
        Err(NavError::Unresolved(key))
    }
}

pub fn link(route: Route, key: &str) -> String {
    format!("{}?{UNIVERSITY_PARAM}={}", route.slug(), encode(key))
}

/// Split a link into its route and the raw `university` token, if any.
pub fn parse_link(link: &str) -> Option<(Route, Option<String>)> {
    let (path, query) = match link.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (link, None),
    };
    let route = Route::from_slug(path)?;
    let token = query.and_then(|q| {
        q.split('&').find_map(|pair| {
            pair.strip_prefix(UNIVERSITY_PARAM)
                .and_then(|rest| rest.strip_prefix('='))
                .map(str::to_string)
        })
    });
    Some((route, token))
}

// ---------------------------------------------------------------------------
// One-shot consumption
// ---------------------------------------------------------------------------

/// The `university` parameter a page received and has not yet consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingNavigation {
    token: Option<String>,
}

impl PendingNavigation {
    /// A new navigation event replaces anything not yet consumed.
    pub fn arrive(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn is_pending(&self) -> bool {
        self.token.is_some()
    }

    /// The raw token, for showing the address before it is consumed.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Consume the parameter. Returns `None` when nothing is pending, so
    /// repeated calls after the first never touch the page's selection.
    pub fn take<S: AsRef<str>>(&mut self, known: &[S]) -> Option<Result<String, NavError>> {
        let token = self.token.take()?;
        let outcome = decode(&token, known);
        if let Err(e) = &outcome {
            log::warn!("Navigation parameter ignored: {e}");
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_reserved_characters() {
        for key in ["上海 大学", "A & B University", "x+y=z%20?", "复旦大学（医学院）"] {
            let token = encode(key);
            assert!(!token.contains(' ') && !token.contains('&') && !token.contains('='));
            assert_eq!(decode(&token, &[key]), Ok(key.to_string()));
        }
    }

    #[test]
    fn unknown_key_is_unresolved() {
        let token = encode("清华大学");
        assert_eq!(
            decode(&token, &["上海大学"]),
            Err(NavError::Unresolved("清华大学".into()))
        );
    }

    #[test]
    fn link_parses_back() {
        let l = link(Route::GeneralTrend, "同济 & 大学");
        let (route, token) = parse_link(&l).unwrap();
        assert_eq!(route, Route::GeneralTrend);
        assert_eq!(unescape(&token.unwrap()), "同济 & 大学");

        assert_eq!(parse_link("home"), Some((Route::Home, None)));
        assert_eq!(parse_link("nowhere?university=x"), None);
    }

    #[test]
    fn pending_is_consumed_once() {
        let known = vec!["上海大学".to_string()];
        let mut nav = PendingNavigation::default();
        assert!(nav.take(&known).is_none());

        nav.arrive(Some(encode("上海大学")));
        assert!(nav.is_pending());
        assert_eq!(nav.take(&known), Some(Ok("上海大学".to_string())));
        assert!(!nav.is_pending());
        assert!(nav.take(&known).is_none());

        nav.arrive(Some(encode("北京大学")));
        assert!(matches!(nav.take(&known), Some(Err(NavError::Unresolved(_)))));
        assert!(nav.take(&known).is_none());
    }
}
