//! End-to-end queries over CSV files on disk, driven through the library
//! the same way the pages and the CLI drive it.

use std::fs;
use std::path::Path;

use gaokao_lens::config::AppConfig;
use gaokao_lens::data::store::DataStore;
use gaokao_lens::error::LoadError;
use gaokao_lens::nav::{link, Route};
use gaokao_lens::state::{
    detail_view, group_detail_view, rank_view, trend_view, AppState, RankQuery, Rows, Selection,
};

const TREND: &str = "\
年份,院校名称,专业组代码,专业组名称,专业列表,投档分数,投档排位
2024,上海大学,01,上海大学01组,\"计算机,软件工程\",560,5200
2024,上海交通大学,02,上海交通大学02组,数学,600,700
2024,复旦大学,01,复旦大学01组,物理,598,800
2023,上海大学,01,上海大学01组,计算机,555,5600
2022,上海大学,01,上海大学01组,计算机,550,6000
2024,同济大学,03,同济大学03组,土木,570,4700
";

const DETAIL: &str = "\
university_name,batch,major_group_name,major_name,enrollment_count,highest_score,lowest_score,average_score,lowest_rank,average_rank
上海大学,普通本科,上海大学01组,计算机,20,580,560,566.5,5200,4700
上海大学,普通本科,上海大学01组,软件工程,15,575,561,,5100,
上海大学,普通本科,上海大学02组,法学,10,570,552,558,6200,5900
上海大学,艺术类,上海大学09组,美术,5,,,,,
";

const ASSESSMENT: &str = "\
\u{feff}year,university_name,group_code,group_name,major_name,lowest_score,lowest_rank,average_score,average_rank
2024,复旦大学,90,综评组,临床医学,600,900,605,700
2024,复旦大学,90,综评组,数学,590,1300,596,1000
2024,上海大学,90,综评组,计算机,540,5050,548,4800
2024,上海大学,90,综评组,通信,535,,,
";

fn write_all(dir: &Path, config: &AppConfig) {
    fs::write(dir.join(&config.trend_file), TREND).unwrap();
    fs::write(dir.join(&config.detail_file), DETAIL).unwrap();
    fs::write(dir.join(&config.assessment_file), ASSESSMENT).unwrap();
}

fn setup() -> (tempfile::TempDir, AppConfig, DataStore) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default().with_data_dir(Some(dir.path().to_path_buf()));
    write_all(dir.path(), &config);
    let store = DataStore::new(&config);
    (dir, config, store)
}

#[test]
fn general_rank_search_orders_by_distance() {
    let (_dir, config, store) = setup();
    let ds = store.trend.get().unwrap();
    assert_eq!(ds.years, vec![2024, 2023, 2022]);

    let query = RankQuery::new(&config);
    let view = rank_view(&ds, &query).unwrap();
    assert_eq!(view.year, 2024);
    let Rows::Found(matches) = view.rows else {
        panic!("expected matches around 5000");
    };
    let found: Vec<(&str, u64)> = matches
        .iter()
        .map(|m| (m.row.university.as_str(), m.distance))
        .collect();
    assert_eq!(found, vec![("上海大学", 200), ("同济大学", 300)]);
}

#[test]
fn assessment_rank_skips_rows_without_rank() {
    let (_dir, config, store) = setup();
    let ds = store.assessment.get().unwrap();
    let mut query = RankQuery::new(&config);
    query.target = 5000;
    query.tolerance = 100;
    let view = rank_view(&ds, &query).unwrap();
    assert_eq!(view.rows.len(), 1);
}

#[test]
fn assessment_detail_is_exact_and_sorted() {
    let (_dir, _config, store) = setup();
    let ds = store.assessment.get().unwrap();

    let Rows::Found(rows) = detail_view(&ds, "复旦大学", None) else {
        panic!("expected rows");
    };
    let majors: Vec<&str> = rows.iter().map(|r| r.major_name.as_str()).collect();
    assert_eq!(majors, vec!["临床医学", "数学"]);

    assert_eq!(detail_view(&ds, "复旦", None), Rows::NoMatch);
}

#[test]
fn trend_page_follows_link_then_keeps_user_input() {
    let (_dir, config, store) = setup();
    let ds = store.trend.get().unwrap();
    let mut state = AppState::new(&config);

    state.navigate(&link(Route::GeneralTrend, "复旦大学"));
    state.general_trend.sync(&ds.universities);
    assert_eq!(
        state.general_trend.selection(&ds.universities),
        Selection::Selected("复旦大学")
    );

    // A second sync in the same navigation must not reapply the link.
    state.general_trend.set_search_term("上海".into());
    state.general_trend.sync(&ds.universities);
    let sel = state.general_trend.selection(&ds.universities);
    assert_eq!(sel.candidates(), ["上海交通大学", "上海大学"]);
    assert_eq!(sel.university(), None);
}

#[test]
fn trend_view_and_group_details_for_one_university() {
    let (_dir, config, store) = setup();
    let trend = store.trend.get().unwrap();
    let view = trend_view(&trend, "上海大学");
    assert_eq!(view.summary.len(), 1);
    let points = &view.series["上海大学01组"];
    let years: Vec<u16> = points.iter().map(|p| p.year).collect();
    assert_eq!(years, vec![2022, 2023, 2024]);

    let detail = store.detail.get().unwrap();
    let groups = group_detail_view(&detail, "上海大学", &config.general_batch, None);
    assert_eq!(groups.groups, vec!["上海大学01组", "上海大学02组"]);
    let Rows::Found(rows) = groups.rows else {
        panic!("expected rows");
    };
    // Average rank first, lowest rank as the fallback.
    let majors: Vec<&str> = rows.iter().map(|r| r.major_name.as_str()).collect();
    assert_eq!(majors, vec!["计算机", "软件工程"]);
}

#[test]
fn missing_file_is_reported_and_memoized_until_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default().with_data_dir(Some(dir.path().to_path_buf()));
    let mut store = DataStore::new(&config);

    let err = store.trend.get().unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }));

    write_all(dir.path(), &config);
    assert!(store.trend.get().is_err());

    store.reload();
    assert_eq!(store.trend.get().unwrap().len(), 6);
}
