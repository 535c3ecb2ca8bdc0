//! Writes a small, deterministic set of the three data files so the GUI
//! and CLI can be tried without the published tables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use gaokao_lens::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "generate_sample", about = "Write sample admission CSV files")]
struct Args {
    /// Output directory (created if missing).
    #[arg(long, default_value = "sample_data")]
    out: PathBuf,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `[lo, hi]`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        let span = (hi - lo + 1) as u64;
        lo + (self.next_u64() % span) as i64
    }
}

/// (university, base rank of its strongest group)
const UNIVERSITIES: &[(&str, i64)] = &[
    ("复旦大学", 800),
    ("上海交通大学", 700),
    ("同济大学", 2500),
    ("华东师范大学", 3500),
    ("上海财经大学", 3000),
    ("华东理工大学", 9000),
    ("上海大学", 11000),
    ("东华大学", 14000),
    ("上海理工大学", 18000),
    ("上海师范大学", 22000),
];

const MAJORS: &[&str] = &[
    "计算机科学与技术",
    "软件工程",
    "数学与应用数学",
    "物理学",
    "经济学",
    "金融学",
    "法学",
    "汉语言文学",
    "临床医学",
    "机械工程",
];

/// Rough score for a rank in a cohort of ~50k.
fn score_for(rank: i64) -> i64 {
    (620 - rank / 120).max(400)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let cfg = AppConfig::default();
    let mut rng = SimpleRng::new(42);

    write_trend(&args.out.join(&cfg.trend_file), &mut rng)?;
    write_detail(&args.out.join(&cfg.detail_file), &cfg.general_batch, &mut rng)?;
    write_assessment(&args.out.join(&cfg.assessment_file), &mut rng)?;

    println!("Wrote sample data to {}", args.out.display());
    Ok(())
}

fn majors_of(group: usize) -> Vec<&'static str> {
    MAJORS.iter().copied().skip(group * 3).take(4).collect()
}

fn write_trend(path: &Path, rng: &mut SimpleRng) -> Result<()> {
    let mut w = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    w.write_record([
        "year", "university_name", "group_code", "group_name", "major_list", "admission_score",
        "admission_rank",
    ])?;

    for year in 2022..=2024 {
        for &(uni, base) in UNIVERSITIES {
            for group in 0..3usize {
                let drift = rng.range(-base / 10, base / 10);
                let rank = (base * (group as i64 + 1) + drift).max(1);
                let code = format!("{:02}", group + 1);
                w.write_record([
                    year.to_string(),
                    uni.to_string(),
                    code.clone(),
                    format!("{uni}{code}组"),
                    majors_of(group).join("，"),
                    score_for(rank).to_string(),
                    rank.to_string(),
                ])?;
            }
        }
    }
    w.flush()?;
    Ok(())
}

fn write_detail(path: &Path, batch: &str, rng: &mut SimpleRng) -> Result<()> {
    let mut w = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    w.write_record([
        "university_name", "batch", "major_group_name", "major_name", "enrollment_count",
        "highest_score", "lowest_score", "average_score", "lowest_rank", "average_rank",
    ])?;

    for &(uni, base) in UNIVERSITIES {
        for group in 0..3usize {
            let code = format!("{:02}", group + 1);
            for major in majors_of(group) {
                let lowest_rank = base * (group as i64 + 1) + rng.range(0, base / 5);
                let average_rank = (lowest_rank - rng.range(0, base / 4)).max(1);
                let best_rank = (average_rank - rng.range(0, base / 4)).max(1);
                w.write_record([
                    uni.to_string(),
                    batch.to_string(),
                    format!("{uni}{code}组"),
                    major.to_string(),
                    rng.range(5, 60).to_string(),
                    score_for(best_rank).to_string(),
                    score_for(lowest_rank).to_string(),
                    score_for(average_rank).to_string(),
                    lowest_rank.to_string(),
                    average_rank.to_string(),
                ])?;
            }
        }
    }
    w.flush()?;
    Ok(())
}

fn write_assessment(path: &Path, rng: &mut SimpleRng) -> Result<()> {
    let mut w = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    w.write_record([
        "year", "university_name", "group_code", "group_name", "major_name", "enrollment_count",
        "highest_score", "lowest_score", "lowest_rank", "average_score", "average_rank",
    ])?;

    for &(uni, base) in UNIVERSITIES.iter().take(6) {
        for (i, major) in MAJORS.iter().enumerate().take(5) {
            let lowest_rank = base + rng.range(0, base) + (i as i64) * 200;
            let average_rank = (lowest_rank - rng.range(0, base / 3)).max(1);
            w.write_record([
                "2024".to_string(),
                uni.to_string(),
                "90".to_string(),
                format!("{uni}综评组"),
                major.to_string(),
                rng.range(3, 30).to_string(),
                score_for((average_rank - 200).max(1)).to_string(),
                score_for(lowest_rank).to_string(),
                lowest_rank.to_string(),
                score_for(average_rank).to_string(),
                average_rank.to_string(),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}
