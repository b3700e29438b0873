//! Record Factory — builds one synthetic resume from the content pools.
//!
//! All randomness comes from the generator handle passed in, so a fixed seed
//! reproduces the same records in the same order.

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Captures, Regex};

use crate::generation::pools::{
    ProjectTemplate, CV_SKILLS, DEGREES, EMAIL_DOMAINS, EXPERIENCE_BULLETS, EXPERIENCE_METRICS,
    HOBBIES, INSTITUTIONS, JOB_TITLES, ML_DL_SKILLS, NAMES, PROGRAMMING_SKILLS, PROJECTS,
    PROJECT_METRICS, SUMMARIES, TOOLS,
};
use crate::models::resume::{Education, PersonalInfo, Project, Record, Skills};

static RE_METRIC_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("valid metric marker regex"));

/// Probability that a generated candidate has work experience.
const EXPERIENCE_PROBABILITY: f64 = 0.7;

pub fn generate_record<R: Rng + ?Sized>(rng: &mut R) -> Record {
    let name = pick(rng, NAMES);
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or(name).to_lowercase();
    let last = parts.next().unwrap_or_default().to_lowercase();

    let personal_info = PersonalInfo {
        name: name.to_string(),
        job_title: pick(rng, JOB_TITLES).to_string(),
        email: format!("{first}.{last}@{}", pick(rng, EMAIL_DOMAINS)),
        phone: format!("+91-{}", rng.gen_range(7_000_000_000u64..=9_999_999_999)),
        linkedin: format!("linkedin.com/in/{first}-{last}"),
        github: format!("github.com/{first}{last}"),
    };

    let summary = pick(rng, SUMMARIES).to_string();

    let (degree, field) = DEGREES[rng.gen_range(0..DEGREES.len())];
    let education = vec![Education {
        degree: degree.to_string(),
        field: field.to_string(),
        institution: pick(rng, INSTITUTIONS).to_string(),
        start_year: "2021".to_string(),
        end_year: "2025".to_string(),
    }];

    let skills = Skills {
        programming: sample(rng, PROGRAMMING_SKILLS, 3, 4),
        ml_dl: sample(rng, ML_DL_SKILLS, 4, 6),
        cv: sample(rng, CV_SKILLS, 3, 4),
        tools: sample(rng, TOOLS, 4, 6),
    };

    let hobbies = sample(rng, HOBBIES, 2, 3);

    let project_count = rng.gen_range(2..=3);
    let projects = PROJECTS
        .choose_multiple(rng, project_count)
        .collect::<Vec<&ProjectTemplate>>()
        .into_iter()
        .map(|template| Project {
            title: template.title.to_string(),
            bullets: template
                .bullets
                .iter()
                .map(|bullet| fill_metrics(bullet, PROJECT_METRICS, rng))
                .collect(),
        })
        .collect();

    let experience = if rng.gen_bool(EXPERIENCE_PROBABILITY) {
        let count = rng.gen_range(3..=4);
        EXPERIENCE_BULLETS
            .choose_multiple(rng, count)
            .copied()
            .collect::<Vec<&str>>()
            .into_iter()
            .map(|bullet| fill_metrics(bullet, EXPERIENCE_METRICS, rng))
            .collect()
    } else {
        Vec::new()
    };

    Record {
        personal_info,
        summary,
        education,
        skills,
        projects,
        experience,
        hobbies,
    }
}

/// Replaces each `{marker}` that has a range in `ranges` with a freshly drawn integer.
///
/// Markers without a range are left as-is. Draws happen in marker order.
pub fn fill_metrics<R: Rng + ?Sized>(
    text: &str,
    ranges: &[(&str, u32, u32)],
    rng: &mut R,
) -> String {
    RE_METRIC_MARKER
        .replace_all(text, |caps: &Captures<'_>| {
            match ranges.iter().find(|(name, _, _)| *name == &caps[1]) {
                Some(&(_, lo, hi)) => rng.gen_range(lo..=hi).to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// File name for a persisted record. Drawn from `rng` so reruns reproduce it.
pub fn record_file_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let uuid = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
    format!("{uuid}.json")
}

fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &'static [&'static str]) -> &'static str {
    pool[rng.gen_range(0..pool.len())]
}

fn sample<R: Rng + ?Sized>(rng: &mut R, pool: &[&str], min: usize, max: usize) -> Vec<String> {
    let count = rng.gen_range(min..=max).min(pool.len());
    pool.choose_multiple(rng, count).map(|s| s.to_string()).collect()
}
