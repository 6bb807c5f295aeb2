//! Job taxonomy views over a catalog snapshot: family tree, filtered listing,
//! side-by-side comparison and the family × grade job map.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::models::{Catalog, ProfileRecord};
use crate::errors::AppError;

pub const JOB_FAMILY: &str = "Job Family";
pub const SUB_JOB_FAMILY: &str = "Sub Job Family";
pub const CAREER_PATH: &str = "Career Path";
pub const JOB_PROFILE: &str = "Job Profile";
pub const GLOBAL_GRADE: &str = "Global Grade";
pub const FULL_JOB_CODE: &str = "Full Job Code";

/// Up to three profiles are shown side by side.
pub const MAX_COMPARE: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Family tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubFamilyNode {
    pub sub_job_family: String,
    pub profile_count: usize,
    pub career_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyNode {
    pub job_family: String,
    pub profile_count: usize,
    pub sub_families: Vec<SubFamilyNode>,
}

/// Families sorted by name, each with its sorted sub-families.
/// Rows without a family are left out.
pub fn family_tree(catalog: &Catalog) -> Vec<FamilyNode> {
    #[derive(Default)]
    struct SubAcc {
        count: usize,
        paths: BTreeSet<String>,
    }
    #[derive(Default)]
    struct FamilyAcc {
        count: usize,
        subs: BTreeMap<String, SubAcc>,
    }

    let mut families: BTreeMap<String, FamilyAcc> = BTreeMap::new();
    for record in catalog.records() {
        let Some(family) = record.text(JOB_FAMILY) else {
            continue;
        };
        let acc = families.entry(family).or_default();
        acc.count += 1;

        if let Some(sub) = record.text(SUB_JOB_FAMILY) {
            let sub_acc = acc.subs.entry(sub).or_default();
            sub_acc.count += 1;
            if let Some(path) = record.text(CAREER_PATH) {
                sub_acc.paths.insert(path);
            }
        }
    }

    families
        .into_iter()
        .map(|(job_family, acc)| FamilyNode {
            job_family,
            profile_count: acc.count,
            sub_families: acc
                .subs
                .into_iter()
                .map(|(sub_job_family, sub)| SubFamilyNode {
                    sub_job_family,
                    profile_count: sub.count,
                    career_paths: sub.paths.into_iter().collect(),
                })
                .collect(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Filtering and comparison
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFilter {
    pub job_family: Option<String>,
    pub sub_job_family: Option<String>,
    pub career_path: Option<String>,
}

impl ProfileFilter {
    fn accepts(&self, record: &ProfileRecord) -> bool {
        let criteria = [
            (JOB_FAMILY, &self.job_family),
            (SUB_JOB_FAMILY, &self.sub_job_family),
            (CAREER_PATH, &self.career_path),
        ];
        criteria.iter().all(|(field, wanted)| {
            match wanted.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
                Some(wanted) => record.text(field).as_deref() == Some(wanted),
                None => true,
            }
        })
    }
}

/// Rows matching every provided criterion, in catalog order.
pub fn filter_profiles<'a>(catalog: &'a Catalog, filter: &ProfileFilter) -> Vec<&'a ProfileRecord> {
    catalog
        .records()
        .iter()
        .filter(|record| filter.accepts(record))
        .collect()
}

/// Looks up 1–3 profiles by full job code, in the requested order.
pub fn compare_profiles<'a>(
    catalog: &'a Catalog,
    codes: &[String],
) -> Result<Vec<&'a ProfileRecord>, AppError> {
    let codes: Vec<&str> = codes
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();

    if codes.is_empty() {
        return Err(AppError::Validation(
            "At least one job code is required".to_string(),
        ));
    }
    if codes.len() > MAX_COMPARE {
        return Err(AppError::Validation(format!(
            "At most {MAX_COMPARE} profiles can be compared, got {}",
            codes.len()
        )));
    }

    codes
        .into_iter()
        .map(|code| {
            catalog
                .records()
                .iter()
                .find(|record| record.text(FULL_JOB_CODE).as_deref() == Some(code))
                .ok_or_else(|| AppError::NotFound(format!("Job profile {code} not found")))
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Job map
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMapRow {
    pub grade: String,
    /// One cell per entry of `JobMap::families`; profile names in catalog order.
    pub cells: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMap {
    pub families: Vec<String>,
    pub rows: Vec<JobMapRow>,
}

/// Grade × family matrix. Grades run highest first when every grade is an
/// integer, otherwise in lexical order. Rows lacking a family, grade or name
/// are left out.
pub fn job_map(catalog: &Catalog) -> JobMap {
    let entries: Vec<(String, String, String)> = catalog
        .records()
        .iter()
        .filter_map(|record| {
            let family = record.text(JOB_FAMILY)?;
            let grade = record.text(GLOBAL_GRADE)?;
            let name = record
                .text(JOB_PROFILE)
                .or_else(|| record.text(FULL_JOB_CODE))?;
            Some((family, grade, name))
        })
        .collect();

    let families: Vec<String> = entries
        .iter()
        .map(|(family, _, _)| family.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut grades: Vec<String> = entries
        .iter()
        .map(|(_, grade, _)| grade.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    sort_grades(&mut grades);

    let rows = grades
        .into_iter()
        .map(|grade| {
            let cells = families
                .iter()
                .map(|family| {
                    entries
                        .iter()
                        .filter(|(f, g, _)| f == family && *g == grade)
                        .map(|(_, _, name)| name.clone())
                        .collect()
                })
                .collect();
            JobMapRow { grade, cells }
        })
        .collect();

    JobMap { families, rows }
}

fn sort_grades(grades: &mut [String]) {
    if grades.iter().all(|g| g.parse::<i64>().is_ok()) {
        grades.sort_by(|a, b| match (a.parse::<i64>(), b.parse::<i64>()) {
            (Ok(a), Ok(b)) => b.cmp(&a),
            _ => Ordering::Equal,
        });
    } else {
        grades.sort();
    }
}
