use crate::models::Profile;

/// Calculate a compatibility score (0-100) between two profiles.
///
/// Points accumulate direction by direction: each side's stated preferences
/// are checked against the other side's attributes, then exact-match bonuses
/// and the gender term are added, and the sum is clamped to 0-100. The
/// computation is deliberately not symmetric in how it walks the criteria,
/// though it inspects both directions:
///
/// - +20 if b's age falls in a's preferred range (skipped when a states none)
/// - +20 the mirror of the above
/// - +15 if a's preferred education list contains b's education
/// - +15 the mirror
/// - +15 if a's preferred locations contain b's city
/// - +15 the mirror
/// - +10 if both live in the same city
/// - +10 if both hold the same education
/// - +10 if genders differ, -50 if they are the same
///
/// City and education are optional fields; two profiles that both leave one
/// blank do not collect that exact-match bonus. Only stated values match.
///
/// Same-gender pairs are pushed toward zero here but not excluded; exclusion
/// is the matcher's job.
pub fn compatibility_score(a: &Profile, b: &Profile) -> (u8, Vec<String>) {
    let mut score: i32 = 0;
    let mut reasons: Vec<String> = Vec::new();

    if age_within_preferences(a, b) {
        score += 20;
        reasons.push("candidate age within your preferred range".to_string());
    }
    if age_within_preferences(b, a) {
        score += 20;
        reasons.push("your age within candidate's preferred range".to_string());
    }

    if !b.education.is_empty() && a.preferences.education.contains(&b.education) {
        score += 15;
        reasons.push("candidate education matches your preference".to_string());
    }
    if !a.education.is_empty() && b.preferences.education.contains(&a.education) {
        score += 15;
        reasons.push("your education matches candidate's preference".to_string());
    }

    if !b.city.is_empty() && a.preferences.locations.contains(&b.city) {
        score += 15;
        reasons.push("candidate city in your preferred locations".to_string());
    }
    if !a.city.is_empty() && b.preferences.locations.contains(&a.city) {
        score += 15;
        reasons.push("your city in candidate's preferred locations".to_string());
    }

    if !a.city.is_empty() && a.city == b.city {
        score += 10;
        reasons.push("same city".to_string());
    }
    if !a.education.is_empty() && a.education == b.education {
        score += 10;
        reasons.push("same education".to_string());
    }

    if a.gender != b.gender {
        score += 10;
        reasons.push("opposite gender".to_string());
    } else {
        score -= 50;
    }

    (score.clamp(0, 100) as u8, reasons)
}

/// Whether `of`'s age falls in `prefs_of`'s stated range. A profile with no
/// stated range (either bound missing) or no known age contributes nothing.
#[inline]
fn age_within_preferences(prefs_of: &Profile, of: &Profile) -> bool {
    match (prefs_of.preferences.age_range(), of.age()) {
        (Some((min, max)), Some(age)) => (min..=max).contains(&age),
        _ => false,
    }
}

/// Whether two profiles can be paired at all: the matcher hard-excludes
/// same-gender pairs regardless of score.
#[inline]
pub fn genders_compatible(a: &Profile, b: &Profile) -> bool {
    a.gender != b.gender
}
