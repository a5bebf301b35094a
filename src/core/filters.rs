use crate::models::{MatchFilters, Profile};

/// Check a candidate against swipe filters.
///
/// Candidates with no recorded date of birth pass the age bounds unfiltered.
/// The location query is a case-insensitive substring match on the present
/// address or native place; `location_radius_km` is not consulted.
#[inline]
pub fn passes_filters(viewer: &Profile, candidate: &Profile, filters: &MatchFilters) -> bool {
    if candidate.id == viewer.id {
        return false;
    }

    if let Some(age) = candidate.age() {
        if let Some(min) = filters.age_min {
            if age < min {
                return false;
            }
        }
        if let Some(max) = filters.age_max {
            if age > max {
                return false;
            }
        }
    }

    if !filters.gender.accepts(candidate.gender) {
        return false;
    }

    if let Some(query) = &filters.location_query {
        let query = query.trim().to_lowercase();
        if !query.is_empty() {
            let present = candidate.present_address.to_lowercase();
            let native = candidate.native_place.to_lowercase();
            if !present.contains(&query) && !native.contains(&query) {
                return false;
            }
        }
    }

    true
}

/// Build the ordered swipe queue for a viewer: approved candidates that pass
/// the filters, in their input order.
pub fn build_queue(viewer: &Profile, candidates: &[Profile], filters: &MatchFilters) -> Vec<Profile> {
    candidates
        .iter()
        .filter(|candidate| candidate.approved())
        .filter(|candidate| passes_filters(viewer, candidate, filters))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        FamilyInfo, Gender, GenderFilter, ModerationStatus, PartnerPreferences, Profile,
    };
    use chrono::{Datelike, NaiveDate, Utc};

    fn dob_for_age(age: u8) -> NaiveDate {
        let today = Utc::now().date_naive();
        NaiveDate::from_ymd_opt(today.year() - age as i32, 1, 1).unwrap()
    }

    fn profile(id: &str, gender: Gender, age: Option<u8>, present: &str, native: &str) -> Profile {
        Profile {
            id: id.to_string(),
            user_id: format!("user_{}", id),
            name: format!("Person {}", id),
            date_of_birth: age.map(dob_for_age),
            gender,
            height_cm: None,
            city: String::new(),
            present_address: present.to_string(),
            native_place: native.to_string(),
            education: String::new(),
            occupation: String::new(),
            email: String::new(),
            phone: String::new(),
            family: FamilyInfo::default(),
            preferences: PartnerPreferences::default(),
            photo_ids: vec![],
            status: ModerationStatus::Approved,
            admin_notes: None,
            created_at: Utc::now(),
        }
    }

    fn filters() -> MatchFilters {
        MatchFilters {
            age_min: Some(25),
            age_max: Some(35),
            location_query: None,
            location_radius_km: None,
            gender: GenderFilter::All,
        }
    }

    #[test]
    fn test_age_bounds() {
        let viewer = profile("viewer", Gender::Male, Some(30), "", "");
        let young = profile("young", Gender::Female, Some(22), "", "");
        let within = profile("within", Gender::Female, Some(28), "", "");
        let old = profile("old", Gender::Female, Some(40), "", "");

        let f = filters();
        assert!(!passes_filters(&viewer, &young, &f));
        assert!(passes_filters(&viewer, &within, &f));
        assert!(!passes_filters(&viewer, &old, &f));
    }

    #[test]
    fn test_unknown_age_passes() {
        let viewer = profile("viewer", Gender::Male, Some(30), "", "");
        let unknown = profile("unknown", Gender::Female, None, "", "");

        assert!(passes_filters(&viewer, &unknown, &filters()));
    }

    #[test]
    fn test_gender_filter() {
        let viewer = profile("viewer", Gender::Male, Some(30), "", "");
        let male = profile("m", Gender::Male, Some(28), "", "");
        let female = profile("f", Gender::Female, Some(28), "", "");

        let mut f = filters();
        f.gender = GenderFilter::Female;
        assert!(!passes_filters(&viewer, &male, &f));
        assert!(passes_filters(&viewer, &female, &f));
    }

    #[test]
    fn test_location_query_matches_either_address() {
        let viewer = profile("viewer", Gender::Male, Some(30), "", "");
        let by_present = profile("p", Gender::Female, Some(28), "MG Road, Pune", "Satara");
        let by_native = profile("n", Gender::Female, Some(28), "Andheri, Mumbai", "Pune");
        let neither = profile("x", Gender::Female, Some(28), "Nagpur", "Nagpur");

        let mut f = filters();
        f.location_query = Some("pune".to_string());
        assert!(passes_filters(&viewer, &by_present, &f));
        assert!(passes_filters(&viewer, &by_native, &f));
        assert!(!passes_filters(&viewer, &neither, &f));
    }

    #[test]
    fn test_queue_excludes_self_and_unapproved() {
        let viewer = profile("viewer", Gender::Male, Some(30), "", "");
        let mut pending = profile("pending", Gender::Female, Some(28), "", "");
        pending.status = ModerationStatus::Pending;
        let ok = profile("ok", Gender::Female, Some(28), "", "");

        let queue = build_queue(&viewer, &[viewer.clone(), pending, ok], &filters());

        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, "ok");
    }

    #[test]
    fn test_radius_is_informational_only() {
        let viewer = profile("viewer", Gender::Male, Some(30), "", "");
        let far = profile("far", Gender::Female, Some(28), "Delhi", "Delhi");

        let mut f = filters();
        f.location_radius_km = Some(5);
        assert!(passes_filters(&viewer, &far, &f));
    }
}
