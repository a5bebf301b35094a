// Integration tests for Milan Algo

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate, Utc};

use milan_algo::core::{Matcher, ModerationWorkflow, ReportingSubsystem, SwipeSession};
use milan_algo::models::{
    FamilyInfo, Gender, GenderFilter, MatchFilters, MatchRecord, MatchStatus, ModeratedKind,
    ModerationDecision, ModerationStatus, PartnerPreferences, Profile, ReportTarget, ReportType,
    UserAccount,
};
use milan_algo::services::{
    DocumentStore, MemoryStore, PhotoVerificationGateway, RetryPolicy, VerificationFailure,
};

fn dob_for_age(age: u8) -> NaiveDate {
    let today = Utc::now().date_naive();
    NaiveDate::from_ymd_opt(today.year() - age as i32, 1, 1).unwrap()
}

fn create_test_profile(id: &str, gender: Gender, age: u8, status: ModerationStatus) -> Profile {
    Profile {
        id: id.to_string(),
        user_id: format!("user_{}", id),
        name: format!("Person {}", id),
        date_of_birth: Some(dob_for_age(age)),
        gender,
        height_cm: Some(168),
        city: "Pune".to_string(),
        present_address: "Kothrud, Pune".to_string(),
        native_place: "Satara".to_string(),
        education: "BE".to_string(),
        occupation: "Engineer".to_string(),
        email: format!("{}@example.com", id),
        phone: String::new(),
        family: FamilyInfo::default(),
        preferences: PartnerPreferences {
            min_age: Some(25),
            max_age: Some(35),
            ..PartnerPreferences::default()
        },
        photo_ids: vec!["photo_1".to_string()],
        status,
        admin_notes: None,
        created_at: Utc::now(),
    }
}

fn test_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        retry_delay: Duration::from_millis(200),
        initial_timeout: Duration::from_secs(5),
        retry_timeout: Duration::from_secs(5),
    }
}

// --- Photo verification gateway against a mock inference endpoint ---

#[tokio::test]
async fn test_verification_accepts_single_confident_face() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/model")
        .match_header("authorization", "Bearer test_token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"xmin": 10, "ymin": 10, "xmax": 90, "ymax": 90, "score": 0.7, "label": "face"}]"#)
        .expect(1)
        .create_async()
        .await;

    let gateway = PhotoVerificationGateway::new(
        format!("{}/model", server.url()),
        Some("test_token".to_string()),
        test_policy(),
    )
    .unwrap();

    let verdict = gateway.verify(b"fake image bytes").await;

    assert!(verdict.accepted());
    assert!(verdict.has_face);
    assert!(verdict.is_frontal);
    assert_eq!(verdict.face_count, 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_verification_rejects_multiple_faces_with_count() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/model")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"predictions": [
                {"box": {"xmin": 1, "ymin": 1, "xmax": 40, "ymax": 40}, "score": 0.9},
                {"box": {"xmin": 50, "ymin": 1, "xmax": 90, "ymax": 40}, "score": 0.85}
            ]}"#,
        )
        .create_async()
        .await;

    let gateway = PhotoVerificationGateway::new(
        format!("{}/model", server.url()),
        Some("test_token".to_string()),
        test_policy(),
    )
    .unwrap();

    let verdict = gateway.verify(b"fake image bytes").await;

    assert!(verdict.has_face);
    assert!(!verdict.is_visible);
    assert_eq!(verdict.face_count, 2);
    assert_eq!(verdict.error, Some(VerificationFailure::MultipleFaces));
}

#[tokio::test]
async fn test_invalid_credential_fails_fast_without_retry() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/model")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let gateway = PhotoVerificationGateway::new(
        format!("{}/model", server.url()),
        Some("bad_token".to_string()),
        test_policy(),
    )
    .unwrap();

    let verdict = gateway.verify(b"fake image bytes").await;

    assert_eq!(verdict.error, Some(VerificationFailure::InvalidCredential));
    assert!(!verdict.error.unwrap().is_transient());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cold_start_retried_exactly_once_after_delay() {
    let mut server = mockito::Server::new_async().await;
    // Always 503: the gateway must make the initial attempt plus exactly one
    // retry, then surface a transient failure. expect(2) fails the test on a
    // third attempt as much as on a missing retry.
    let mock = server
        .mock("POST", "/model")
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let gateway = PhotoVerificationGateway::new(
        format!("{}/model", server.url()),
        Some("test_token".to_string()),
        test_policy(),
    )
    .unwrap();

    let started = Instant::now();
    let verdict = gateway.verify(b"fake image bytes").await;
    let elapsed = started.elapsed();

    assert_eq!(verdict.error, Some(VerificationFailure::ServiceUnavailable));
    assert!(verdict.error.unwrap().is_transient());
    assert!(
        elapsed >= Duration::from_millis(200),
        "retry happened without waiting for the policy delay ({:?})",
        elapsed
    );
    mock.assert_async().await;
}

// --- Moderation gating the matching surface ---

#[tokio::test]
async fn test_approval_makes_profile_matchable() {
    let store = Arc::new(MemoryStore::new());
    let seeker = create_test_profile("seeker", Gender::Male, 30, ModerationStatus::Approved);
    let candidate = create_test_profile("candidate", Gender::Female, 28, ModerationStatus::Pending);
    store.seed_profile(seeker.clone());
    store.seed_profile(candidate);

    let matcher = Matcher::with_default_threshold();
    let workflow = ModerationWorkflow::new(store.clone());

    let before = store.list_approved_profiles().await.unwrap();
    let outcome = matcher.find_matches(&seeker, &before);
    assert!(outcome.matches.is_empty());

    workflow
        .moderate(
            ModeratedKind::Profile,
            "candidate",
            ModerationDecision::Approved,
            None,
        )
        .await
        .unwrap();

    let after = store.list_approved_profiles().await.unwrap();
    let outcome = matcher.find_matches(&seeker, &after);
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].profile_id, "candidate");
}

#[tokio::test]
async fn test_moderating_terminal_entity_fails() {
    let store = Arc::new(MemoryStore::new());
    store.seed_profile(create_test_profile(
        "done",
        Gender::Female,
        27,
        ModerationStatus::Rejected,
    ));
    let workflow = ModerationWorkflow::new(store);

    let result = workflow
        .moderate(
            ModeratedKind::Profile,
            "done",
            ModerationDecision::Rejected,
            None,
        )
        .await;

    assert!(result.is_err());
}

// --- Reporting and suspension ---

#[tokio::test]
async fn test_suspension_flips_exactly_at_threshold() {
    let store = Arc::new(MemoryStore::new());
    store.seed_user(UserAccount {
        id: "target".to_string(),
        suspended: false,
    });
    let reporting = ReportingSubsystem::with_default_threshold(store.clone());

    for i in 0..5 {
        reporting
            .file_report(
                &format!("reporter_{}", i),
                ReportTarget::User("target".to_string()),
                ReportType::Fake,
                None,
            )
            .await
            .unwrap();

        let user = store.get_user("target").await.unwrap().unwrap();
        if i < 4 {
            assert!(!user.suspended, "suspended after only {} reports", i + 1);
        } else {
            assert!(user.suspended, "not suspended after the 5th report");
        }
    }

    assert_eq!(reporting.report_count_for_user("target").await.unwrap(), 5);
}

// --- End-to-end scoring scenario ---

#[test]
fn test_end_to_end_scoring_scenario() {
    let mut a = create_test_profile("a", Gender::Male, 30, ModerationStatus::Approved);
    let mut b = create_test_profile("b", Gender::Female, 28, ModerationStatus::Approved);

    // Profile A: male, 30, prefers 25-35 and an MBA.
    a.city = "Mumbai".to_string();
    a.education = "BTech".to_string();
    a.preferences = PartnerPreferences {
        min_age: Some(25),
        max_age: Some(35),
        education: vec!["MBA".to_string()],
        ..PartnerPreferences::default()
    };

    // Profile B: female, 28, MBA, prefers 28-40.
    b.city = "Nagpur".to_string();
    b.education = "MBA".to_string();
    b.preferences = PartnerPreferences {
        min_age: Some(28),
        max_age: Some(40),
        ..PartnerPreferences::default()
    };

    // 20 (A's range covers B's 28) + 20 (B's range covers A's 30)
    // + 15 (A's education preference matches B) + 10 (genders differ) = 65
    let (score, reasons) = milan_algo::compatibility_score(&a, &b);
    assert_eq!(score, 65);
    assert_eq!(reasons.len(), 4);

    let matcher = Matcher::with_default_threshold();
    let outcome = matcher.find_matches(&a, std::slice::from_ref(&b));
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].score, 65);
}

#[test]
fn test_score_always_in_range() {
    let genders = [Gender::Male, Gender::Female];
    let ages = [19u8, 25, 30, 45, 70];

    for (i, &ga) in genders.iter().enumerate() {
        for (j, &gb) in genders.iter().enumerate() {
            for &age_a in &ages {
                for &age_b in &ages {
                    let mut a = create_test_profile(
                        &format!("a{}{}", i, age_a),
                        ga,
                        age_a,
                        ModerationStatus::Approved,
                    );
                    let mut b = create_test_profile(
                        &format!("b{}{}", j, age_b),
                        gb,
                        age_b,
                        ModerationStatus::Approved,
                    );
                    a.preferences.education = vec!["BE".to_string()];
                    b.preferences.locations = vec!["Pune".to_string()];

                    let (score, _) = milan_algo::compatibility_score(&a, &b);
                    assert!(score <= 100);
                }
            }
        }
    }
}

// --- Swipe session over the store ---

#[tokio::test]
async fn test_swipe_flow_with_like_persistence() {
    let store = Arc::new(MemoryStore::new());
    let viewer = create_test_profile("viewer", Gender::Male, 30, ModerationStatus::Approved);
    store.seed_profile(viewer.clone());
    store.seed_profile(create_test_profile(
        "c1",
        Gender::Female,
        27,
        ModerationStatus::Approved,
    ));
    store.seed_profile(create_test_profile(
        "c2",
        Gender::Female,
        31,
        ModerationStatus::Approved,
    ));
    store.seed_profile(create_test_profile(
        "c3",
        Gender::Male,
        29,
        ModerationStatus::Approved,
    ));

    let candidates = store.list_approved_profiles().await.unwrap();
    let filters = MatchFilters {
        gender: GenderFilter::Female,
        ..MatchFilters::default()
    };
    let mut session = SwipeSession::new(&viewer, &candidates, filters);

    assert_eq!(session.remaining(), 2);

    // A like recomputes the whole match set and persists every pairing.
    let matcher = Matcher::with_default_threshold();
    let outcome = matcher.find_matches(&viewer, &candidates);
    for candidate in &outcome.matches {
        let record = MatchRecord {
            id: uuid::Uuid::new_v4().to_string(),
            profile_id_1: viewer.id.clone(),
            profile_id_2: candidate.profile_id.clone(),
            score: candidate.score,
            status: MatchStatus::Pending,
            created_at: Utc::now(),
        };
        assert!(store.upsert_match(&record).await.unwrap());
    }
    session.advance();

    assert_eq!(store.match_count(), outcome.matches.len());
    assert!(store.match_count() >= 1);

    // Liking again recomputes the same set; persistence is pair-idempotent.
    let outcome_again = matcher.find_matches(&viewer, &candidates);
    for candidate in &outcome_again.matches {
        let record = MatchRecord {
            id: uuid::Uuid::new_v4().to_string(),
            profile_id_1: viewer.id.clone(),
            profile_id_2: candidate.profile_id.clone(),
            score: candidate.score,
            status: MatchStatus::Pending,
            created_at: Utc::now(),
        };
        assert!(!store.upsert_match(&record).await.unwrap());
    }
    assert_eq!(store.match_count(), outcome.matches.len());

    // Changing filters resets the cursor.
    session.pass();
    assert_eq!(session.position(), 2);
    session.set_filters(&viewer, &candidates, MatchFilters::default());
    assert_eq!(session.position(), 0);
}
