//! Profile building, profile selection and similarity scoring


use pitch_kinematics::{
    kinematics::{FeatureName, KinematicFeatures},
    profile::{build_cohort_profile, build_profile, Cohort, PitchRecord},
    scoring::{feature_scores, score_against_profile, select_profile, InMemoryProfileRepository, ProfileRepository},
};
use test_helpers::temp_path;

fn with_rotation(value: f64) -> KinematicFeatures {
    KinematicFeatures {
        trunk_rotation_at_br: Some(value),
        ..KinematicFeatures::default()
    }
}

fn record(player: &str, pitch_type: &str, description: &str, rotation: f64) -> PitchRecord {
    PitchRecord {
        player_name: player.to_string(),
        pitch_type: Some(pitch_type.to_string()),
        description: Some(description.to_string()),
        features: with_rotation(rotation),
    }
}

#[test]
fn test_reference_series_profile_and_exact_score() {
    let history: Vec<KinematicFeatures> = (0..10).map(|i| with_rotation(10.0 + 2.0 * f64::from(i))).collect();
    let profile = build_profile(&history);

    assert_eq!(profile.len(), 1);
    let stats = profile.get(FeatureName::TrunkRotationAtBr).unwrap();
    assert_eq!(stats.p50_median, 19.0);
    assert_eq!(stats.mean, Some(19.0));
    assert_eq!(stats.std, Some(6.0553));
    assert_eq!(stats.min, stats.p10);
    assert_eq!(stats.max, stats.p90);
    assert!(stats.p10 < stats.p50_median && stats.p50_median < stats.p90);

    assert_eq!(score_against_profile(&with_rotation(19.0), &profile, 25.0), 100);
}

#[test]
fn test_four_std_scores_zero() {
    let history = [with_rotation(8.0), with_rotation(12.0)];
    let profile = build_profile(&history);
    let stats = profile.get(FeatureName::TrunkRotationAtBr).unwrap();
    let std = stats.std.unwrap();
    let mean = stats.mean.unwrap();

    let far = with_rotation(mean + 4.0 * std);
    let scores = feature_scores(&far, &profile, 25.0);
    assert_eq!(scores.len(), 1);
    assert!((scores[0].z_score - 4.0).abs() < 1e-9);
    assert!(scores[0].score.abs() < 1e-6);
    assert_eq!(score_against_profile(&with_rotation(mean + 10.0 * std), &profile, 25.0), 0);
}

#[test]
fn test_sparse_features_are_dropped_not_fatal() {
    let history = [
        KinematicFeatures {
            trunk_rotation_at_br: Some(10.0),
            pelvis_obliquity_at_fc: Some(4.0),
            total_frames: Some(40),
            ..KinematicFeatures::default()
        },
        KinematicFeatures {
            trunk_rotation_at_br: Some(14.0),
            total_frames: Some(44),
            ..KinematicFeatures::default()
        },
    ];
    let profile = build_profile(&history);

    assert!(profile.get(FeatureName::TrunkRotationAtBr).is_some());
    assert!(profile.get(FeatureName::TotalFrames).is_some());
    assert!(profile.get(FeatureName::PelvisObliquityAtFc).is_none());
    assert!(build_profile(&[]).is_empty());
}

#[test]
fn test_partial_subject_scores_overlap_only() {
    let history = [
        KinematicFeatures {
            trunk_rotation_at_br: Some(10.0),
            trunk_flexion_at_br: Some(-200.0),
            ..KinematicFeatures::default()
        },
        KinematicFeatures {
            trunk_rotation_at_br: Some(20.0),
            trunk_flexion_at_br: Some(-200.0),
            ..KinematicFeatures::default()
        },
    ];
    let profile = build_profile(&history);

    // trunk flexion has zero spread and is skipped; rotation sits on the mean
    let subject = KinematicFeatures {
        trunk_rotation_at_br: Some(15.0),
        trunk_flexion_at_br: Some(-150.0),
        shoulder_abduction_at_br: Some(170.0),
        ..KinematicFeatures::default()
    };
    assert_eq!(feature_scores(&subject, &profile, 25.0).len(), 1);
    assert_eq!(score_against_profile(&subject, &profile, 25.0), 100);
}

#[test]
fn test_cohort_selects_good_pitches_of_type() {
    let records = vec![
        record("Ace", "FF", "called_strike", 10.0),
        record("Ace", "FF", "Foul", 12.0),
        record("Ace", "FF", "ball", 90.0),
        record("Ace", "SL", "swinging_strike", 50.0),
        record("Deuce", "FF", "called_strike", 70.0),
    ];

    let fastballs = build_cohort_profile(&Cohort::new("Ace", Some("FF".to_string())), &records).unwrap();
    assert_eq!(fastballs.model_name, "Ace_FF_v1");
    assert_eq!(fastballs.source_feature_count, 2);
    assert_eq!(
        fastballs.profile.get(FeatureName::TrunkRotationAtBr).unwrap().mean,
        Some(11.0)
    );

    let all = build_cohort_profile(&Cohort::new("Ace", None), &records).unwrap();
    assert_eq!(all.model_name, "Ace_all_v1");
    assert_eq!(all.source_feature_count, 3);

    // one good curveball is not enough for any feature
    let curves = vec![record("Ace", "CU", "called_strike", 10.0)];
    assert!(build_cohort_profile(&Cohort::new("Ace", Some("CU".to_string())), &curves).is_none());
    assert!(build_cohort_profile(&Cohort::new("Nobody", None), &records).is_none());
}

#[test]
fn test_pitch_records_parse_from_flat_rows() {
    let json = r#"[
        {"player_name": "Ace", "pitch_type": "FF", "description": "called_strike",
         "trunk_rotation_at_br": 12.5, "release_frame": 40, "pitch_record_id": 1},
        {"player_name": "Ace", "pitch_type": "FF", "description": "foul",
         "Trunk_rotation_at_BR": 13.5, "shoulder_abduction_at_br": null}
    ]"#;
    let records: Vec<PitchRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(records[0].features.trunk_rotation_at_br, Some(12.5));
    assert_eq!(records[0].features.release_frame, Some(40));
    assert_eq!(records[1].features.trunk_rotation_at_br, Some(13.5));
    assert!(records.iter().all(PitchRecord::is_good_pitch));
}

#[test]
fn test_repository_file_round_trip_and_selection() {
    let records = vec![
        record("Ace", "FF", "called_strike", 10.0),
        record("Ace", "FF", "foul", 20.0),
        record("Ace", "SL", "called_strike", 40.0),
    ];
    let mut repo = InMemoryProfileRepository::new();
    for cohort in [Cohort::new("Ace", Some("FF".to_string())), Cohort::new("Ace", None)] {
        let model = build_cohort_profile(&cohort, &records).unwrap();
        repo.insert(model.model_name, model.profile);
    }

    let path = temp_path("profiles.yaml");
    repo.to_file(&path).unwrap();
    let loaded = InMemoryProfileRepository::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, repo);
    assert_eq!(loaded.len(), 2);
    assert_eq!(select_profile(&loaded, "Ace", Some("FF")).unwrap().model_name, "Ace_FF_v1");
    assert_eq!(select_profile(&loaded, "Ace", Some("SL")).unwrap().model_name, "Ace_all_v1");
    assert!(loaded.lookup_profile("Ace", Some("SL")).is_none());
}

#[test]
fn test_repository_loads_json_map() {
    let path = temp_path("profiles.json");
    std::fs::write(
        &path,
        r#"{"Ace_all_v1": {"trunk_rotation_at_br": {"min": 11.8, "max": 26.2, "p10": 11.8,
            "p50_median": 19.0, "p90": 26.2, "mean": 19.0, "std": 6.0553}}}"#,
    )
    .unwrap();
    let repo = InMemoryProfileRepository::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let profile = repo.get_profile("Ace_all_v1").unwrap();
    assert_eq!(score_against_profile(&with_rotation(19.0), &profile, 25.0), 100);
}
