//! Integration tests for StudentClusters

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use studentclusters::{
    pipeline::{DESCRIPTIONS_FILE, KMEANS_FILE, TRANSFORMER_FILE},
    train, train_from_csv, ClusterDescriptions, Error, FittedClusterModelState,
    FittedTransformerState, InferenceService, StudentRecord, TrainingConfig,
};
use tempfile::{NamedTempFile, TempDir};

/// Five well-separated generating profiles, numeric means taken from the
/// historical model's cluster centroids.
struct GroupProfile {
    study_hours: f64,
    attendance: f64,
    teacher_quality: f64,
    assignments: f64,
    categoricals: [&'static str; 7],
}

fn group_profiles() -> [GroupProfile; 5] {
    [
        GroupProfile {
            study_hours: 10.52,
            attendance: 75.77,
            teacher_quality: 2.25,
            assignments: 1.10,
            categoricals: ["Public", "Rural", "No", "Low", "Low", "None", "Low"],
        },
        GroupProfile {
            study_hours: 25.59,
            attendance: 76.21,
            teacher_quality: 2.09,
            assignments: 2.33,
            categoricals: ["Public", "Urban", "No", "Medium", "Medium", "Primary", "Medium"],
        },
        GroupProfile {
            study_hours: 31.14,
            attendance: 88.95,
            teacher_quality: 2.87,
            assignments: 3.42,
            categoricals: ["Private", "Urban", "Yes", "High", "High", "Tertiary", "High"],
        },
        GroupProfile {
            study_hours: 18.36,
            attendance: 88.86,
            teacher_quality: 3.51,
            assignments: 1.40,
            categoricals: ["Public", "Urban", "Yes", "Medium", "Low", "Secondary", "Medium"],
        },
        GroupProfile {
            study_hours: 17.01,
            attendance: 91.29,
            teacher_quality: 1.63,
            assignments: 1.36,
            categoricals: ["Public", "Rural", "No", "Low", "Medium", "Secondary", "Low"],
        },
    ]
}

fn record_from(profile: &GroupProfile, noise: [f64; 4]) -> StudentRecord {
    let [school_type, school_location, extra_tutorials, ses, it, parent_edu, parent_inv] =
        profile.categoricals;
    StudentRecord {
        study_hours_per_week: profile.study_hours + noise[0],
        attendance_rate: profile.attendance + noise[1],
        teacher_quality: profile.teacher_quality + noise[2],
        assignments_completed: profile.assignments + noise[3],
        school_type: school_type.to_string(),
        school_location: school_location.to_string(),
        extra_tutorials: extra_tutorials.to_string(),
        socioeconomic_status: ses.to_string(),
        it_knowledge: it.to_string(),
        parent_education_level: parent_edu.to_string(),
        parent_involvement: parent_inv.to_string(),
    }
}

/// 100 noisy records per generating group, with the group index of each.
fn synthetic_records(seed: u64) -> (Vec<StudentRecord>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let profiles = group_profiles();
    let mut records = Vec::with_capacity(500);
    let mut groups = Vec::with_capacity(500);

    for _ in 0..100 {
        for (group_idx, profile) in profiles.iter().enumerate() {
            let noise = [
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.3..0.3),
                rng.gen_range(-0.3..0.3),
            ];
            records.push(record_from(profile, noise));
            groups.push(group_idx);
        }
    }

    (records, groups)
}

fn write_csv(records: &[StudentRecord]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Study_Hours_Per_Week,Attendance_Rate,Teacher_Quality,Assignments_Completed,\
School_Type,School_Location,Extra_Tutorials,Socioeconomic_Status,IT_Knowledge,\
Parent_Education_Level,Parent_Involvement"
    )
    .unwrap();
    for r in records {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{}",
            r.study_hours_per_week,
            r.attendance_rate,
            r.teacher_quality,
            r.assignments_completed,
            r.school_type,
            r.school_location,
            r.extra_tutorials,
            r.socioeconomic_status,
            r.it_knowledge,
            r.parent_education_level,
            r.parent_involvement,
        )
        .unwrap();
    }
    file
}

/// For each generating group, the share of members landing on the
/// group's majority predicted label.
fn purity_per_group(labels: &[usize], groups: &[usize], k: usize) -> Vec<(usize, f64)> {
    let mut result = Vec::new();
    for group_idx in 0..k {
        let member_labels: Vec<usize> = labels
            .iter()
            .zip(groups)
            .filter(|(_, &g)| g == group_idx)
            .map(|(&label, _)| label)
            .collect();
        let mut counts = vec![0usize; k];
        for &label in &member_labels {
            counts[label] += 1;
        }
        let (majority, majority_count) = counts
            .iter()
            .enumerate()
            .max_by_key(|(_, &count)| count)
            .unwrap();
        result.push((majority, *majority_count as f64 / member_labels.len() as f64));
    }
    result
}

#[test]
fn test_end_to_end_five_separated_clusters() {
    let (records, groups) = synthetic_records(7);
    let outcome = train(&records, &TrainingConfig::default()).unwrap();

    assert_eq!(outcome.labels.len(), 500);
    assert_eq!(outcome.cluster_sizes().iter().sum::<usize>(), 500);

    let purities = purity_per_group(&outcome.labels, &groups, 5);
    for (group_idx, (_, purity)) in purities.iter().enumerate() {
        assert!(
            *purity >= 0.95,
            "group {group_idx} purity {purity} below 0.95"
        );
    }

    // Each generating group must land on its own predicted id.
    let mut majority_labels: Vec<usize> = purities.iter().map(|(label, _)| *label).collect();
    majority_labels.sort_unstable();
    majority_labels.dedup();
    assert_eq!(majority_labels.len(), 5);
}

#[test]
fn test_training_is_deterministic_for_a_seed() {
    let (records, _) = synthetic_records(7);
    let config = TrainingConfig::default();

    let first = train(&records, &config).unwrap();
    let second = train(&records, &config).unwrap();

    assert_eq!(first.model.centroids, second.model.centroids);
    assert_eq!(first.model.inertia, second.model.inertia);
    assert_eq!(first.labels, second.labels);
}

#[test]
fn test_train_from_csv_matches_in_memory_training() {
    let (records, _) = synthetic_records(3);
    let csv = write_csv(&records);
    let config = TrainingConfig::default();

    let from_csv = train_from_csv(csv.path(), &config).unwrap();
    let in_memory = train(&records, &config).unwrap();

    assert_eq!(from_csv.model.centroids, in_memory.model.centroids);
    assert_eq!(from_csv.labels, in_memory.labels);
}

#[test]
fn test_artifacts_roundtrip_and_serve_inference() {
    let (records, _) = synthetic_records(7);
    let outcome = train(&records, &TrainingConfig::default()).unwrap();

    let dir = TempDir::new().unwrap();
    outcome.persist(dir.path()).unwrap();

    // Safe round-trip: every persisted artifact deserializes to an equal value.
    let transformer =
        FittedTransformerState::load_from_file(dir.path().join(TRANSFORMER_FILE)).unwrap();
    let model = FittedClusterModelState::load_from_file(dir.path().join(KMEANS_FILE)).unwrap();
    let descriptions =
        ClusterDescriptions::load_from_file(dir.path().join(DESCRIPTIONS_FILE)).unwrap();
    assert_eq!(transformer, outcome.transformer);
    assert_eq!(model, outcome.model);
    assert_eq!(descriptions, outcome.descriptions);

    // A service loaded from disk reproduces the training-time assignment.
    let service = InferenceService::load(dir.path()).unwrap();
    let result = service.classify(&records[0]).unwrap();
    assert_eq!(result.cluster_id, outcome.labels[0]);
    assert!(!result.description.headline.is_empty());
}

#[test]
fn test_inference_example_matches_high_commitment_cluster() {
    let (records, groups) = synthetic_records(7);
    let outcome = train(&records, &TrainingConfig::default()).unwrap();

    // Predicted id of the generating group built around the historical
    // high-commitment centroid (study 31.14, attendance 88.95,
    // teacher quality 2.87, assignments 3.42).
    let purities = purity_per_group(&outcome.labels, &groups, 5);
    let (high_commitment_label, purity) = purities[2];
    assert!(purity >= 0.95);

    let service =
        InferenceService::new(outcome.transformer, outcome.model, outcome.descriptions).unwrap();
    let record = StudentRecord {
        study_hours_per_week: 31.0,
        attendance_rate: 89.0,
        teacher_quality: 3.0,
        assignments_completed: 3.0,
        school_type: "Private".to_string(),
        school_location: "Urban".to_string(),
        extra_tutorials: "Yes".to_string(),
        socioeconomic_status: "High".to_string(),
        it_knowledge: "High".to_string(),
        parent_education_level: "Tertiary".to_string(),
        parent_involvement: "High".to_string(),
    };

    let result = service.classify(&record).unwrap();
    assert_eq!(result.cluster_id, high_commitment_label);
    assert!(result.description.headline.contains("high study hours"));
}

#[test]
fn test_unseen_categorical_value_still_classifies() {
    let (records, _) = synthetic_records(7);
    let outcome = train(&records, &TrainingConfig::default()).unwrap();
    let service =
        InferenceService::new(outcome.transformer, outcome.model, outcome.descriptions).unwrap();

    let mut record = records[0].clone();
    record.school_type = "Homeschool".to_string(); // never observed at fit time

    let result = service.classify(&record).unwrap();
    assert!(result.cluster_id < service.n_clusters());
}

#[test]
fn test_schema_mismatch_fails_before_fitting() {
    let mut file = NamedTempFile::new().unwrap();
    // Teacher_Quality column missing entirely.
    writeln!(
        file,
        "Study_Hours_Per_Week,Attendance_Rate,Assignments_Completed,School_Type,\
School_Location,Extra_Tutorials,Socioeconomic_Status,IT_Knowledge,\
Parent_Education_Level,Parent_Involvement"
    )
    .unwrap();
    writeln!(file, "20,85,2,Public,Urban,No,Medium,Medium,Secondary,Medium").unwrap();
    writeln!(file, "30,90,3,Private,Urban,Yes,High,High,Tertiary,High").unwrap();

    let result = train_from_csv(file.path(), &TrainingConfig::default());
    match result {
        Err(Error::Schema { missing, .. }) => {
            assert!(missing.contains(&"Teacher_Quality".to_string()));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn test_invalid_k_larger_than_dataset() {
    let (records, _) = synthetic_records(7);
    let small = &records[..3];
    let config = TrainingConfig {
        k: 5,
        ..TrainingConfig::default()
    };

    let result = train(small, &config);
    assert!(matches!(result, Err(Error::InvalidK { k: 5, max: 3 })));
}
