//! Checkpoint codec: every record shape survives a write/read cycle.

use std::path::Path;

use reqcheck_core::{
    read_record, write_record, AugmentedFeedback, CriteriaSet, Criterion, Feedback,
    FeedbackCollection, Grade, ImprovedRequirement, Shaped,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

fn roundtrip<T>(record: &T, path: &Path) -> T
where
    T: Serialize + DeserializeOwned + Shaped,
{
    write_record(record, path).expect("write");
    read_record::<T>(path).expect("read")
}

fn sample_collection() -> FeedbackCollection {
    FeedbackCollection {
        feedback_collection: vec![
            AugmentedFeedback {
                criterion: Criterion::new("Short title", "The title fits in one line."),
                feedback: Feedback::new(Grade::B, Some("Drop the filler words.".to_string())),
            },
            AugmentedFeedback {
                criterion: Criterion::new("User view", "Written from the user's view."),
                feedback: Feedback::new(Grade::A, None),
            },
        ],
    }
}

#[test]
fn criterion_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let c = Criterion::new("TestCriterion", "TestExplanation");
    assert_eq!(roundtrip(&c, &dir.path().join("c.json")), c);
}

#[test]
fn criteria_set_roundtrip_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let set = CriteriaSet::new(vec![
        Criterion::new("first", "1"),
        Criterion::new("second", "2"),
        Criterion::new("third", "3"),
    ]);
    assert_eq!(roundtrip(&set, &dir.path().join("criteria.json")), set);
}

#[test]
fn empty_criteria_set_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let set = CriteriaSet::default();
    assert_eq!(roundtrip(&set, &dir.path().join("criteria.json")), set);
}

#[test]
fn feedback_roundtrip_with_and_without_suggestion() {
    let dir = tempfile::tempdir().unwrap();
    let with = Feedback::new(Grade::E, Some("Name the benefit.".to_string()));
    let without = Feedback::new(Grade::A, None);
    assert_eq!(roundtrip(&with, &dir.path().join("a.json")), with);
    assert_eq!(roundtrip(&without, &dir.path().join("b.json")), without);
}

#[test]
fn feedback_collection_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let fc = sample_collection();
    assert_eq!(roundtrip(&fc, &dir.path().join("r_feedback.json")), fc);
}

#[test]
fn improved_requirement_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let r = ImprovedRequirement::new("Buy milk (Refined)");
    assert_eq!(roundtrip(&r, &dir.path().join("r.json")), r);
}

#[test]
fn overwrite_replaces_previous_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("criteria.json");
    write_record(&CriteriaSet::new(vec![Criterion::new("old", "old")]), &path).unwrap();
    let new = CriteriaSet::new(vec![Criterion::new("new", "new")]);
    write_record(&new, &path).unwrap();
    assert_eq!(read_record::<CriteriaSet>(&path).unwrap(), new);

    // no temp files left behind
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn checkpoint_wire_format_matches_documented_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("r_feedback.json");
    write_record(&sample_collection(), &path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let first = &raw["feedback_collection"][0];
    assert_eq!(first["criterion"]["title"], "Short title");
    assert_eq!(first["feedback"]["grade"], "B");
    assert!(raw["feedback_collection"][1]["feedback"]["suggestion"].is_null());
}

#[test]
fn forward_compatible_with_extra_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("criteria.json");
    std::fs::write(
        &path,
        r#"{"version": 2, "criteria": [{"title": "t", "explanation": "e", "weight": 0.3}]}"#,
    )
    .unwrap();
    let set: CriteriaSet = read_record(&path).unwrap();
    assert_eq!(set, CriteriaSet::new(vec![Criterion::new("t", "e")]));
}

#[test]
fn loose_grades_are_normalized_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.json");
    std::fs::write(&path, r#"{"grade": " c+ ", "suggestion": "x"}"#).unwrap();
    let f: Feedback = read_record(&path).unwrap();
    assert_eq!(f.grade, Grade::C);

    std::fs::write(&path, r#"{"grade": "excellent"}"#).unwrap();
    assert!(read_record::<Feedback>(&path).unwrap_err().is_schema());
}
