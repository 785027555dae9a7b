//! Latency benchmarks for the risk fusion and decision hot path
//!
//! The combiner and evaluator sit on every moderation request after the
//! analyzer stages return, so they must stay well under a millisecond.
//!
//! Run with: cargo bench -p imageguard-policy

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use imageguard_analyzers::description::{DescriptionSignal, RawCaption};
use imageguard_analyzers::face::{FaceSignal, Gender, RawFace};
use imageguard_analyzers::nudity::{DetectionSignal, RawDetection};
use imageguard_analyzers::pose::{BodyOrientation, PoseMetrics, PoseSignal, RawPose};
use imageguard_analyzers::KeywordScanner;
use imageguard_core::{BoundingBox, ComponentConfig};
use imageguard_policy::{ContextPolicyEvaluator, ContextPolicySet, RiskCombiner, SignalSet};

fn nudity_signal(score: f32) -> DetectionSignal {
    DetectionSignal::from_detections(
        &[
            RawDetection {
                class: "BREAST_EXPOSED".to_string(),
                score,
                bbox: Some(BoundingBox::new(120, 80, 200, 180)),
            },
            RawDetection {
                class: "FACE_FEMALE".to_string(),
                score: 0.92,
                bbox: Some(BoundingBox::new(140, 10, 90, 90)),
            },
        ],
        &ComponentConfig::default(),
    )
}

fn face_signal(age: u32) -> FaceSignal {
    FaceSignal::from_faces(&[RawFace {
        age,
        gender: Gender::Female,
        confidence: 0.94,
        bbox: BoundingBox::new(140, 10, 90, 90),
    }])
}

fn pose_signal() -> PoseSignal {
    PoseSignal::from_raw(&RawPose {
        detected: true,
        metrics: Some(PoseMetrics {
            torso_angle: 52.0,
            hip_bend_angle: 48.0,
            leg_spread: 0.35,
            arms_raised: false,
            hands_near_body: true,
            orientation: BodyOrientation::FacingCamera,
        }),
        confidence: 0.85,
        landmark_count: 33,
    })
}

fn description_signal() -> DescriptionSignal {
    let scanner = KeywordScanner::default_child_keywords();
    DescriptionSignal::from_caption(
        &RawCaption {
            description: "a woman in underwear posing in a bedroom".to_string(),
            tags: vec![
                "woman".to_string(),
                "underwear".to_string(),
                "bedroom".to_string(),
                "posing".to_string(),
            ],
        },
        Some(&scanner),
    )
}

fn benchmark_risk_combiner(c: &mut Criterion) {
    let combiner = RiskCombiner::new();

    let nudity = nudity_signal(0.78);
    let face = face_signal(27);
    let pose = pose_signal();
    let description = description_signal();

    let cases: Vec<(&str, SignalSet<'_>)> = vec![
        (
            "nudity_only",
            SignalSet {
                nudity: Some(&nudity),
                ..Default::default()
            },
        ),
        (
            "all_signals",
            SignalSet {
                nudity: Some(&nudity),
                pose: Some(&pose),
                face: Some(&face),
                description: Some(&description),
            },
        ),
    ];

    let mut group = c.benchmark_group("Risk_Combiner");
    group.significance_level(0.05);
    group.sample_size(100);

    for (name, signals) in &cases {
        group.bench_with_input(BenchmarkId::new("combine", name), signals, |b, signals| {
            b.iter(|| combiner.combine(black_box(signals)));
        });
    }

    group.finish();
}

fn benchmark_decision_evaluator(c: &mut Criterion) {
    let combiner = RiskCombiner::new();
    let policies = ContextPolicySet::builtin();
    let evaluator = ContextPolicyEvaluator::new(&policies);

    let nudity = nudity_signal(0.78);
    let face = face_signal(27);
    let description = description_signal();
    let assessment = combiner.combine(&SignalSet {
        nudity: Some(&nudity),
        face: Some(&face),
        description: Some(&description),
        ..Default::default()
    });

    let contexts = ["public_gallery", "private_gallery", "unknown_context"];

    let mut group = c.benchmark_group("Decision_Evaluator");
    group.significance_level(0.05);
    group.sample_size(100);

    for context in contexts {
        group.bench_with_input(BenchmarkId::new("decide", context), &context, |b, ctx| {
            b.iter(|| {
                evaluator.decide(
                    black_box(&assessment),
                    Some(&face),
                    Some(&description),
                    ctx,
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_risk_combiner, benchmark_decision_evaluator);
criterion_main!(benches);
