use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rigpose::parse::load_rig_from_string;
use rigpose::session::AnimationSession;
use rigpose::types::Axis;

/// Build a deep single-chain rig with `num_joints` joints.
fn synthetic_rig(num_joints: usize) -> String {
    let mut text = String::from("HIERARCHY\nROOT joint_0\n{\nOFFSET 0.0 1.0 0.0\n");
    for i in 1..num_joints {
        text += &format!("JOINT joint_{i}\n{{\nOFFSET 0.0 0.1 0.0\n");
    }
    text += "End Site\n{\nOFFSET 0.0 0.1 0.0\n}\n";
    for _ in 0..num_joints {
        text += "}\n";
    }
    text
}

fn pose_and_assemble(rig_text: &str) {
    let (rig, data) = load_rig_from_string(rig_text).unwrap();
    let mut session = AnimationSession::new(rig, data);

    for i in 0..30 {
        let angle = 0.05 * i as f64;
        session.set_axis_rotation(&format!("joint_{}", i % 64), Axis::Z, angle);
        session.capture_pose();
    }
    session.close_loop();
    let clip = session.assemble_clip("bench");
    black_box(clip);
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let rig_text = synthetic_rig(64);

    let mut group = c.benchmark_group("capture-and-assemble");
    group.sample_size(50);
    group.bench_function("64 joints, 30 captures", |b| {
        b.iter(|| pose_and_assemble(black_box(&rig_text)))
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
