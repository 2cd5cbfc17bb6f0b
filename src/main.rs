use rigpose::parse::load_rig_from_file;
use rigpose::session::AnimationSession;
use rigpose::visualize::run_posing_demo;

fn main() {
    colog::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./demos/figure_rig.bvh".to_string());

    // a failed load leaves nothing to pose, so there is no retry
    let (rig, data) = match load_rig_from_file(&path) {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!("could not load rig from {path}: {err}");
            std::process::exit(1);
        }
    };
    log::info!("loaded rig with {} joints from {path}", rig.num_joints());

    run_posing_demo(AnimationSession::new(rig, data), 1.0);
}
