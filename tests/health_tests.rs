use deckhand::app::{Liveness, TaskHandle};
use deckhand::health::HealthCheck;
use deckhand::testkit::consumer_status;

#[test]
fn healthy_requires_all_loops_alive_and_consumer_receiving() {
    let check = HealthCheck::new(
        Liveness::stub(true),
        Liveness::stub(true),
        Liveness::stub(true),
        consumer_status(true),
    );
    assert!(check.is_healthy());
}

#[test]
fn any_dead_loop_makes_the_daemon_unhealthy() {
    for dead in 0..3 {
        let flag = |index: usize| Liveness::stub(index != dead);
        let check = HealthCheck::new(flag(0), flag(1), flag(2), consumer_status(true));
        assert!(!check.is_healthy(), "dead loop {dead} must be unhealthy");
    }
}

#[test]
fn stalled_consumer_is_unhealthy_even_with_all_loops_alive() {
    let check = HealthCheck::new(
        Liveness::stub(true),
        Liveness::stub(true),
        Liveness::stub(true),
        consumer_status(false),
    );
    assert!(!check.is_healthy());
}

#[tokio::test]
async fn a_crashed_background_loop_flips_the_health_signal() {
    let deployer = TaskHandle::spawn("deployer", async {
        panic!("unexpected fault");
    });
    let liveness = deployer.liveness();
    deployer.join().await;

    let check = HealthCheck::new(
        liveness,
        Liveness::stub(true),
        Liveness::stub(true),
        consumer_status(true),
    );
    assert!(!check.is_healthy());
}
