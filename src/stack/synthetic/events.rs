//! 参考协议栈的仿真事件

use super::world::RadioWorld;
use crate::sim::{Event, Simulator, World};
use tracing::trace;

fn radio_world(world: &mut dyn World) -> &mut RadioWorld {
    world
        .as_any_mut()
        .downcast_mut::<RadioWorld>()
        .expect("world must be RadioWorld")
}

/// 周期测量与切换判决
#[derive(Debug)]
pub(crate) struct MeasurementTick;

impl Event for MeasurementTick {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = radio_world(world);
        trace!(now = ?sim.now(), "测量周期");
        w.on_measurement(sim);

        let next = sim.now().saturating_add(w.measurement_period);
        if w.measurement_period.0 > 0 && next <= w.stop_at {
            sim.schedule(next, MeasurementTick);
        }
    }
}

/// 周期流量记账
#[derive(Debug)]
pub(crate) struct TrafficTick;

impl Event for TrafficTick {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = radio_world(world);
        w.account_traffic(sim.now());

        let next = sim.now().saturating_add(w.traffic_period);
        if w.traffic_period.0 > 0 && next <= w.stop_at {
            sim.schedule(next, TrafficTick);
        }
    }
}

/// 切换执行完成
#[derive(Debug)]
pub(crate) struct CompleteHandover {
    pub terminal: usize,
}

impl Event for CompleteHandover {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let CompleteHandover { terminal } = *self;
        radio_world(world).complete_handover(sim.now(), terminal);
    }
}
