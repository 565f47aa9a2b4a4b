use crate::arq::ArqMachine;
use crate::sim::{FRAME, SimTime};

mod clock;
mod render;
mod session;
mod sim_time;
mod window;

/// 第 k 个 60Hz 帧对应的宿主时间
pub(crate) fn frame_at(k: u64) -> SimTime {
    SimTime(FRAME.0.saturating_mul(k))
}

/// 以 60Hz 驱动状态机直到完成；每个 tick 之后调用一次 `observe`。
/// 返回完成时所在的 tick 序号，超出 `max_ticks` 返回 None。
pub(crate) fn drive<F: FnMut(&ArqMachine)>(
    m: &mut ArqMachine,
    max_ticks: u64,
    mut observe: F,
) -> Option<u64> {
    for k in 0..max_ticks {
        m.tick(frame_at(k));
        observe(m);
        if m.is_complete() {
            return Some(k);
        }
    }
    None
}
