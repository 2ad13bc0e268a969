//! 仿真核心模块
//!
//! 此模块包含事件驱动仿真的核心组件，如仿真时间、事件、世界和仿真器。
//! 单线程执行：所有事件按 (时间, 序列号) 严格有序地在同一线程上运行。

// 子模块声明
mod event;
mod scheduled_event;
mod simulator;
mod time;
mod world;

// 重新导出公共接口
pub use event::Event;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
