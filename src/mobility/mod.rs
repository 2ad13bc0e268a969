//! 终端移动性
//!
//! 只负责生成初始位置与速度；之后的移动状态归外部协议栈所有。

pub mod kinematics;

pub use kinematics::{
    DeploymentArea, SpeedRange, TerminalKinematics, generate_terminals, kmh_to_mps,
};
