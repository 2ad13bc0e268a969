//! 业务流计划
//!
//! 每个终端每个启用的方向一条 full-buffer TCP 流。端口为 `base + 终端下标`，
//! 因此同一方向内终端与端口一一对应；起始时间在抖动窗口内独立抽样，
//! 停止时间统一为观测窗口结束时刻。

use crate::config::TrafficConfig;
use crate::error::ConfigError;
use crate::sim::SimTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// 远端主机 -> 终端
    Downlink,
    /// 终端 -> 远端主机
    Uplink,
}

/// 流的一端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Endpoint {
    RemoteHost,
    Terminal { index: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDescriptor {
    pub terminal: u32,
    pub direction: Direction,
    pub source: Endpoint,
    pub destination: Endpoint,
    pub destination_port: u16,
    pub rate_bps: u64,
    pub packet_bytes: u32,
    /// 发送端启动时间
    pub start: SimTime,
    /// 接收端（PacketSink）启动时间，独立抖动
    pub sink_start: SimTime,
    pub stop: SimTime,
}

impl FlowDescriptor {
    /// 在 `at` 时刻发送端是否处于发送状态
    pub fn is_active(&self, at: SimTime) -> bool {
        at >= self.start.max(self.sink_start) && at < self.stop
    }
}

#[derive(Debug, Clone)]
pub struct TrafficPlanOpts {
    pub terminals: usize,
    pub downlink: bool,
    pub uplink: bool,
    pub traffic: TrafficConfig,
    pub duration: SimTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPlan {
    pub dl_ports: Range<u16>,
    pub ul_ports: Range<u16>,
    pub flows: Vec<FlowDescriptor>,
}

impl TrafficPlan {
    /// 生成计划。端口区间溢出或上下行重叠时在运行前失败。
    pub fn build<R: Rng + ?Sized>(opts: &TrafficPlanOpts, rng: &mut R) -> Result<Self, ConfigError> {
        let cfg = &opts.traffic;
        cfg.check_ports(opts.terminals)?;
        let dl_ports = port_range(cfg.dl_port, opts.terminals);
        let ul_ports = port_range(cfg.ul_port, opts.terminals);

        let mut jitter = || {
            if cfg.start_jitter.0 == 0 {
                SimTime::ZERO
            } else {
                SimTime(rng.gen_range(0..=cfg.start_jitter.0))
            }
        };

        let mut flows = Vec::new();
        for (u, (dl_port, ul_port)) in dl_ports.clone().zip(ul_ports.clone()).enumerate() {
            let terminal = u as u32;
            if opts.downlink {
                flows.push(FlowDescriptor {
                    terminal,
                    direction: Direction::Downlink,
                    source: Endpoint::RemoteHost,
                    destination: Endpoint::Terminal { index: terminal },
                    destination_port: dl_port,
                    rate_bps: cfg.rate_bps,
                    packet_bytes: cfg.packet_bytes,
                    start: jitter(),
                    sink_start: jitter(),
                    stop: opts.duration,
                });
            }
            if opts.uplink {
                flows.push(FlowDescriptor {
                    terminal,
                    direction: Direction::Uplink,
                    source: Endpoint::Terminal { index: terminal },
                    destination: Endpoint::RemoteHost,
                    destination_port: ul_port,
                    rate_bps: cfg.rate_bps,
                    packet_bytes: cfg.packet_bytes,
                    start: jitter(),
                    sink_start: jitter(),
                    stop: opts.duration,
                });
            }
        }

        Ok(Self {
            dl_ports,
            ul_ports,
            flows,
        })
    }

    pub fn flows_in(&self, direction: Direction) -> impl Iterator<Item = &FlowDescriptor> + '_ {
        self.flows.iter().filter(move |f| f.direction == direction)
    }

    /// 依据目的端口判定流方向；端口区间是方向判定的唯一依据
    pub fn classify_port(&self, port: u16) -> Option<Direction> {
        if self.dl_ports.contains(&port) {
            Some(Direction::Downlink)
        } else if self.ul_ports.contains(&port) {
            Some(Direction::Uplink)
        } else {
            None
        }
    }
}

/// `[base, base + count)`；调用前已由 `check_ports` 保证不溢出。
fn port_range(base: u16, count: usize) -> Range<u16> {
    base..(usize::from(base) + count) as u16
}
