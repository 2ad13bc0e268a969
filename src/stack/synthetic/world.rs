//! 参考协议栈的仿真世界
//!
//! 持有小区、终端、业务流与流统计；事件通过 downcast 访问它。
//! 产生的 RRC 通知先缓存在 `notifications`，由 `SyntheticStack::run`
//! 在每个事件执行后按顺序分发。

use super::algorithm::{HandoverAlgorithm, Measurement, TriggerState};
use super::events::CompleteHandover;
use super::radio;
use crate::config::RadioConfig;
use crate::events::{FailureReason, HandoverEventKind, RrcNotification, RrcSide};
use crate::metrics::{FiveTuple, FlowStats};
use crate::mobility::TerminalKinematics;
use crate::sim::{SimTime, Simulator, World};
use crate::topo::Vec3;
use crate::traffic::{Direction, FlowDescriptor};
use std::any::Any;
use std::net::Ipv4Addr;
use tracing::{debug, trace};

/// 切换执行时延（理想 RRC + X2）
pub(crate) const HANDOVER_LATENCY: SimTime = SimTime(20_000_000);
/// 切换完成时目标小区比源小区弱超过该值则判定接入失败
const JOIN_FAILURE_MARGIN_DB: f64 = 10.0;
/// 首个动态端口（ns-3 的 ephemeral port 起点）
const EPHEMERAL_PORT_BASE: u16 = 49153;
const TCP_PROTOCOL: u8 = 6;
/// 纯 ACK 报文大小
const ACK_BYTES: u64 = 52;
/// 节点编号：0 为 PGW，1 为远端主机，其后依次为 eNB、终端
const FIRST_ENB_NODE: u32 = 2;

const REMOTE_HOST_ADDR: Ipv4Addr = Ipv4Addr::new(1, 0, 0, 2);
const FIRST_UE_ADDR: Ipv4Addr = Ipv4Addr::new(7, 0, 0, 2);

#[derive(Debug, Clone)]
pub(crate) struct Cell {
    /// 1 起
    pub cell_id: u16,
    pub node: u32,
    pub position: Vec3,
    pub orientation_deg: f64,
    next_rnti: u16,
}

impl Cell {
    fn allocate_rnti(&mut self) -> u16 {
        self.next_rnti = self.next_rnti.wrapping_add(1).max(1);
        self.next_rnti
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Terminal {
    pub kin: TerminalKinematics,
    pub node: u32,
    pub imsi: u64,
    pub rnti: u16,
    pub serving: Option<usize>,
    /// 进行中的切换目标
    pub handover_target: Option<usize>,
    pub trigger: TriggerState,
}

#[derive(Debug, Clone)]
pub(crate) struct FlowState {
    pub desc: FlowDescriptor,
    pub data: FlowStats,
    pub ack: FlowStats,
    /// 不足一个包的字节余量
    carry_bytes: f64,
}

#[derive(Default)]
pub(crate) struct RadioWorld {
    pub radio: RadioConfig,
    pub tx_power_dbm: f64,
    pub algorithm: Option<HandoverAlgorithm>,
    pub cells: Vec<Cell>,
    pub terminals: Vec<Terminal>,
    pub flows: Vec<FlowState>,
    pub stop_at: SimTime,
    pub measurement_period: SimTime,
    pub traffic_period: SimTime,
    last_traffic_at: SimTime,
    pub notifications: Vec<RrcNotification>,
}

impl World for RadioWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RadioWorld {
    pub fn new(measurement_period: SimTime, traffic_period: SimTime) -> Self {
        Self {
            measurement_period,
            traffic_period,
            ..Self::default()
        }
    }

    pub fn install_cells(&mut self, positions: impl Iterator<Item = (Vec3, f64)>) {
        self.cells = positions
            .enumerate()
            .map(|(i, (position, orientation_deg))| Cell {
                cell_id: i as u16 + 1,
                node: FIRST_ENB_NODE + i as u32,
                position,
                orientation_deg,
                next_rnti: 0,
            })
            .collect();
    }

    pub fn install_terminals(&mut self, terminals: &[TerminalKinematics]) {
        let first_node = FIRST_ENB_NODE + self.cells.len() as u32;
        self.terminals = terminals
            .iter()
            .enumerate()
            .map(|(i, kin)| Terminal {
                kin: *kin,
                node: first_node + i as u32,
                imsi: i as u64 + 1,
                rnti: 0,
                serving: None,
                handover_target: None,
                trigger: TriggerState::default(),
            })
            .collect();
    }

    pub fn install_flows(&mut self, flows: &[FlowDescriptor]) {
        let mut next_remote_port = EPHEMERAL_PORT_BASE;
        let mut next_id = 1_u32;
        self.flows = flows
            .iter()
            .map(|desc| {
                let ue_addr = terminal_addr(desc.terminal);
                let (src, dst, src_port) = match desc.direction {
                    Direction::Downlink => {
                        let port = next_remote_port;
                        next_remote_port = next_remote_port.wrapping_add(1);
                        (REMOTE_HOST_ADDR, ue_addr, port)
                    }
                    Direction::Uplink => (ue_addr, REMOTE_HOST_ADDR, EPHEMERAL_PORT_BASE),
                };
                let data = empty_stats(next_id, src, dst, src_port, desc.destination_port);
                let ack = empty_stats(next_id + 1, dst, src, desc.destination_port, src_port);
                next_id += 2;
                FlowState {
                    desc: desc.clone(),
                    data,
                    ack,
                    carry_bytes: 0.0,
                }
            })
            .collect();
    }

    fn push(
        &mut self,
        at: SimTime,
        side: RrcSide,
        kind: HandoverEventKind,
        t: usize,
        cell: usize,
        target: Option<usize>,
    ) {
        let terminal = &self.terminals[t];
        let node = match side {
            RrcSide::Ue => terminal.node,
            RrcSide::Enb => self.cells[cell].node,
        };
        self.notifications.push(RrcNotification {
            at,
            side,
            kind,
            node,
            imsi: terminal.imsi,
            cell_id: self.cells[cell].cell_id,
            rnti: terminal.rnti,
            target_cell_id: target.map(|c| self.cells[c].cell_id),
        });
    }

    /// 终端到各小区的 RSRP（dBm）
    fn rsrp_all(&self, position: &Vec3) -> Vec<f64> {
        self.cells
            .iter()
            .map(|cell| {
                let d = cell.position.distance(position);
                let gain = radio::cosine_gain_db(
                    cell.orientation_deg,
                    self.radio.horizontal_beamwidth_deg,
                    &cell.position,
                    position,
                );
                radio::rsrp_dbm(
                    self.tx_power_dbm,
                    self.radio.dl_bandwidth_rb,
                    radio::pathloss_db(d),
                    gain,
                )
            })
            .collect()
    }

    fn position_of(&self, t: usize, at: SimTime) -> Vec3 {
        self.terminals[t].kin.position_at(at.as_secs_f64())
    }

    /// 周期测量：未接入的终端接入最强小区，已接入的交给切换算法判决
    pub fn on_measurement(&mut self, sim: &mut Simulator) {
        let now = sim.now();
        for t in 0..self.terminals.len() {
            if self.terminals[t].handover_target.is_some() {
                continue;
            }
            let rsrp = self.rsrp_all(&self.position_of(t, now));
            let Some(best) = (0..rsrp.len()).max_by(|a, b| rsrp[*a].total_cmp(&rsrp[*b])) else {
                continue;
            };

            let Some(serving) = self.terminals[t].serving else {
                self.attach(now, t, best);
                continue;
            };

            let rsrq_range = rsrp
                .iter()
                .map(|p| radio::rsrq_range(radio::rsrq_db(*p, &rsrp)))
                .collect();
            let m = Measurement {
                serving,
                rsrp_dbm: rsrp,
                rsrq_range,
            };
            let Some(algorithm) = self.algorithm else {
                continue;
            };
            let decision = algorithm.evaluate(now, &m, &mut self.terminals[t].trigger);
            if let Some(target) = decision {
                self.start_handover(sim, t, serving, target);
            }
        }
    }

    fn attach(&mut self, now: SimTime, t: usize, cell: usize) {
        self.account_traffic(now);
        let rnti = self.cells[cell].allocate_rnti();
        let terminal = &mut self.terminals[t];
        terminal.serving = Some(cell);
        terminal.rnti = rnti;
        debug!(imsi = terminal.imsi, cell_id = cell + 1, rnti, "终端接入");
        let kind = HandoverEventKind::ConnectionEstablished;
        self.push(now, RrcSide::Enb, kind, t, cell, None);
        self.push(now, RrcSide::Ue, kind, t, cell, None);
    }

    fn start_handover(&mut self, sim: &mut Simulator, t: usize, source: usize, target: usize) {
        let now = sim.now();
        self.account_traffic(now);
        if !self.radio.x2_enabled {
            let kind = HandoverEventKind::Failure(FailureReason::Leaving);
            self.push(now, RrcSide::Enb, kind, t, source, None);
            return;
        }
        self.terminals[t].handover_target = Some(target);
        self.push(now, RrcSide::Enb, HandoverEventKind::Start, t, source, Some(target));
        self.push(now, RrcSide::Ue, HandoverEventKind::Start, t, source, Some(target));
        sim.schedule(
            now.saturating_add(HANDOVER_LATENCY),
            CompleteHandover { terminal: t },
        );
    }

    /// 切换执行结束：目标小区信号仍可用则成功，否则目标侧接入失败，终端留在源小区
    pub fn complete_handover(&mut self, now: SimTime, t: usize) {
        self.account_traffic(now);
        let (Some(source), Some(target)) =
            (self.terminals[t].serving, self.terminals[t].handover_target.take())
        else {
            return;
        };
        let rsrp = self.rsrp_all(&self.position_of(t, now));
        if rsrp[target] + JOIN_FAILURE_MARGIN_DB < rsrp[source] {
            let kind = HandoverEventKind::Failure(FailureReason::Joining);
            self.push(now, RrcSide::Enb, kind, t, target, None);
            return;
        }

        let rnti = self.cells[target].allocate_rnti();
        let terminal = &mut self.terminals[t];
        terminal.serving = Some(target);
        terminal.rnti = rnti;
        terminal.trigger.reset();
        self.push(now, RrcSide::Enb, HandoverEventKind::EndOk, t, target, None);
        self.push(now, RrcSide::Ue, HandoverEventKind::EndOk, t, target, None);
    }

    /// 把 `[last_traffic_at, until)` 区间的传输量记入流统计。
    ///
    /// 每条流只按它在区间内实际处于发送状态的时长记账。每个小区的容量在该小区下
    /// 有活跃下行流的终端之间平分；上行同理。切换执行期间终端不收发数据。
    /// 服务小区变化前必须先调用本函数，使每个区间内的接入状态不变。
    pub fn account_traffic(&mut self, until: SimTime) {
        let from = self.last_traffic_at;
        if until <= from {
            return;
        }
        self.last_traffic_at = until;

        let windows: Vec<Option<(usize, f64)>> = self
            .flows
            .iter()
            .map(|f| self.active_window(f, from, until))
            .collect();

        let mut dl_users = vec![0_u32; self.cells.len()];
        let mut ul_users = vec![0_u32; self.cells.len()];
        for (f, window) in self.flows.iter().zip(&windows) {
            let Some((cell, _)) = window else {
                continue;
            };
            match f.desc.direction {
                Direction::Downlink => dl_users[*cell] += 1,
                Direction::Uplink => ul_users[*cell] += 1,
            }
        }

        for (i, window) in windows.into_iter().enumerate() {
            let Some((cell, dt)) = window else {
                continue;
            };
            let terminal = self.flows[i].desc.terminal as usize;
            let rsrp = self.rsrp_all(&self.position_of(terminal, from));
            let sinr = radio::sinr_db(rsrp[cell], &rsrp, cell);
            let (users, rbs) = match self.flows[i].desc.direction {
                Direction::Downlink => (dl_users[cell], self.radio.dl_bandwidth_rb),
                Direction::Uplink => (ul_users[cell], self.radio.ul_bandwidth_rb),
            };
            let share_bps = radio::cell_rate_bps(sinr, rbs) / f64::from(users.max(1));
            let rate_bps = share_bps.min(self.flows[i].desc.rate_bps as f64);

            let flow = &mut self.flows[i];
            let total = flow.carry_bytes + rate_bps * dt / 8.0;
            let pkt_bytes = f64::from(flow.desc.packet_bytes.max(1));
            let pkts = (total / pkt_bytes).floor();
            flow.carry_bytes = total - pkts * pkt_bytes;
            let (pkts, bytes) = (pkts as u64, (pkts * pkt_bytes) as u64);
            flow.data.tx_packets += pkts;
            flow.data.rx_packets += pkts;
            flow.data.tx_bytes += bytes;
            flow.data.rx_bytes += bytes;
            let acks = pkts.div_ceil(2);
            flow.ack.tx_packets += acks;
            flow.ack.rx_packets += acks;
            flow.ack.tx_bytes += acks * ACK_BYTES;
            flow.ack.rx_bytes += acks * ACK_BYTES;
            trace!(flow_id = flow.data.flow_id, pkts, "流量记账");
        }
    }

    /// 流在 `[from, until)` 内的服务小区与发送时长（秒）
    fn active_window(&self, f: &FlowState, from: SimTime, until: SimTime) -> Option<(usize, f64)> {
        let begin = f.desc.start.max(f.desc.sink_start).max(from);
        let end = f.desc.stop.min(until);
        if end <= begin {
            return None;
        }
        let terminal = self.terminals.get(f.desc.terminal as usize)?;
        if terminal.handover_target.is_some() {
            return None;
        }
        let cell = terminal.serving?;
        Some((cell, end.saturating_sub(begin).as_secs_f64()))
    }

    pub fn flow_stats(&self) -> Vec<FlowStats> {
        let mut stats: Vec<FlowStats> = self
            .flows
            .iter()
            .flat_map(|f| [f.data, f.ack])
            .filter(|s| s.tx_packets > 0)
            .collect();
        stats.sort_by_key(|s| s.flow_id);
        stats
    }
}

fn terminal_addr(index: u32) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(FIRST_UE_ADDR).wrapping_add(index))
}

fn empty_stats(flow_id: u32, src: Ipv4Addr, dst: Ipv4Addr, sport: u16, dport: u16) -> FlowStats {
    FlowStats {
        flow_id,
        tuple: FiveTuple {
            source_address: src,
            destination_address: dst,
            protocol: TCP_PROTOCOL,
            source_port: sport,
            destination_port: dport,
        },
        tx_bytes: 0,
        rx_bytes: 0,
        tx_packets: 0,
        rx_packets: 0,
        lost_packets: 0,
    }
}
