//! 粗粒度链路模型
//!
//! 只为参考协议栈提供可比较的测量量：对数距离路损 + 余弦天线方向图，
//! 每资源粒子功率，满负载干扰。

use crate::topo::Vec3;

/// 3GPP 宏站路损截距（dB，d 以 km 计）
const PATHLOSS_INTERCEPT_DB: f64 = 128.1;
const PATHLOSS_SLOPE_DB: f64 = 37.6;
/// 近场截断距离（米）
const MIN_DISTANCE_M: f64 = 10.0;
/// 天线背瓣最大衰减
const MAX_ANTENNA_ATTENUATION_DB: f64 = 30.0;
const SUBCARRIERS_PER_RB: f64 = 12.0;
const RB_BANDWIDTH_HZ: f64 = 180_000.0;
/// 每子载波热噪声 -174 dBm/Hz + 10log10(15 kHz) + 9 dB 噪声系数
const NOISE_PER_RE_DBM: f64 = -174.0 + 41.76 + 9.0;
/// 频谱效率上限（64QAM 附近）
const MAX_SPECTRAL_EFFICIENCY: f64 = 5.5;
/// 控制信道/参考信号开销
const USEFUL_FRACTION: f64 = 0.75;

pub(crate) fn db_to_lin(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

pub(crate) fn lin_to_db(lin: f64) -> f64 {
    10.0 * lin.log10()
}

pub(crate) fn pathloss_db(distance_m: f64) -> f64 {
    let d_km = distance_m.max(MIN_DISTANCE_M) / 1000.0;
    PATHLOSS_INTERCEPT_DB + PATHLOSS_SLOPE_DB * d_km.log10()
}

/// 余弦天线增益（dB，最大 0）。指数由水平 3 dB 波束宽度决定。
pub(crate) fn cosine_gain_db(orientation_deg: f64, beamwidth_deg: f64, from: &Vec3, to: &Vec3) -> f64 {
    let bw = beamwidth_deg.clamp(1.0, 359.0).to_radians();
    let exponent = -3.0 / (20.0 * (bw / 4.0).cos().log10());
    let azimuth = (to.y - from.y).atan2(to.x - from.x);
    let mut phi = azimuth - orientation_deg.to_radians();
    while phi > std::f64::consts::PI {
        phi -= 2.0 * std::f64::consts::PI;
    }
    while phi < -std::f64::consts::PI {
        phi += 2.0 * std::f64::consts::PI;
    }
    let amplitude = (phi / 2.0).cos().abs().powf(exponent);
    if amplitude <= 0.0 {
        return -MAX_ANTENNA_ATTENUATION_DB;
    }
    (20.0 * amplitude.log10()).max(-MAX_ANTENNA_ATTENUATION_DB)
}

/// 每资源粒子参考信号接收功率（dBm）
pub(crate) fn rsrp_dbm(tx_power_dbm: f64, rbs: u8, pathloss_db: f64, gain_db: f64) -> f64 {
    let per_re = tx_power_dbm - lin_to_db(SUBCARRIERS_PER_RB * f64::from(rbs.max(1)));
    per_re - pathloss_db + gain_db
}

/// 满负载下的 RSRQ（dB）：RSRP / (12 x 总接收功率每 RE)
pub(crate) fn rsrq_db(serving_rsrp_dbm: f64, all_rsrp_dbm: &[f64]) -> f64 {
    let total: f64 = all_rsrp_dbm.iter().copied().map(db_to_lin).sum::<f64>()
        + db_to_lin(NOISE_PER_RE_DBM);
    serving_rsrp_dbm - lin_to_db(SUBCARRIERS_PER_RB * total)
}

/// RSRQ 映射到 0..=34 的上报量程（与 A2/A4 门限同一标度）
pub(crate) fn rsrq_range(rsrq_db: f64) -> u8 {
    ((rsrq_db + 19.5) * 2.0).floor().clamp(0.0, 34.0) as u8
}

pub(crate) fn sinr_db(serving_rsrp_dbm: f64, all_rsrp_dbm: &[f64], serving: usize) -> f64 {
    let interference: f64 = all_rsrp_dbm
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != serving)
        .map(|(_, p)| db_to_lin(*p))
        .sum();
    serving_rsrp_dbm - lin_to_db(interference + db_to_lin(NOISE_PER_RE_DBM))
}

/// 整个小区带宽独占时的速率（bit/s）
pub(crate) fn cell_rate_bps(sinr_db: f64, rbs: u8) -> f64 {
    let se = (1.0 + db_to_lin(sinr_db)).log2().min(MAX_SPECTRAL_EFFICIENCY);
    f64::from(rbs) * RB_BANDWIDTH_HZ * se * USEFUL_FRACTION
}
