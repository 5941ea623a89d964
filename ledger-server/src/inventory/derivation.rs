//! 库存派生计算 (纯函数)
//!
//! 只在内存中的盘点与入库切片上计算，不做任何 I/O。
//! 规则：
//! - 当前库存 = 最近 *创建* 的盘点数量 + 该盘点创建之后入库 (booked_at 严格更晚) 的数量
//! - 月度用量 = 期初 + 当月入库 − 期末，下限为 0
//! - 两次盘点间用量 = 前次盘点 + 两次盘点创建时间之间入库 − 本次盘点，下限为 0
//! - 快照月报 = 月初快照 + 当月入库 − 月末快照，下限为 0 (无盘点参与)
//!
//! 未入库 (pending) 与已撤销 (reversed) 的入库永远不参与计算。

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::quantity::{money_to_f64, quantity_to_f64, sum, to_decimal};

/// 一次盘点
#[derive(Debug, Clone, PartialEq)]
pub struct StockCount {
    pub id: i64,
    pub count_date: NaiveDate,
    pub quantity: f64,
    /// 创建时间 (权威排序键，不同于盘点日期)
    pub created_at: i64,
}

/// 入库来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementOrigin {
    CenterShipment,
    Shipment,
}

impl MovementOrigin {
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::CenterShipment => "center_shipment",
            Self::Shipment => "shipment",
        }
    }
}

/// 入库状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementState {
    /// 已创建未入库，不影响库存
    Pending,
    /// 已入库，按 booked_at 参与计算
    Booked,
    /// 创建记录已被撤销，永久排除
    Reversed,
}

/// 一条入库行 (中央配送或到货单明细)
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMovement {
    pub origin: MovementOrigin,
    pub origin_id: i64,
    pub quantity: f64,
    pub cost: f64,
    /// 名义日期 (月度归属)
    pub event_date: NaiveDate,
    /// 入库时间 (与盘点先后比较)
    pub booked_at: Option<i64>,
    pub reversed: bool,
}

impl InboundMovement {
    pub fn state(&self) -> MovementState {
        match (self.reversed, self.booked_at) {
            (true, _) => MovementState::Reversed,
            (false, Some(_)) => MovementState::Booked,
            (false, None) => MovementState::Pending,
        }
    }

    /// 参与计算时的入库时间
    fn live_booked_at(&self) -> Option<i64> {
        match self.state() {
            MovementState::Booked => self.booked_at,
            _ => None,
        }
    }
}

/// 月份区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    /// 次月第一天 00:00 (业务时区) 的 Unix millis
    pub end_millis: i64,
}

/// 当前库存
#[derive(Debug, Clone, PartialEq)]
pub struct StockLevel {
    pub quantity: f64,
    pub base_count: Option<StockCount>,
    pub incoming_since_count: f64,
}

/// 月度用量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageFigures {
    pub start_qty: f64,
    pub incoming_qty: f64,
    pub end_qty: f64,
    pub used_qty: f64,
    pub incoming_cost: f64,
}

/// 两次盘点间用量
#[derive(Debug, Clone, PartialEq)]
pub struct CountInterval {
    pub previous: StockCount,
    pub current: StockCount,
    pub shipments_between: f64,
    pub usage: f64,
}

/// 按创建时间排序的最近一次盘点 (同一毫秒按 id)
fn latest_created(counts: &[StockCount]) -> Option<&StockCount> {
    counts.iter().max_by_key(|c| (c.created_at, c.id))
}

/// 按盘点日期排序的最近一次盘点 (同日按创建时间)
fn latest_dated<'a>(counts: impl Iterator<Item = &'a StockCount>) -> Option<&'a StockCount> {
    counts.max_by_key(|c| (c.count_date, c.created_at, c.id))
}

fn floor_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// 名义日期在当月且在月末之前已入库的入库行
fn month_incoming<'a>(
    movements: &'a [InboundMovement],
    window: &MonthWindow,
) -> Vec<&'a InboundMovement> {
    movements
        .iter()
        .filter(|m| {
            let in_month = m.event_date >= window.first_day && m.event_date <= window.last_day;
            in_month && m.live_booked_at().is_some_and(|t| t < window.end_millis)
        })
        .collect()
}

fn usage_figures(start: Decimal, incoming: &[&InboundMovement], end: Decimal) -> UsageFigures {
    let incoming_qty = sum(incoming.iter().map(|m| m.quantity));
    let incoming_cost = sum(incoming.iter().map(|m| m.cost));
    UsageFigures {
        start_qty: quantity_to_f64(start),
        incoming_qty: quantity_to_f64(incoming_qty),
        end_qty: quantity_to_f64(end),
        used_qty: quantity_to_f64(floor_zero(start + incoming_qty - end)),
        incoming_cost: money_to_f64(incoming_cost),
    }
}

pub fn current_stock(counts: &[StockCount], movements: &[InboundMovement]) -> StockLevel {
    let base = latest_created(counts);
    let since = base.map(|c| c.created_at);

    let incoming = sum(movements.iter().filter_map(|m| {
        let booked_at = m.live_booked_at()?;
        match since {
            Some(t) if booked_at <= t => None,
            _ => Some(m.quantity),
        }
    }));

    let base_qty = base.map_or(Decimal::ZERO, |c| to_decimal(c.quantity));
    StockLevel {
        quantity: quantity_to_f64(base_qty + incoming),
        base_count: base.cloned(),
        incoming_since_count: quantity_to_f64(incoming),
    }
}

/// 月度用量
///
/// 当月入库按名义日期归属，但必须在月末之前已入库；
/// 名义日期在当月但次月才入库的记录不计入当月。
pub fn monthly_usage(
    counts: &[StockCount],
    movements: &[InboundMovement],
    window: &MonthWindow,
) -> UsageFigures {
    let start = latest_dated(counts.iter().filter(|c| c.count_date < window.first_day));
    let end = latest_dated(counts.iter().filter(|c| c.count_date >= window.first_day));

    let start_qty = start.map_or(Decimal::ZERO, |c| to_decimal(c.quantity));
    let end_qty = end.map_or(Decimal::ZERO, |c| to_decimal(c.quantity));
    usage_figures(start_qty, &month_incoming(movements, window), end_qty)
}

/// 快照月报: 期初/期末取月初、月末快照，入库规则同月度用量
///
/// 没有快照也没有当月入库时返回 None。
pub fn snapshot_usage(
    start: Option<f64>,
    end: Option<f64>,
    movements: &[InboundMovement],
    window: &MonthWindow,
) -> Option<UsageFigures> {
    let incoming = month_incoming(movements, window);
    if start.is_none() && end.is_none() && incoming.is_empty() {
        return None;
    }
    Some(usage_figures(
        start.map_or(Decimal::ZERO, to_decimal),
        &incoming,
        end.map_or(Decimal::ZERO, to_decimal),
    ))
}

/// 最近两次盘点之间的用量；少于两次盘点时返回 None
pub fn usage_between_counts(
    counts: &[StockCount],
    movements: &[InboundMovement],
) -> Option<CountInterval> {
    let mut ordered: Vec<&StockCount> = counts.iter().collect();
    ordered.sort_by_key(|c| (c.created_at, c.id));
    let [.., previous, current] = ordered.as_slice() else {
        return None;
    };

    let between = sum(movements.iter().filter_map(|m| {
        let booked_at = m.live_booked_at()?;
        (booked_at > previous.created_at && booked_at < current.created_at).then_some(m.quantity)
    }));

    let usage = floor_zero(to_decimal(previous.quantity) + between - to_decimal(current.quantity));

    Some(CountInterval {
        previous: (*previous).clone(),
        current: (*current).clone(),
        shipments_between: quantity_to_f64(between),
        usage: quantity_to_f64(usage),
    })
}
