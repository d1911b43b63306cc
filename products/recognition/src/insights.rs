//! Read-only projections for the leaderboard and dashboards. Everything is
//! recomputed from the store on each call.

use std::cmp::Reverse;

use async_graphql::{Enum, SimpleObject};
use entity::{Employee, EmployeeId, Loan, PeerRecognition};
use platform_db::RecordStore;
use serde::Serialize;

use crate::{RecognitionError, RecognitionResult};

/// Peer recognitions shown on an employee summary.
const SUMMARY_PEER_RECOGNITIONS: usize = 2;
const SUMMARY_TIPS: usize = 3;

/// Employees by descending balance. Ties keep store order.
pub fn ranked(employees: &[Employee]) -> Vec<&Employee> {
    let mut ranking: Vec<&Employee> = employees.iter().collect();
    ranking.sort_by_key(|employee| Reverse(employee.points_balance));
    ranking
}

pub fn leaderboard(employees: &[Employee], limit: usize) -> Vec<&Employee> {
    let mut ranking = ranked(employees);
    ranking.truncate(limit);
    ranking
}

#[derive(Clone, Debug, PartialEq, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct TeamOverview {
    pub total_employees: usize,
    pub positive_balance: usize,
    pub with_advances: usize,
    pub total_points: i64,
    pub peer_recognitions: usize,
    pub employees_recognized: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    pub department: String,
    pub count: usize,
    pub total_points: i64,
    pub avg_points: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    /// Percentage of employees with at least one recent kudos.
    pub recognized_share: i64,
    pub avg_kudos_per_employee: i64,
    /// One decimal place.
    pub peer_recognitions_per_employee: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub overview: TeamOverview,
    pub departments: Vec<DepartmentStats>,
    pub engagement: Engagement,
}

pub fn team_stats(store: &RecordStore) -> TeamStats {
    let employees = store.employees();
    let peer_count = store.peer_recognitions().len();
    let recognized = employees
        .iter()
        .filter(|e| !e.recent_kudos.is_empty())
        .count();

    let overview = TeamOverview {
        total_employees: employees.len(),
        positive_balance: employees.iter().filter(|e| e.points_balance > 0).count(),
        with_advances: employees.iter().filter(|e| e.has_advance()).count(),
        total_points: employees.iter().map(|e| e.points_balance).sum(),
        peer_recognitions: peer_count,
        employees_recognized: recognized,
    };

    let engagement = if employees.is_empty() {
        Engagement {
            recognized_share: 0,
            avg_kudos_per_employee: 0,
            peer_recognitions_per_employee: 0.0,
        }
    } else {
        let total = employees.len() as f64;
        let kudos: usize = employees.iter().map(|e| e.recent_kudos.len()).sum();
        Engagement {
            recognized_share: round_half_up(recognized as f64 / total * 100.0),
            avg_kudos_per_employee: round_half_up(kudos as f64 / total),
            peer_recognitions_per_employee: round_half_up(peer_count as f64 / total * 10.0)
                as f64
                / 10.0,
        }
    };

    TeamStats {
        overview,
        departments: departments(employees),
        engagement,
    }
}

/// Grouped by the first word of the role, in order of first appearance.
fn departments(employees: &[Employee]) -> Vec<DepartmentStats> {
    let mut groups: Vec<DepartmentStats> = Vec::new();
    for employee in employees {
        let name = employee.department();
        match groups.iter_mut().find(|d| d.department == name) {
            Some(group) => {
                group.count += 1;
                group.total_points += employee.points_balance;
            }
            None => groups.push(DepartmentStats {
                department: name.to_string(),
                count: 1,
                total_points: employee.points_balance,
                avg_points: 0,
            }),
        }
    }
    for group in &mut groups {
        group.avg_points = round_half_up(group.total_points as f64 / group.count as f64);
    }
    groups
}

/// Halves round toward positive infinity, so -2.5 becomes -2.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[derive(Clone, Debug, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub employee_id: EmployeeId,
    pub name: String,
    pub points_balance: i64,
    pub total_advanced: i64,
    pub recent_kudos: usize,
    pub outstanding_loan: Option<Loan>,
    /// Perks whose cost the current balance covers.
    pub affordable_perks: usize,
    pub recent_peer_recognitions: Vec<PeerRecognition>,
    /// 10 to 100, see [`health_score`].
    pub health_score: i64,
    pub tips: Vec<FinancialTip>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Warning,
    Success,
    Info,
    Suggestion,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, SimpleObject)]
pub struct FinancialTip {
    pub kind: TipKind,
    pub text: String,
}

impl FinancialTip {
    fn new(kind: TipKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Base 50, up to +30 for savings (a fifth of the balance), up to -40 for
/// debt (half of it), up to +20 for recent kudos (3 each). Clamped to 10..=100.
pub fn health_score(balance: i64, recent_kudos: usize) -> i64 {
    let mut score = 50.0;
    if balance > 0 {
        score += (balance as f64 / 5.0).min(30.0);
    }
    if balance < 0 {
        score -= (balance.unsigned_abs() as f64 / 2.0).min(40.0);
    }
    score += (recent_kudos as f64 * 3.0).min(20.0);
    round_half_up(score).clamp(10, 100)
}

/// At most three tips: debt first, then a balance tier, then a recognition tier.
pub fn financial_tips(balance: i64, recent_kudos: usize) -> Vec<FinancialTip> {
    let mut tips = Vec::new();
    if balance < 0 {
        tips.push(FinancialTip::new(
            TipKind::Warning,
            format!(
                "You have an outstanding advance of {} points. Focus on earning recognition to repay it.",
                balance.unsigned_abs()
            ),
        ));
    }
    if balance >= 100 {
        tips.push(FinancialTip::new(
            TipKind::Success,
            "Excellent! You have a healthy points balance. You can afford multiple rewards!",
        ));
    } else if balance >= 50 {
        tips.push(FinancialTip::new(
            TipKind::Info,
            "Good balance! You can afford some rewards. Keep earning recognition for more options.",
        ));
    } else if balance >= 0 {
        tips.push(FinancialTip::new(
            TipKind::Info,
            "Keep earning recognition to build your points balance for more reward options.",
        ));
    }
    if recent_kudos == 0 {
        tips.push(FinancialTip::new(
            TipKind::Suggestion,
            "No recent recognition. Consider asking for feedback or taking on new challenges.",
        ));
    } else if recent_kudos >= 3 {
        tips.push(FinancialTip::new(
            TipKind::Success,
            format!(
                "Excellent! You've received {recent_kudos} recognitions recently. Keep up the great work!"
            ),
        ));
    }
    tips.truncate(SUMMARY_TIPS);
    tips
}

pub fn employee_summary(store: &RecordStore, id: EmployeeId) -> RecognitionResult<EmployeeSummary> {
    let employee = store
        .employee(id)
        .ok_or(RecognitionError::EmployeeNotFound(id))?;
    Ok(EmployeeSummary {
        employee_id: employee.id,
        name: employee.name.clone(),
        points_balance: employee.points_balance,
        total_advanced: employee.total_advanced(),
        recent_kudos: employee.recent_kudos.len(),
        outstanding_loan: employee.outstanding_loan().cloned(),
        affordable_perks: store
            .perks()
            .iter()
            .filter(|perk| perk.affordable_with(employee.points_balance))
            .count(),
        recent_peer_recognitions: store
            .peer_recognitions()
            .filter(|r| r.to_employee_id == id)
            .take(SUMMARY_PEER_RECOGNITIONS)
            .cloned()
            .collect(),
        health_score: health_score(employee.points_balance, employee.recent_kudos.len()),
        tips: financial_tips(employee.points_balance, employee.recent_kudos.len()),
    })
}
