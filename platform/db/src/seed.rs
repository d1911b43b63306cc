use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use entity::{
    Employee, Kudos, Loan, MANAGER_SOURCE, PeerRecognition, Perk, PerkCategory, RepaymentStatus,
};
use serde::{Deserialize, Serialize};

use crate::{DbError, DbResult};

/// Initial store contents, either the built-in demo data or a JSON fixture
/// of the same shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    pub employees: Vec<Employee>,
    pub perks: Vec<Perk>,
    #[serde(default)]
    pub peer_recognitions: Vec<PeerRecognition>,
}

impl Seed {
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| DbError::SeedRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> DbResult<Self> {
        serde_json::from_str(raw).map_err(Into::into)
    }

    pub fn to_json_pretty(&self) -> DbResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    pub fn demo() -> Self {
        let employees = vec![
            seeded(1, "Maria Rodriguez", "Marketing Manager", 150).kudos(
                1,
                "Great campaign strategy and execution!",
                25,
                15,
            ),
            seeded(2, "James Chen", "Senior Engineer", 80).kudos(
                2,
                "Excellent technical leadership and code quality",
                30,
                14,
            ),
            seeded(3, "Sarah Johnson", "Sales Representative", -50).advance(
                1,
                50,
                "Coffee Gift Card",
                10,
            ),
            seeded(4, "David Kim", "Product Manager", 200).kudos(
                3,
                "Outstanding product roadmap and stakeholder management",
                40,
                13,
            ),
            seeded(5, "Lisa Wang", "UX Designer", 120).kudos(
                4,
                "Handled complex user research with exceptional insights",
                35,
                12,
            ),
            seeded(6, "Alex Thompson", "Data Analyst", 95).kudos(
                5,
                "Provided crucial insights that drove business decisions",
                20,
                11,
            ),
            seeded(7, "Emma Davis", "HR Specialist", 75).kudos(
                6,
                "Streamlined recruitment process and improved candidate experience",
                25,
                10,
            ),
            seeded(8, "Michael Brown", "DevOps Engineer", 180).kudos(
                7,
                "Improved system reliability and deployment efficiency",
                30,
                9,
            ),
        ]
        .into_iter()
        .map(|builder| builder.employee)
        .collect();

        let perks = vec![
            perk(1, "Coffee Gift Card", 50, "$10 Starbucks gift card", PerkCategory::Food),
            perk(2, "Lunch Voucher", 75, "$15 lunch voucher", PerkCategory::Food),
            perk(
                3,
                "Transit Pass",
                100,
                "Monthly transit pass",
                PerkCategory::Transportation,
            ),
            perk(
                4,
                "Wellness Package",
                150,
                "Spa treatment or gym membership",
                PerkCategory::Wellness,
            ),
            perk(
                5,
                "Tech Accessory",
                200,
                "Wireless headphones or phone case",
                PerkCategory::Electronics,
            ),
        ];

        Self {
            employees,
            perks,
            peer_recognitions: Vec::new(),
        }
    }
}

struct SeededEmployee {
    employee: Employee,
}

fn seeded(id: i64, name: &str, role: &str, balance: i64) -> SeededEmployee {
    SeededEmployee {
        employee: Employee::new(id, name, role).with_balance(balance),
    }
}

impl SeededEmployee {
    fn kudos(mut self, id: i64, message: &str, points: i64, january_day: u32) -> Self {
        self.employee.recent_kudos.push(Kudos {
            id,
            message: message.into(),
            points,
            date: january_2024(january_day),
            from: MANAGER_SOURCE.into(),
        });
        self
    }

    fn advance(mut self, id: i64, amount: i64, perk: &str, january_day: u32) -> Self {
        self.employee.loan_history.push(Loan {
            id,
            amount,
            date: january_2024(january_day),
            redeemed_perk: perk.into(),
            repayment_status: RepaymentStatus::Outstanding,
            repaid_date: None,
        });
        self
    }
}

fn perk(id: i64, name: &str, cost: i64, description: &str, category: PerkCategory) -> Perk {
    Perk {
        id,
        name: name.into(),
        cost,
        description: description.into(),
        category,
    }
}

fn january_2024(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}
