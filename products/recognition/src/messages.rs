//! Congratulation text attached to every award.

use rand::Rng;

/// Produces the message stored with a kudos entry.
pub trait MessageGenerator: Send + Sync {
    fn generate(&self, employee_name: &str, reason: &str, points: i64) -> String;
}

/// Picks one of a fixed set of templates uniformly at random.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateMessages;

impl TemplateMessages {
    pub const TEMPLATE_COUNT: usize = 5;

    /// Render template `index` (taken modulo the template count).
    pub fn render(index: usize, name: &str, reason: &str, points: i64) -> String {
        match index % Self::TEMPLATE_COUNT {
            0 => format!(
                "🌟 {name}, your {reason} is truly inspiring! You've earned {points} points for your outstanding contribution!"
            ),
            1 => format!(
                "🎉 Amazing work, {name}! Your {reason} shows incredible dedication. Here are {points} well-deserved points!"
            ),
            2 => format!(
                "✨ {name}, your {reason} has made a real difference! You've earned {points} points for your excellence!"
            ),
            3 => format!(
                "🏆 Outstanding performance, {name}! Your {reason} deserves recognition. Here are {points} points!"
            ),
            _ => format!(
                "💫 {name}, your {reason} is exactly what we need! You've earned {points} points for your hard work!"
            ),
        }
    }
}

impl MessageGenerator for TemplateMessages {
    fn generate(&self, employee_name: &str, reason: &str, points: i64) -> String {
        let index = rand::thread_rng().gen_range(0..Self::TEMPLATE_COUNT);
        Self::render(index, employee_name, reason, points)
    }
}
